//! Error types for dbenv

use thiserror::Error;

/// Configuration specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: String },

    /// Path exists but cannot be read as a file
    #[error("Configuration path is not a file: {path}")]
    NotAFile { path: String },

    /// Parse error
    #[error("Configuration parse error: {0}")]
    Parse(String),

    /// Requested database is not defined
    #[error("Database configuration for '{name}' not found in the config file")]
    UnknownDatabase { name: String },

    /// I/O error while reading or writing a configuration file
    #[error("Configuration I/O error for {path}: {message}")]
    Io { path: String, message: String },

    /// Serialization error
    #[error("Configuration serialization error: {0}")]
    Serialize(String),
}

/// Failure of a single external command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The program could not be started
    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },

    /// The program ran and exited unsuccessfully
    #[error("{program} exited with {}", exit_code_label(.code))]
    ExitStatus { program: String, code: Option<i32> },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Isolated environment specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvError {
    /// The isolated environment could not be created
    #[error("Failed to create virtual environment at {path}: {source}")]
    CreationFailure {
        path: String,
        #[source]
        source: CommandError,
    },

    /// The package manager could not be upgraded
    #[error("Failed to upgrade pip: {0}")]
    UpgradeFailure(#[source] CommandError),

    /// Dependencies from the manifest could not be installed
    #[error("Failed to install packages from {manifest}: {source}")]
    InstallFailure {
        manifest: String,
        #[source]
        source: CommandError,
    },
}

impl EnvError {
    /// Whether the error leaves nothing useful to continue with
    pub fn is_fatal(&self) -> bool {
        matches!(self, EnvError::CreationFailure { .. })
    }
}
