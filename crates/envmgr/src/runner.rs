//! External command execution

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use types::CommandError;

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Program name as shown in errors
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Trait for running external commands to completion
pub trait CommandRunner {
    /// Run the invocation, blocking until it exits.
    /// A non-zero exit status is an error.
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError>;
}

/// Runs commands with [`std::process::Command`], inheriting stdio so the
/// child's progress output reaches the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
        tracing::debug!(command = %invocation, "Running command");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .status()
            .map_err(|e| CommandError::Spawn {
                program: invocation.program_name(),
                message: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::ExitStatus {
                program: invocation.program_name(),
                code: status.code(),
            })
        }
    }
}
