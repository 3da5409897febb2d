//! Command line arguments

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use config::DEFAULT_CONFIG_FILE;
use envmgr::{DEFAULT_REQUIREMENTS_FILE, DEFAULT_VENV_DIR};
use std::path::PathBuf;

/// Database configuration reader and virtual environment bootstrapper
#[derive(Debug, Parser)]
#[command(name = "dbenv", version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, env = "LOG_FORMAT", default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every database configuration with passwords masked
    Show {
        #[command(flatten)]
        config: ConfigArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Print the configuration of one database
    Get {
        /// Database name (top-level key in the config file)
        name: String,
        #[command(flatten)]
        config: ConfigArgs,
        /// Print the real password instead of the mask
        #[arg(long)]
        reveal: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
    /// Validate the configuration file
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Write an example configuration file
    Init {
        #[command(flatten)]
        config: ConfigArgs,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Create the virtual environment, upgrade pip and install requirements
    Setup {
        /// Virtual environment directory
        #[arg(long, default_value = DEFAULT_VENV_DIR)]
        venv: PathBuf,
        /// Requirements manifest
        #[arg(long, default_value = DEFAULT_REQUIREMENTS_FILE)]
        requirements: PathBuf,
        /// Interpreter used to create the environment
        #[arg(long, env = "DBENV_PYTHON")]
        python: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Path to the database configuration file
    #[arg(short = 'c', long = "config", env = "CONFIG_PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from([
            "dbenv", "-vv", "get", "my_database", "--config", "dbs.yaml", "--format", "json",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Get {
                name,
                config,
                reveal,
                format,
            } => {
                assert_eq!(name, "my_database");
                assert_eq!(config.path, PathBuf::from("dbs.yaml"));
                assert!(!reveal);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_setup_defaults() {
        let cli = Cli::try_parse_from(["dbenv", "setup"]).unwrap();
        match cli.command {
            Command::Setup {
                venv, requirements, ..
            } => {
                assert_eq!(venv, PathBuf::from("venv"));
                assert_eq!(requirements, PathBuf::from("requirements.txt"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_get_requires_name() {
        assert!(Cli::try_parse_from(["dbenv", "get"]).is_err());
    }
}
