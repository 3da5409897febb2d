//! dbenv - Command line entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;

use cli::{Cli, LogFormat};

fn main() -> Result<()> {
    // Load .env file if it exists; reported once logging is up
    let dotenv_result = dotenv::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.log_format)?;

    match dotenv_result {
        Ok(path) => info!("Loaded environment variables from {}", path.display()),
        // Only warn if the error is not "file not found"
        Err(e) if !e.not_found() => warn!("Could not load .env file: {}", e),
        Err(_) => {}
    }

    commands::run(cli.command)
}

/// Initialize logging from the verbosity flag, `RUST_LOG` and the log format
fn init_logging(verbose: u8, log_format: LogFormat) -> Result<()> {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr, command output to stdout
    match log_format {
        LogFormat::Pretty => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
        LogFormat::Json => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
    }

    let effective_level = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing::debug!(level = %effective_level, format = ?log_format, "Logging initialized");

    Ok(())
}
