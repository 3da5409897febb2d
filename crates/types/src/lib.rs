//! Shared types for dbenv
//!
//! This crate contains the domain types shared by the configuration reader,
//! the environment bootstrapper and the command-line front end.

pub mod database;
pub mod environment;
pub mod error;

// Re-export commonly used types
pub use database::*;
pub use environment::*;
pub use error::{CommandError, ConfigError, EnvError};
