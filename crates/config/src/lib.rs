//! Database configuration management for dbenv
//!
//! This crate loads per-database connection parameters from a YAML file,
//! serves lookups by database name and produces masked copies that are safe
//! to print or log.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigReader;
pub use schema::*;
pub use validation::*;
