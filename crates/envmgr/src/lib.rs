//! Isolated environment bootstrapper for dbenv
//!
//! This crate creates a Python virtual environment, upgrades its pip and
//! installs the packages pinned in a requirements manifest. External
//! processes are started through the [`CommandRunner`] trait.

pub mod manager;
pub mod manifest;
pub mod runner;

pub use manager::*;
pub use manifest::*;
pub use runner::*;
