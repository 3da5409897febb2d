//! Configuration schema definitions

use std::path::Path;
pub use types::{DatabaseConfig, DatabaseConfigs, MASK_TOKEN};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Field whose value is replaced by masking
pub const PASSWORD_FIELD: &str = "password";

/// Databases written by `dbenv init`
pub fn example_databases() -> DatabaseConfigs {
    let mut databases = DatabaseConfigs::new();
    databases.insert(
        "my_database".to_string(),
        DatabaseConfig::new("localhost", "admin", Some("secret".to_string()), "my_database"),
    );
    databases
}

/// Human readable form of a config path for messages and errors
pub(crate) fn display_path(path: &Path) -> String {
    path.display().to_string()
}
