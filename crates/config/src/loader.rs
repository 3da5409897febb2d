//! Configuration reader implementation

use crate::schema::{display_path, example_databases, DatabaseConfig, DatabaseConfigs};
use figment::{providers::Serialized, Figment};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::{mask_databases, value_kind, ConfigError};

/// In-memory store of database connection records loaded from a YAML file.
///
/// The file is read once, eagerly, when the reader is constructed. Lookups
/// return the stored records unchanged; [`ConfigReader::masked_view`] gives a
/// copy with every password replaced by the mask token and is what
/// `Display`/`Debug` print.
///
/// [`ConfigReader::mask_passwords_in_place`] is the destructive alternative:
/// it overwrites the stored passwords and cannot be undone.
#[derive(Clone)]
pub struct ConfigReader {
    path: Option<PathBuf>,
    databases: DatabaseConfigs,
    masked: bool,
}

impl ConfigReader {
    /// Load database configurations from a YAML file
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();

        // Check if config file exists
        if !config_path.exists() {
            return Err(ConfigError::NotFound {
                path: display_path(config_path),
            });
        }
        if config_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: display_path(config_path),
            });
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: display_path(config_path),
            message: e.to_string(),
        })?;

        let databases = Self::parse(&content)?;
        info!(
            path = %config_path.display(),
            databases = databases.len(),
            "Configuration loaded"
        );

        Ok(Self {
            path: Some(config_path.to_path_buf()),
            databases,
            masked: false,
        })
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            path: None,
            databases: Self::parse(yaml_content)?,
            masked: false,
        })
    }

    fn parse(yaml_content: &str) -> Result<DatabaseConfigs, ConfigError> {
        let mut document: serde_yaml::Value =
            serde_yaml::from_str(yaml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        match &document {
            serde_yaml::Value::Null => {
                warn!("Configuration is empty, no databases defined");
                return Ok(DatabaseConfigs::new());
            }
            serde_yaml::Value::Mapping(_) => {}
            other => {
                return Err(ConfigError::Parse(format!(
                    "expected a mapping of database names to connection parameters, found {}",
                    value_kind(other)
                )));
            }
        }

        // Resolve `<<: *anchor` merge keys
        document
            .apply_merge()
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let databases: DatabaseConfigs = Figment::new()
            .merge(Serialized::defaults(document))
            .extract()
            .map_err(extraction_error)?;

        let names: Vec<&str> = databases.keys().map(String::as_str).collect();
        debug!(names = ?names, "Parsed database configurations");
        Ok(databases)
    }

    /// Connection record for `db_name`, exactly as loaded.
    ///
    /// The password is only masked if [`ConfigReader::mask_passwords_in_place`]
    /// was called on this reader.
    pub fn database_config(&self, db_name: &str) -> Result<&DatabaseConfig, ConfigError> {
        self.databases
            .get(db_name)
            .ok_or_else(|| ConfigError::UnknownDatabase {
                name: db_name.to_string(),
            })
    }

    /// Deep copy of every record with passwords replaced by the mask token.
    /// The reader itself is not modified.
    pub fn masked_view(&self) -> DatabaseConfigs {
        mask_databases(&self.databases)
    }

    /// Replace every stored password with the mask token.
    ///
    /// Irreversible: the original passwords are gone from this reader and
    /// later lookups return the mask token.
    pub fn mask_passwords_in_place(&mut self) {
        for record in self.databases.values_mut() {
            record.mask_password();
        }
        if !self.masked {
            info!("Passwords masked in place");
        }
        self.masked = true;
    }

    /// Whether [`ConfigReader::mask_passwords_in_place`] has been applied
    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// Path the configuration was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// All loaded records, unmasked unless masked in place
    pub fn databases(&self) -> &DatabaseConfigs {
        &self.databases
    }

    pub fn database_names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    pub fn contains(&self, db_name: &str) -> bool {
        self.databases.contains_key(db_name)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml_content = serde_yaml::to_string(&example_databases())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, yaml_content).map_err(|e| ConfigError::Io {
            path: display_path(path),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), "Example configuration written");
        Ok(())
    }
}

/// Parse error naming the offending key path, without figment's profile
fn extraction_error(error: figment::Error) -> ConfigError {
    let messages: Vec<String> = error
        .into_iter()
        .map(|e| {
            if e.path.is_empty() {
                e.kind.to_string()
            } else {
                format!("{} at {}", e.kind, e.path.join("."))
            }
        })
        .collect();
    ConfigError::Parse(messages.join("; "))
}

impl fmt::Display for ConfigReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.masked_view()).map_err(|_| fmt::Error)?;
        write!(f, "ConfigReader({})", rendered)
    }
}

impl fmt::Debug for ConfigReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigReader")
            .field("path", &self.path)
            .field("databases", &self.masked_view())
            .field("masked", &self.masked)
            .finish()
    }
}
