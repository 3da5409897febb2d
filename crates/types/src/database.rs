//! Database connection records

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder written over passwords in masked output
pub const MASK_TOKEN: &str = "****";

/// Mapping from database name to its connection record
pub type DatabaseConfigs = BTreeMap<String, DatabaseConfig>;

/// Connection parameters for a single database
///
/// The well-known fields accept any YAML scalar and hold its text, so
/// `password: 123456` loads as `"123456"`. Fields other than these four are
/// kept in `extra` and serialized back unchanged.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database server host
    #[serde(deserialize_with = "scalar_string")]
    pub host: String,
    /// Login user
    #[serde(deserialize_with = "scalar_string")]
    pub user: String,
    /// Login password. The outer `Option` is whether the key is present,
    /// the inner one whether it has a value (`password:` alone is `Some(None)`).
    #[serde(
        default,
        deserialize_with = "present_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub password: Option<Option<String>>,
    /// Database name on the server
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    /// Any additional fields present in the source file
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DatabaseConfig {
    /// Create a record with the well-known fields and no extras
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: Option<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            user: user.into(),
            password: password.map(Some),
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra field
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Password value, if the record has a non-null one
    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().and_then(|password| password.as_deref())
    }

    /// Whether the record has a `password` key, even a null one
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Whether the password currently holds the mask token
    pub fn is_password_masked(&self) -> bool {
        self.password() == Some(MASK_TOKEN)
    }

    /// Copy of this record with the password replaced by [`MASK_TOKEN`]
    pub fn masked(&self) -> Self {
        let mut record = self.clone();
        record.mask_password();
        record
    }

    /// Overwrite the password with [`MASK_TOKEN`]. Records without a
    /// `password` key are left as they are.
    pub fn mask_password(&mut self) {
        if let Some(password) = self.password.as_mut() {
            *password = Some(MASK_TOKEN.to_string());
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| MASK_TOKEN))
            .field("name", &self.name)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Copy of `databases` with every password masked
pub fn mask_databases(databases: &DatabaseConfigs) -> DatabaseConfigs {
    databases
        .iter()
        .map(|(key, record)| (key.clone(), record.masked()))
        .collect()
}

/// Short description of a YAML value's kind for error messages
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn scalar_text<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        other => Err(E::custom(format!(
            "expected a string, number or boolean, found {}",
            value_kind(&other)
        ))),
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    scalar_text(Value::deserialize(deserializer)?)
}

// Only called when the key is present; `default` covers the absent case
fn present_scalar_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(None)),
        value => scalar_text(value).map(|text| Some(Some(text))),
    }
}
