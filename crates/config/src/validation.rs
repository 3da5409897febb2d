//! Configuration validation utilities

use crate::schema::{DatabaseConfig, DatabaseConfigs, MASK_TOKEN, PASSWORD_FIELD};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate every database record
    pub fn validate(databases: &DatabaseConfigs) -> ValidationReport {
        let mut report = ValidationReport::default();

        if databases.is_empty() {
            report.add_warning("databases", "No databases are defined");
        }

        for (db_name, record) in databases {
            Self::validate_database(db_name, record, &mut report);
        }

        report
    }

    fn validate_database(db_name: &str, record: &DatabaseConfig, report: &mut ValidationReport) {
        let field = |name: &str| format!("{}.{}", db_name, name);

        if record.host.trim().is_empty() {
            report.add_error(&field("host"), "Host cannot be empty");
        } else if record.host.chars().any(char::is_whitespace) {
            report.add_error(
                &field("host"),
                &format!("Host contains whitespace: '{}'", record.host),
            );
        }

        if record.user.trim().is_empty() {
            report.add_error(&field("user"), "User cannot be empty");
        }

        if record.name.trim().is_empty() {
            report.add_error(&field("name"), "Database name cannot be empty");
        }

        match record.password.as_ref().map(|password| password.as_deref()) {
            None => report.add_warning(&field(PASSWORD_FIELD), "No password configured"),
            Some(None) | Some(Some("")) => {
                report.add_warning(&field(PASSWORD_FIELD), "Password is empty")
            }
            Some(Some(MASK_TOKEN)) => report.add_warning(
                &field(PASSWORD_FIELD),
                "Password equals the mask token, the file may have been written from a masked view",
            ),
            Some(Some(_)) => {}
        }

        if let Some(port) = record.extra.get("port") {
            match port.as_u64() {
                Some(port) if (1..=65535).contains(&port) => {}
                _ => report.add_error(
                    &field("port"),
                    "Port must be an integer between 1 and 65535",
                ),
            }
        }
    }
}

/// Errors and warnings found in a configuration, keyed by field path
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A single finding, e.g. `orders.port`
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl ValidationReport {
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue::new(field, message));
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue::new(field, message));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}
