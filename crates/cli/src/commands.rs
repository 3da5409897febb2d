//! Subcommand implementations

use crate::cli::{Command, OutputFormat};
use anyhow::{bail, Context, Result};
use config::{ConfigReader, ConfigValidator, DatabaseConfig, ValidationReport};
use envmgr::{default_python, EnvSetupConfig, EnvSetupManager};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Dispatch a parsed subcommand
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Show { config, format } => {
            let reader = load_reader(&config.path)?;
            print!("{}", render(&reader.masked_view(), format)?);
        }
        Command::Get {
            name,
            config,
            reveal,
            format,
        } => {
            let reader = load_reader(&config.path)?;
            let record = select_record(&reader, &name, reveal)?;
            print!("{}", render(&record, format)?);
        }
        Command::Check { config } => {
            let reader = load_reader(&config.path)?;
            let report = ConfigValidator::validate(reader.databases());
            print!("{}", format_report(&report));
            if report.has_errors() {
                bail!("Configuration {} is invalid", config.path.display());
            }
        }
        Command::Init { config, force } => init(&config.path, force)?,
        Command::Setup {
            venv,
            requirements,
            python,
        } => setup(venv, requirements, python)?,
    }
    Ok(())
}

fn load_reader(path: &Path) -> Result<ConfigReader> {
    ConfigReader::load(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// One record, masked unless `reveal` is set
fn select_record(reader: &ConfigReader, name: &str, reveal: bool) -> Result<DatabaseConfig> {
    let record = reader.database_config(name)?;
    if reveal {
        warn!(database = name, "Printing unmasked password");
        Ok(record.clone())
    } else {
        Ok(record.masked())
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to render YAML"),
        OutputFormat::Json => {
            let mut rendered =
                serde_json::to_string_pretty(value).context("Failed to render JSON")?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}

fn format_report(report: &ValidationReport) -> String {
    let mut output = String::new();
    for issue in &report.errors {
        output.push_str(&format!("error: {}: {}\n", issue.field, issue.message));
    }
    for issue in &report.warnings {
        output.push_str(&format!("warning: {}: {}\n", issue.field, issue.message));
    }
    output.push_str(&report.summary());
    output.push('\n');
    output
}

fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }
    ConfigReader::create_example(path)
        .with_context(|| format!("Failed to write example configuration to {}", path.display()))?;
    println!("Wrote example configuration to {}", path.display());
    Ok(())
}

fn setup(venv_dir: PathBuf, requirements_file: PathBuf, python: Option<PathBuf>) -> Result<()> {
    let config = EnvSetupConfig {
        venv_dir,
        requirements_file,
        python: python.unwrap_or_else(default_python),
    };
    info!(
        venv = %config.venv_dir.display(),
        requirements = %config.requirements_file.display(),
        python = %config.python.display(),
        "Setting up environment"
    );

    let manager = EnvSetupManager::new(config);
    let report = manager
        .setup_environment()
        .context("Environment setup failed")?;

    println!("{}", report.summary());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::MASK_TOKEN;
    use tempfile::TempDir;

    const YAML: &str = r#"
my_database:
  host: localhost
  user: admin
  password: secret
  name: my_database
  port: 5432
"#;

    #[test]
    fn test_select_record_masks_by_default() {
        let reader = ConfigReader::load_from_str(YAML).unwrap();

        let masked = select_record(&reader, "my_database", false).unwrap();
        assert_eq!(masked.password(), Some(MASK_TOKEN));

        let revealed = select_record(&reader, "my_database", true).unwrap();
        assert_eq!(revealed.password(), Some("secret"));

        let err = select_record(&reader, "missing", false).unwrap_err();
        assert!(err.to_string().contains("'missing' not found"));
    }

    #[test]
    fn test_render_masked_view() {
        let reader = ConfigReader::load_from_str(YAML).unwrap();

        let yaml = render(&reader.masked_view(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("port: 5432"));
        assert!(!yaml.contains("secret"));
        let parsed: config::DatabaseConfigs = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["my_database"].password(), Some(MASK_TOKEN));

        let json = render(&reader.masked_view(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["my_database"]["password"], "****");
        assert_eq!(value["my_database"]["port"], 5432);
    }

    #[test]
    fn test_format_report() {
        let mut report = ValidationReport::default();
        report.add_error("db.host", "Host cannot be empty");
        report.add_warning("db.password", "No password configured");

        assert_eq!(
            format_report(&report),
            "error: db.host: Host cannot be empty\n\
             warning: db.password: No password configured\n\
             Validation: 1 errors, 1 warnings\n"
        );
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");

        init(&path, false).unwrap();
        assert!(ConfigReader::load(&path).unwrap().contains("my_database"));

        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();
    }
}
