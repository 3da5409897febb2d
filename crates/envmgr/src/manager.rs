//! Virtual environment setup manager

use crate::manifest::{read_manifest, DEFAULT_REQUIREMENTS_FILE};
use crate::runner::{CommandRunner, Invocation, SystemCommandRunner};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use types::{EnvError, EnvironmentStatus, SetupReport, StepOutcome};

/// Default virtual environment directory
pub const DEFAULT_VENV_DIR: &str = "venv";

/// File that marks a directory as a virtual environment
const VENV_MARKER: &str = "pyvenv.cfg";

/// Default interpreter used to create the environment
pub fn default_python() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("python")
    } else {
        PathBuf::from("python3")
    }
}

/// Environment setup configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSetupConfig {
    /// Virtual environment directory
    pub venv_dir: PathBuf,
    /// Requirements manifest
    pub requirements_file: PathBuf,
    /// Base interpreter that runs `-m venv`
    pub python: PathBuf,
}

impl Default for EnvSetupConfig {
    fn default() -> Self {
        Self {
            venv_dir: PathBuf::from(DEFAULT_VENV_DIR),
            requirements_file: PathBuf::from(DEFAULT_REQUIREMENTS_FILE),
            python: default_python(),
        }
    }
}

/// Creates and provisions a virtual environment.
///
/// Steps run synchronously. Only environment creation can fail with an
/// error; the pip upgrade and the package install log their failures and
/// report them as a [`StepOutcome`].
#[derive(Debug)]
pub struct EnvSetupManager<R = SystemCommandRunner> {
    config: EnvSetupConfig,
    python_executable: PathBuf,
    runner: R,
}

impl EnvSetupManager<SystemCommandRunner> {
    /// Create a manager that runs real processes
    pub fn new(config: EnvSetupConfig) -> Self {
        Self::with_runner(config, SystemCommandRunner)
    }
}

impl<R: CommandRunner> EnvSetupManager<R> {
    /// Create a manager with a custom command runner
    pub fn with_runner(config: EnvSetupConfig, runner: R) -> Self {
        let python_executable = venv_python(&config.venv_dir);
        Self {
            config,
            python_executable,
            runner,
        }
    }

    pub fn config(&self) -> &EnvSetupConfig {
        &self.config
    }

    /// Interpreter inside the virtual environment
    pub fn python_executable(&self) -> &Path {
        &self.python_executable
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Whether the target directory already holds a virtual environment
    pub fn is_valid_environment(&self) -> bool {
        self.config.venv_dir.join(VENV_MARKER).is_file()
    }

    /// Create the virtual environment unless one already exists
    pub fn ensure_isolated_environment(&self) -> Result<EnvironmentStatus, EnvError> {
        let venv_dir = &self.config.venv_dir;

        if self.is_valid_environment() {
            info!(
                path = %venv_dir.display(),
                "Virtual environment already exists, skipping creation"
            );
            return Ok(EnvironmentStatus::AlreadyExists);
        }

        info!(path = %venv_dir.display(), "Creating virtual environment");
        let invocation = Invocation::new(&self.config.python)
            .arg("-m")
            .arg("venv")
            .arg(venv_dir);

        self.runner
            .run(&invocation)
            .map_err(|source| EnvError::CreationFailure {
                path: venv_dir.display().to_string(),
                source,
            })?;

        info!(path = %venv_dir.display(), "Virtual environment created");
        Ok(EnvironmentStatus::Created)
    }

    /// Upgrade pip inside the environment. Failure keeps the existing version.
    pub fn upgrade_package_manager(&self) -> StepOutcome {
        info!("Updating pip");
        let invocation = Invocation::new(&self.python_executable)
            .arg("-m")
            .arg("pip")
            .arg("install")
            .arg("--upgrade")
            .arg("pip");

        match self.runner.run(&invocation) {
            Ok(()) => {
                info!("pip updated successfully");
                StepOutcome::Completed
            }
            Err(e) => {
                let err = EnvError::UpgradeFailure(e);
                warn!(error = %err, "Proceeding with existing pip version");
                StepOutcome::Failed(err.to_string())
            }
        }
    }

    /// Install the packages listed in the requirements manifest.
    ///
    /// A missing manifest is skipped with a notice. Install failures are
    /// logged and leave the environment partially provisioned.
    pub fn install_dependencies(&self) -> StepOutcome {
        let manifest = &self.config.requirements_file;

        if !manifest.is_file() {
            let reason = format!("{} not found", manifest.display());
            info!(manifest = %manifest.display(), "Requirements file not found, skipping package installation");
            return StepOutcome::Skipped(reason);
        }

        match read_manifest(manifest) {
            Ok(packages) if packages.is_empty() => {
                info!(manifest = %manifest.display(), "Requirements file lists no packages, skipping package installation");
                return StepOutcome::Skipped(format!("{} lists no packages", manifest.display()));
            }
            Ok(packages) => {
                info!(
                    manifest = %manifest.display(),
                    packages = packages.len(),
                    "Installing packages"
                );
            }
            // pip reports the read problem itself
            Err(e) => warn!(manifest = %manifest.display(), error = %e, "Could not read requirements file"),
        }

        let invocation = Invocation::new(&self.python_executable)
            .arg("-m")
            .arg("pip")
            .arg("install")
            .arg("-r")
            .arg(manifest);

        match self.runner.run(&invocation) {
            Ok(()) => {
                info!("Packages installed successfully");
                StepOutcome::Completed
            }
            Err(source) => {
                let err = EnvError::InstallFailure {
                    manifest: manifest.display().to_string(),
                    source,
                };
                warn!(error = %err, "Package installation failed");
                StepOutcome::Failed(err.to_string())
            }
        }
    }

    /// Ensure the environment, upgrade pip, install requirements.
    ///
    /// Runs in that order with no rollback. Returns early only when the
    /// environment cannot be created.
    pub fn setup_environment(&self) -> Result<SetupReport, EnvError> {
        let environment = self.ensure_isolated_environment()?;
        let upgrade = self.upgrade_package_manager();
        let install = self.install_dependencies();

        let report = SetupReport {
            environment,
            upgrade,
            install,
        };
        if report.is_complete() {
            info!("{}", report.summary());
        } else {
            warn!("{}", report.summary());
        }
        Ok(report)
    }
}

/// Interpreter path inside a virtual environment
pub fn venv_python(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join("python.exe")
    } else {
        venv_dir.join("bin").join("python")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;
    use types::CommandError;

    /// Records invocations; creates the venv marker on `-m venv` and fails
    /// any invocation whose rendered form contains `fail_on`.
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl FakeRunner {
        fn failing_on(pattern: &'static str) -> Self {
            Self {
                fail_on: Some(pattern),
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> Result<(), CommandError> {
            let rendered = invocation.to_string();
            self.calls.borrow_mut().push(rendered.clone());

            if let Some(pattern) = self.fail_on {
                if rendered.contains(pattern) {
                    return Err(CommandError::ExitStatus {
                        program: invocation.program_name(),
                        code: Some(1),
                    });
                }
            }

            if invocation.args.first().map(|a| a == "-m").unwrap_or(false)
                && invocation.args.get(1).map(|a| a == "venv").unwrap_or(false)
            {
                let dir = PathBuf::from(&invocation.args[2]);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join(VENV_MARKER), "home = /usr/bin\n").unwrap();
            }
            Ok(())
        }
    }

    fn config_in(dir: &TempDir) -> EnvSetupConfig {
        EnvSetupConfig {
            venv_dir: dir.path().join("venv"),
            requirements_file: dir.path().join("requirements.txt"),
            python: PathBuf::from("python3"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = EnvSetupConfig::default();
        assert_eq!(config.venv_dir, PathBuf::from("venv"));
        assert_eq!(config.requirements_file, PathBuf::from("requirements.txt"));
        assert_eq!(config.python, default_python());
    }

    #[test]
    fn test_python_executable_path() {
        let manager = EnvSetupManager::new(EnvSetupConfig::default());
        if cfg!(windows) {
            assert_eq!(manager.python_executable(), Path::new("venv/Scripts/python.exe"));
        } else {
            assert_eq!(manager.python_executable(), Path::new("venv/bin/python"));
        }
    }

    #[test]
    fn test_ensure_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let manager = EnvSetupManager::with_runner(config_in(&dir), FakeRunner::default());

        assert_eq!(
            manager.ensure_isolated_environment().unwrap(),
            EnvironmentStatus::Created
        );
        assert!(manager.is_valid_environment());
        assert_eq!(
            manager.ensure_isolated_environment().unwrap(),
            EnvironmentStatus::AlreadyExists
        );

        let calls = manager.runner().calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("python3 -m venv "));
    }

    #[test]
    fn test_existing_directory_without_marker_is_recreated() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::create_dir_all(&config.venv_dir).unwrap();

        let manager = EnvSetupManager::with_runner(config, FakeRunner::default());
        assert!(!manager.is_valid_environment());
        assert_eq!(
            manager.ensure_isolated_environment().unwrap(),
            EnvironmentStatus::Created
        );
    }

    #[test]
    fn test_creation_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let manager = EnvSetupManager::with_runner(config_in(&dir), FakeRunner::failing_on("-m venv"));

        let err = manager.setup_environment().unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, EnvError::CreationFailure { .. }));

        // Nothing after the failed creation ran
        assert_eq!(manager.runner().calls().len(), 1);
    }

    #[test]
    fn test_missing_manifest_is_skipped() {
        let dir = TempDir::new().unwrap();
        let manager = EnvSetupManager::with_runner(config_in(&dir), FakeRunner::default());

        let outcome = manager.install_dependencies();
        assert!(matches!(outcome, StepOutcome::Skipped(ref reason) if reason.contains("not found")));
        assert!(manager.runner().calls().is_empty());
    }

    #[test]
    fn test_empty_manifest_is_skipped() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.requirements_file, "# nothing pinned yet\n").unwrap();

        let manager = EnvSetupManager::with_runner(config, FakeRunner::default());
        assert!(matches!(manager.install_dependencies(), StepOutcome::Skipped(_)));
        assert!(manager.runner().calls().is_empty());
    }

    #[test]
    fn test_upgrade_failure_does_not_abort_setup() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.requirements_file, "pyyaml==6.0.1\n").unwrap();

        let manager = EnvSetupManager::with_runner(config, FakeRunner::failing_on("--upgrade pip"));
        let report = manager.setup_environment().unwrap();

        assert_eq!(report.environment, EnvironmentStatus::Created);
        assert!(report.upgrade.is_failed());
        assert_eq!(report.install, StepOutcome::Completed);
        assert!(!report.is_complete());
        assert_eq!(manager.runner().calls().len(), 3);
    }

    #[test]
    fn test_install_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.requirements_file, "pyyaml==6.0.1\n").unwrap();

        let manager = EnvSetupManager::with_runner(config, FakeRunner::failing_on("-r "));
        let outcome = manager.install_dependencies();

        match outcome {
            StepOutcome::Failed(reason) => assert!(reason.contains("requirements.txt")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_setup_runs_steps_in_order() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        fs::write(&config.requirements_file, "pyyaml==6.0.1\nrequests\n").unwrap();
        let python = venv_python(&config.venv_dir).display().to_string();

        let manager = EnvSetupManager::with_runner(config, FakeRunner::default());
        let report = manager.setup_environment().unwrap();
        assert!(report.is_complete());

        let calls = manager.runner().calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("python3 -m venv"));
        assert_eq!(calls[1], format!("{} -m pip install --upgrade pip", python));
        assert!(calls[2].starts_with(&format!("{} -m pip install -r ", python)));
        assert!(calls[2].ends_with("requirements.txt"));

        // Second run reuses the environment
        let report = manager.setup_environment().unwrap();
        assert_eq!(report.environment, EnvironmentStatus::AlreadyExists);
        assert_eq!(manager.runner().calls().len(), 5);
    }
}
