//! Isolated environment bootstrap outcomes

use serde::{Deserialize, Serialize};

/// State of the isolated environment after the ensure step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentStatus {
    /// A valid environment was already present; nothing was run
    AlreadyExists,
    /// A new environment was created
    Created,
}

/// Result of a best-effort bootstrap step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum StepOutcome {
    /// The step ran and succeeded
    Completed,
    /// The step had nothing to do
    Skipped(String),
    /// The step failed; execution continued
    Failed(String),
}

impl StepOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// Results of a full bootstrap run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetupReport {
    /// Outcome of the ensure step
    pub environment: EnvironmentStatus,
    /// Outcome of the package manager upgrade
    pub upgrade: StepOutcome,
    /// Outcome of the dependency installation
    pub install: StepOutcome,
}

impl SetupReport {
    /// True when no step failed. Skipped steps still count as complete.
    pub fn is_complete(&self) -> bool {
        !self.upgrade.is_failed() && !self.install.is_failed()
    }

    pub fn summary(&self) -> String {
        format!(
            "Setup: environment {:?}, upgrade {}, install {}",
            self.environment,
            outcome_label(&self.upgrade),
            outcome_label(&self.install)
        )
    }
}

fn outcome_label(outcome: &StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Completed => "completed",
        StepOutcome::Skipped(_) => "skipped",
        StepOutcome::Failed(_) => "failed",
    }
}
