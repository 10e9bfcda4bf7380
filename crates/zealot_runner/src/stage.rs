//! Stage identities and captured execution results.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The provisioning tool subcommands a run drives, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Init,
    Plan,
    Apply,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Init => "init",
            Stage::Plan => "plan",
            Stage::Apply => "apply",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Captured result of one tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutput {
    pub stage: Stage,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl StageOutput {
    /// Whether the tool exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout and stderr as the single captured text of the stage.
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Classified result of the plan stage's detailed exit code.
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    /// Exit 0: infrastructure already matches the configuration.
    NoChanges(StageOutput),
    /// Exit 2: the tool wrote a plan artifact with pending changes.
    Changes(StageOutput),
}

impl PlanOutcome {
    /// Captured output regardless of outcome.
    pub fn output(&self) -> &StageOutput {
        match self {
            PlanOutcome::NoChanges(out) | PlanOutcome::Changes(out) => out,
        }
    }

    /// Whether pending changes were detected.
    pub fn has_changes(&self) -> bool {
        matches!(self, PlanOutcome::Changes(_))
    }
}
