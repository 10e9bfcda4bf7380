//! Error types for provisioning tool execution.

use thiserror::Error;

use crate::stage::Stage;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while fetching or driving the tool.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("tool fetch failed: {0}")]
    InstallFailed(String),

    #[error("failed to start {stage} stage: {source}")]
    Spawn {
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} stage exited with code {code}")]
    StageFailed {
        stage: Stage,
        code: i32,
        output: String,
    },

    #[error("plan stage reported an error")]
    PlanFailed { output: String },

    #[error("plan stage returned unexpected exit code {code}")]
    UnexpectedExitCode { code: i32, output: String },

    #[error("{stage} stage was terminated by a signal")]
    Signalled { stage: Stage },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
