//! Error types for run sequencing.

use thiserror::Error;

use zealot_runner::{RunnerError, Stage};
use zealot_store::StoreError;
use zealot_templates::TemplateError;

use crate::sequence::RunState;

/// Result type alias for sequencing operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while sequencing a run.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{operation} is not allowed in state {actual} (requires {expected})")]
    InvalidState {
        operation: &'static str,
        expected: RunState,
        actual: RunState,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether the error must stop the run.
    ///
    /// Tool failures during init and plan are recoverable in the sense
    /// that nothing has been mutated yet; an apply failure means real
    /// infrastructure may be half-changed and is always fatal. Store and
    /// template errors keep their own classification.
    pub fn is_fatal(&self) -> bool {
        match self {
            CoreError::Runner(RunnerError::StageFailed { stage, .. }) => *stage == Stage::Apply,
            CoreError::Runner(RunnerError::PlanFailed { .. })
            | CoreError::Runner(RunnerError::UnexpectedExitCode { .. }) => false,
            CoreError::Runner(_) => true,
            CoreError::Store(e) => e.is_fatal(),
            CoreError::Template(e) => e.is_fatal(),
            CoreError::InvalidState { .. } | CoreError::Io(_) => true,
        }
    }
}
