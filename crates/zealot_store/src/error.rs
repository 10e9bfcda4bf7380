//! Error types for store access.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when talking to the backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("unable to communicate with backing store: {detail}")]
    Connection { detail: String },

    #[error("key '{key}' not found")]
    NotFound { key: String },

    #[error("required configuration key '{key}' is missing")]
    MissingRequired { key: String },

    #[error("write to '{key}' failed: {detail}")]
    WriteFailed { key: String, detail: String },

    #[error("value at '{key}' is not a valid {expected}: {detail}")]
    Decode {
        key: String,
        expected: &'static str,
        detail: String,
    },

    #[error("lock '{key}' is held by another run")]
    LockHeld { key: String },

    #[error("session operation failed: {0}")]
    Session(String),
}

impl StoreError {
    /// Whether the error must stop the run.
    ///
    /// An absent optional key and a value that fails to decode are the only
    /// conditions a caller may handle; everything else means the store, the
    /// configuration or the lock is unusable and the run cannot continue.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            StoreError::NotFound { .. } | StoreError::Decode { .. }
        )
    }
}
