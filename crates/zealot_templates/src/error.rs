//! Error types for template resolution and rendering.

use thiserror::Error;

use zealot_store::StoreError;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while resolving or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template placeholder '{{{{{name}}}}}' has no value")]
    UnresolvedPlaceholder { name: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TemplateError {
    /// Whether the error must stop the run.
    ///
    /// A placeholder without a value means the rendered file would be
    /// silently wrong, so rendering failures are always fatal. Store
    /// failures keep their own classification.
    pub fn is_fatal(&self) -> bool {
        match self {
            TemplateError::UnresolvedPlaceholder { .. } => true,
            TemplateError::Store(e) => e.is_fatal(),
        }
    }
}
