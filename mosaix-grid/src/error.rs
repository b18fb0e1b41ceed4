use mosaix_model::ModelError;
use thiserror::Error;

/// Failure reported by a paged data source.
///
/// The grid never interprets the message; it logs it, reports it upward, and
/// keeps its last valid state. Retry policy belongs to the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("data source request failed: {message}")]
pub struct SourceError {
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors surfaced by grid controller operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// `set_image_data` was called on an enabled grid. Callers must
    /// `disable()` first; the item list is never mutated while live.
    #[error("image data cannot be replaced while the grid is enabled; disable() first")]
    MutateWhileEnabled,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Model(#[from] ModelError),
}
