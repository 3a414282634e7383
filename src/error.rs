//! Engine error taxonomy. Nothing here is retried internally; the HTTP layer
//! maps each variant to a status class.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input; `field` names the offending field.
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },

    /// Session or profile id does not exist or has been evicted.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Operation requires state the caller never established
    /// (e.g. ending a session before any event was appended).
    #[error("{0}")]
    PreconditionFailed(String),

    /// Unexpected failure during scoring; the whole request fails rather
    /// than returning a partial verdict.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}
