//! Unified error type exposed by **`completer-core`**.
//!
//! Provider crates convert their internal errors into one of these variants
//! before handing them back to the operator.  The operator in turn renders
//! every error as visible text, so the variants mainly exist to keep logs and
//! library callers precise.

use thiserror::Error;

/// Convenient alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, CompleterError>;

#[derive(Debug, Error)]
pub enum CompleterError {
    /// Neither the explicit parameter nor the environment provided a key.
    #[error("No API key specified")]
    MissingApiKey,

    /// Failure while serialising or deserialising JSON payloads sent to /
    /// received from the completion endpoint.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic forwarding of any backend-specific error that doesn’t fit another
    /// category.
    #[error("{0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid: {0}")]
    Invalid(String),
}
