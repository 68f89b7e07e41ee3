use completer_core::error::CompleterError;
use reqwest::{StatusCode, header::InvalidHeaderValue};

/// High-level error type covering every failure mode the client can hit.
#[derive(Debug, thiserror::Error)]
pub enum OpenAiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("couldn’t serialise body: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    #[error("OpenAI returned non-success status {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// The chunk consumer reported a short count, which aborts the transfer.
    #[error("stream consumer accepted {consumed} of {received} bytes")]
    Aborted { consumed: usize, received: usize },

    #[error("streamed event exceeds {limit} bytes without closing")]
    FrameTooLarge { limit: usize },
}

impl From<OpenAiError> for CompleterError {
    fn from(value: OpenAiError) -> Self {
        CompleterError::Backend(Box::new(value))
    }
}
