//! Provider-agnostic building blocks of the **completer** operator.
//!
//! | Module          | What it provides                                              |
//! |-----------------|---------------------------------------------------------------|
//! | [`config`]      | `RequestConfig` and prompt assembly, clamped to endpoint ranges |
//! | [`credentials`] | `ApiKey` resolution (parameter first, then environment)       |
//! | [`state`]       | `CompletionState`, the lock-guarded text + admission gate     |
//! | [`provider`]    | `StreamingCompletionProvider`, implemented by backends        |
//! | [`model`]       | Model identifiers                                             |
//! | [`error`]       | `CompleterError` and the `Result` alias                       |
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;
pub mod provider;
pub mod state;

pub use config::{PromptParts, RequestConfig};
pub use credentials::ApiKey;
pub use error::{CompleterError, Result};
pub use provider::{CompletionJob, StreamStats, StreamingCompletionProvider};
pub use state::{Appender, CompletionState, Snapshot, TryRead};
