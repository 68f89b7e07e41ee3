use std::{future::Future, pin::Pin};

use crate::{config::RequestConfig, credentials::ApiKey, error::Result, state::Appender};

/// Everything a backend needs to run one admitted request.
#[derive(Debug, Clone)]
pub struct CompletionJob {
    pub api_key: ApiKey,
    pub config: RequestConfig,
}

/// Per-request counters, reported when a stream ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes: usize,
    pub frames: usize,
    pub tokens: usize,
    pub errors: usize,
    pub malformed: usize,
}

/// A **backend** turns a [`CompletionJob`] into a streaming network call and
/// feeds every recovered fragment into the given [`Appender`].
///
/// The trait is intentionally minimal:
///
/// * **One method** – `stream_completion`, which resolves once the upstream
///   stream ended, was cancelled through [`Appender::cancellation`], or
///   failed.
/// * Fragments are delivered through the appender as they arrive, not in the
///   return value.
///
/// The method returns a [`Pin<Box<dyn Future>>`] so we stay object-safe
/// without pulling in `async_trait`.
pub trait StreamingCompletionProvider: Send + Sync {
    fn stream_completion<'a>(
        &'a self,
        job: CompletionJob,
        appender: &'a Appender,
    ) -> Pin<Box<dyn Future<Output = Result<StreamStats>> + Send + 'a>>;
}
