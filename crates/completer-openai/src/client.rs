use async_stream::try_stream;

use completer_core::credentials::ApiKey;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{
    Client as HttpClient, Response,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use tokio_util::sync::CancellationToken;

use crate::{
    api_v1::CompletionRequest,
    error::OpenAiError,
    stream::{CompletionEvent, Framer, classify},
};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Receiver of raw response-body chunks.
///
/// `on_chunk` returns how many bytes it consumed.  Anything other than
/// `chunk.len()` makes the transport abort with [`OpenAiError::Aborted`];
/// an empty chunk consuming zero bytes is a legitimate no-op.
pub trait ChunkSink {
    fn on_chunk(&mut self, chunk: &[u8]) -> usize;
}

impl<F> ChunkSink for F
where
    F: FnMut(&[u8]) -> usize,
{
    fn on_chunk(&mut self, chunk: &[u8]) -> usize {
        self(chunk)
    }
}

/// How a streamed transfer ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server closed the body.
    Completed,
    /// The cancellation token fired first.
    Cancelled,
}

/// Minimal HTTP client for OpenAI’s *completions* endpoint.
///
/// * Streaming only; `stream` is forced to `true` on every request.
/// * Accepts the `api_v1` request struct defined in this crate.
/// * Shares a single `reqwest::Client`, so cloning `OpenAiClient` is cheap.
#[derive(Clone)]
pub struct OpenAiClient {
    api_key: ApiKey,
    http: HttpClient,
    base: String,
}

impl OpenAiClient {
    /// Build with a caller supplied `reqwest::Client` and optional base URL.
    pub fn with_http(api_key: ApiKey, http: HttpClient, base_url: Option<String>) -> Self {
        Self {
            api_key,
            http,
            base: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        }
    }

    fn url(&self) -> String {
        format!("{}/completions", self.base.trim_end_matches('/'))
    }

    fn headers(&self) -> Result<HeaderMap, OpenAiError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        Ok(headers)
    }

    async fn send(&self, mut request: CompletionRequest) -> Result<Response, OpenAiError> {
        request.stream = true;

        let resp = self
            .http
            .post(self.url())
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(resp)
    }

    /// Perform a **streaming** completion and hand every body chunk to
    /// `sink` as it arrives.
    ///
    /// The transfer stops early when `cancel` fires (`Ok(StreamEnd::Cancelled)`)
    /// or when `sink` reports a short count (`Err(OpenAiError::Aborted)`).
    pub async fn completion_stream_into<S>(
        &self,
        request: CompletionRequest,
        sink: &mut S,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd, OpenAiError>
    where
        S: ChunkSink + Send,
    {
        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
            resp = self.send(request) => resp?,
        };

        let mut body = resp.bytes_stream();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                next = body.next() => next,
            };

            let Some(chunk) = next else {
                return Ok(StreamEnd::Completed);
            };
            let chunk = chunk?;

            let consumed = sink.on_chunk(&chunk);
            if consumed != chunk.len() {
                return Err(OpenAiError::Aborted {
                    consumed,
                    received: chunk.len(),
                });
            }
        }
    }

    /// Perform a **streaming** completion and yield one classified event per
    /// object on the wire, malformed ones included.
    pub fn completion_events(
        &self,
        request: CompletionRequest,
    ) -> impl Stream<Item = Result<CompletionEvent, OpenAiError>> + '_ {
        try_stream! {
            let resp = self.send(request).await?;

            let mut body = resp.bytes_stream();
            let mut framer = Framer::new();
            let mut frames = Vec::new();

            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                let pushed = framer.push(&chunk, &mut frames);
                for frame in frames.drain(..) {
                    yield classify(frame.as_bytes());
                }
                pushed?;
            }
        }
    }
}

/// Turn a non-success response into [`OpenAiError::Api`], preferring the
/// `error.message` of a JSON body over the raw text.
async fn api_error(resp: Response) -> OpenAiError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = match classify(body.as_bytes()) {
        CompletionEvent::Error { message } => message,
        _ => body,
    };
    OpenAiError::Api { status, message }
}
