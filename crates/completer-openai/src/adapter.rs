use std::{env, future::Future, pin::Pin, time::Duration};

use completer_core::{
    credentials::ApiKey,
    error::Result,
    provider::{CompletionJob, StreamStats, StreamingCompletionProvider},
    state::Appender,
};
use reqwest::Client as HttpClient;

use crate::{
    api_v1::CompletionRequest,
    client::{OpenAiClient, StreamEnd},
    error::OpenAiError,
    stream::CompletionDecoder,
};

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Wires the HTTP client [`OpenAiClient`] into a value that implements
/// [`StreamingCompletionProvider`].
///
/// Think of it as the **service locator** for the OpenAI back-end:
///
/// * owns a shareable, connection-pooled `reqwest::Client`,
/// * remembers the base URL,
/// * creates a per-request [`OpenAiClient`] for the key carried by each
///   [`CompletionJob`], since hosts may change the key between requests.
pub struct OpenAiAdapter {
    http: HttpClient,
    base_url: Option<String>,
}

impl OpenAiAdapter {
    /// Client bound to `api_key`, sharing this adapter's connection pool.
    pub fn client(&self, api_key: ApiKey) -> OpenAiClient {
        OpenAiClient::with_http(api_key, self.http.clone(), self.base_url.clone())
    }
}

impl StreamingCompletionProvider for OpenAiAdapter {
    fn stream_completion<'a>(
        &'a self,
        job: CompletionJob,
        appender: &'a Appender,
    ) -> Pin<Box<dyn Future<Output = Result<StreamStats>> + Send + 'a>> {
        Box::pin(async move {
            let client = self.client(job.api_key);
            let request = CompletionRequest::try_from(job.config)?;
            let mut decoder = CompletionDecoder::new(appender);

            let outcome = client
                .completion_stream_into(request, &mut decoder, appender.cancellation())
                .await;
            let stats = decoder.stats();

            match outcome {
                Ok(StreamEnd::Completed) => Ok(stats),
                Ok(StreamEnd::Cancelled) => {
                    tracing::info!(generation = appender.generation(), "completion request cancelled");
                    Ok(stats)
                }
                Err(OpenAiError::Aborted { .. }) if decoder.is_detached() => Ok(stats),
                Err(err @ OpenAiError::Aborted { .. }) => {
                    Err(decoder.take_failure().unwrap_or(err).into())
                }
                Err(err) => Err(err.into()),
            }
        })
    }
}

/// Builder for [`OpenAiAdapter`].
///
/// # Typical usage
///
/// ```rust,no_run
/// use completer_openai::OpenAiAdapterBuilder;
///
/// let backend = OpenAiAdapterBuilder::new_from_env()
///     .build()
///     .expect("reqwest client builds");
/// ```
///
/// The API key is not part of the adapter: it travels with every
/// [`CompletionJob`].
#[derive(Default)]
pub struct OpenAiAdapterBuilder {
    pub(crate) base_url: Option<String>,
    pub(crate) http: Option<HttpClient>,
    pub(crate) connect_timeout: Option<Duration>,
}

impl OpenAiAdapterBuilder {
    /// Create an *empty* builder targeting the public OpenAI API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor that picks up `OPENAI_BASE_URL` when set.
    ///
    /// # Panics
    ///
    /// Never panics.
    pub fn new_from_env() -> Self {
        Self {
            base_url: env::var(BASE_URL_ENV).ok().filter(|url| !url.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Point the adapter at a compatible server (or a test double).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Use a caller supplied `reqwest::Client` (proxy settings, custom TLS,
    /// …).  Overrides [`Self::with_connect_timeout`].
    pub fn with_http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Connect timeout of the default client.  No total timeout is set, as a
    /// completion stream may legitimately stay open for a long time.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Finalise the builder and return a ready-to-use adapter.
    ///
    /// # Errors
    ///
    /// * [`completer_core::CompleterError::Backend`] – the default
    ///   `reqwest::Client` could not be built.
    pub fn build(self) -> Result<OpenAiAdapter> {
        let http = match self.http {
            Some(http) => http,
            None => HttpClient::builder()
                .connect_timeout(self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT))
                .build()
                .map_err(OpenAiError::from)?,
        };

        Ok(OpenAiAdapter {
            http,
            base_url: self.base_url,
        })
    }
}
