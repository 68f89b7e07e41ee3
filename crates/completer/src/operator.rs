//! The per-instance operator a host drives once per frame.
//!
//! ```text
//! host tick ──► execute(params, pulses)
//!                 │ 1. complete pulse  → admit request, spawn background task
//!                 │ 2. poll            → republish text if it changed
//!                 │ 3. reset pulse     → clear text, cancel request
//!                 ▼
//!               &str (visible output)
//! ```
//!
//! A plain tick never blocks: the background request owns the network read,
//! and the tick only attempts a `try_lock` snapshot of the shared
//! [`CompletionState`].  When the lock is busy the previous output is shown
//! again and the new text is picked up on the next tick.  The admission check
//! of a complete trigger is non-blocking as well; a busy lock means the
//! background request is writing, so the trigger is ignored.  Admitting a
//! request and a reset pulse do take the lock, waiting at most for one append.

use std::{env, sync::Arc};

use completer_core::{
    provider::{CompletionJob, StreamingCompletionProvider},
    state::{CompletionState, TryRead},
};
use tokio::runtime::Handle;

use crate::params::Parameters;

/// Registration data for hosts that list operators by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub op_type: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub min_inputs: usize,
    pub max_inputs: usize,
}

pub const OPERATOR_INFO: OperatorInfo = OperatorInfo {
    op_type: "Gpt",
    label: "GPT Completion",
    icon: "GPT",
    min_inputs: 0,
    max_inputs: 0,
};

/// One-shot triggers of a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulses {
    pub complete: bool,
    pub reset: bool,
}

/// Result of a complete trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Started,
    /// A request is in flight; the trigger was ignored.
    AlreadyRunning,
    /// No key in the parameters or the environment; nothing was sent.
    MissingApiKey,
}

type EnvLookup = fn(&str) -> Option<String>;

fn process_env(name: &str) -> Option<String> {
    env::var(name).ok()
}

/// Streaming completion operator bound to one provider and one runtime.
pub struct CompletionOperator<P> {
    provider: Arc<P>,
    state: CompletionState,
    runtime: Handle,
    env: EnvLookup,
    output: String,
    revision: u64,
}

impl<P> CompletionOperator<P>
where
    P: StreamingCompletionProvider + 'static,
{
    /// Background requests are spawned on `runtime`; the host thread calling
    /// [`Self::execute`] does not need to be inside it.
    pub fn new(provider: P, runtime: Handle) -> Self {
        Self {
            provider: Arc::new(provider),
            state: CompletionState::new(),
            runtime,
            env: process_env,
            output: String::new(),
            revision: 0,
        }
    }

    /// Replace the environment used for the API key fallback.
    pub fn with_env(mut self, lookup: EnvLookup) -> Self {
        self.env = lookup;
        self
    }

    /// Handle to the shared state, e.g. for a host that renders elsewhere.
    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    /// Run one host tick: complete trigger, republish, then reset trigger.
    pub fn execute(&mut self, params: &Parameters, pulses: Pulses) -> &str {
        if pulses.complete {
            self.complete(params);
        }
        self.poll();
        if pulses.reset {
            self.reset();
        }
        &self.output
    }

    /// Start a request unless one is already running.
    pub fn complete(&mut self, params: &Parameters) -> Admission {
        if self.state.try_in_progress().unwrap_or(true) {
            return Admission::AlreadyRunning;
        }

        let api_key = match params.api_key_with(self.env) {
            Ok(api_key) => api_key,
            Err(err) => {
                tracing::warn!("completion requested without an API key");
                // Catch up on text published since the last tick so the
                // notice is not replaced by it on the next poll.
                self.poll();
                self.output = err.to_string();
                return Admission::MissingApiKey;
            }
        };

        let Some(appender) = self.state.begin_request() else {
            return Admission::AlreadyRunning;
        };

        let job = CompletionJob {
            api_key,
            config: params.request_config(),
        };
        tracing::info!(
            model = %job.config.model,
            max_tokens = job.config.max_tokens,
            generation = appender.generation(),
            "starting completion request"
        );

        let provider = Arc::clone(&self.provider);
        self.runtime.spawn(async move {
            let outcome = provider.stream_completion(job, &appender).await;
            match outcome {
                Ok(stats) => tracing::info!(
                    generation = appender.generation(),
                    bytes = stats.bytes,
                    frames = stats.frames,
                    tokens = stats.tokens,
                    errors = stats.errors,
                    malformed = stats.malformed,
                    "completion request finished"
                ),
                Err(err) => {
                    appender.fail(&format!("Error making request: {err}"));
                }
            }
        });

        Admission::Started
    }

    /// Republish the shared text if it changed since the last tick.
    pub fn poll(&mut self) -> &str {
        if let TryRead::Changed(snapshot) = self.state.try_snapshot_since(self.revision) {
            self.output = snapshot.text;
            self.revision = snapshot.revision;
        }
        &self.output
    }

    /// Clear the visible text and detach the running request, if any.
    pub fn reset(&mut self) {
        self.state.reset();
        self.output.clear();
    }

    /// Text shown at the last tick.
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn is_completing(&self) -> bool {
        self.state.is_in_progress()
    }
}

impl<P> Drop for CompletionOperator<P> {
    fn drop(&mut self) {
        self.state.reset();
    }
}
