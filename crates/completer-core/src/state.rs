//! Shared completion text plus the single-request admission gate.
//!
//! ```text
//!  background request                     foreground host tick
//!  ──────────────────                     ────────────────────
//!  Appender::append ─┐                ┌── CompletionState::try_snapshot_since
//!                    ├─► Mutex<Inner> ◄┤
//!  Appender (drop) ──┘                └── CompletionState::reset
//! ```
//!
//! # Locking discipline
//!
//! * One [`parking_lot::Mutex`] per [`CompletionState`]; independent operators
//!   never contend with each other.
//! * Every critical section is a plain read or write of `Inner`.  Framing,
//!   JSON parsing and network I/O always happen before the lock is taken.
//! * Polling uses `try_lock`, so a plain host tick cannot block on the
//!   background request.  Admission and reset take the lock; they wait at
//!   most for one critical section of the writer.
//!
//! # Generations
//!
//! Each admitted request gets a fresh generation number and an [`Appender`]
//! bound to it.  [`CompletionState::reset`] bumps the generation, which turns
//! every outstanding `Appender` into a no-op: fragments that arrive after a
//! reset are discarded instead of reappearing in the visible text.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Inner {
    text: String,
    in_progress: bool,
    generation: u64,
    /// Bumped on every visible change; lets pollers skip unchanged copies.
    revision: u64,
    cancel: Option<CancellationToken>,
}

/// Point-in-time copy of the visible state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub in_progress: bool,
    pub revision: u64,
}

/// Outcome of a non-blocking read.
#[derive(Debug, PartialEq, Eq)]
pub enum TryRead {
    /// The background request holds the lock right now.
    Busy,
    /// Nothing changed since the given revision.
    Unchanged,
    Changed(Snapshot),
}

/// Completion text and in-progress flag of one operator instance.
///
/// Cloning is cheap and yields a handle to the *same* state.
#[derive(Debug, Clone, Default)]
pub struct CompletionState {
    inner: Arc<Mutex<Inner>>,
}

impl CompletionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a new request if none is in progress.
    ///
    /// On success the text is cleared, the flag is raised and the returned
    /// [`Appender`] is the only handle allowed to write.  Returns `None`
    /// without touching the state when a request is already running.
    pub fn begin_request(&self) -> Option<Appender> {
        let cancel = CancellationToken::new();
        let generation = {
            let mut inner = self.inner.lock();
            if inner.in_progress {
                return None;
            }
            inner.generation += 1;
            inner.revision += 1;
            inner.in_progress = true;
            inner.text.clear();
            inner.cancel = Some(cancel.clone());
            inner.generation
        };

        tracing::debug!(generation, "completion request admitted");
        Some(Appender {
            inner: Arc::clone(&self.inner),
            generation,
            cancel,
        })
    }

    /// Blocking read of text and flag.  Waits at most for one critical
    /// section of the writer.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            text: inner.text.clone(),
            in_progress: inner.in_progress,
            revision: inner.revision,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.inner.lock().in_progress
    }

    /// Non-blocking variant of [`Self::is_in_progress`]; `None` while the
    /// lock is held elsewhere.
    pub fn try_in_progress(&self) -> Option<bool> {
        self.inner.try_lock().map(|inner| inner.in_progress)
    }

    /// Non-blocking read for the host tick.  Copies the text only when it
    /// changed after `revision`.
    pub fn try_snapshot_since(&self, revision: u64) -> TryRead {
        let Some(inner) = self.inner.try_lock() else {
            return TryRead::Busy;
        };
        if inner.revision == revision {
            return TryRead::Unchanged;
        }
        TryRead::Changed(Snapshot {
            text: inner.text.clone(),
            in_progress: inner.in_progress,
            revision: inner.revision,
        })
    }

    /// Clear the text and lower the flag, whatever the background request is
    /// doing.  The request's cancellation token is triggered so its network
    /// read can stop early; its remaining appends are discarded either way.
    pub fn reset(&self) {
        let cancel = {
            let mut inner = self.inner.lock();
            inner.text.clear();
            inner.in_progress = false;
            inner.generation += 1;
            inner.revision += 1;
            inner.cancel.take()
        };

        if let Some(cancel) = cancel {
            tracing::info!("completion reset while a request was in flight");
            cancel.cancel();
        }
    }
}

/// The right to append to a [`CompletionState`], handed out by
/// [`CompletionState::begin_request`].
///
/// Dropping the appender marks the request as finished and re-opens the
/// admission gate, unless a reset already detached it.
#[derive(Debug)]
pub struct Appender {
    inner: Arc<Mutex<Inner>>,
    generation: u64,
    cancel: CancellationToken,
}

impl Appender {
    /// Append a token fragment.  Returns `false` once the request has been
    /// detached by a reset; the fragment is dropped in that case.
    pub fn append(&self, fragment: &str) -> bool {
        self.write(|text| text.push_str(fragment), fragment.is_empty())
    }

    /// Append an upstream error message so it shows up in the visible text.
    /// The request stays in progress.
    pub fn append_error(&self, message: &str) -> bool {
        tracing::warn!(generation = self.generation, %message, "upstream reported an error");
        self.append(message)
    }

    /// Append `message` and finish the request.
    pub fn fail(self, message: &str) -> bool {
        tracing::error!(generation = self.generation, %message, "completion request failed");
        self.append(message)
    }

    /// Whether appends are still honoured.
    pub fn is_live(&self) -> bool {
        self.inner.lock().generation == self.generation
    }

    /// Token cancelled by [`CompletionState::reset`].
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn write(&self, op: impl FnOnce(&mut String), unchanged: bool) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != self.generation {
            drop(inner);
            tracing::debug!(generation = self.generation, "discarding write from detached request");
            return false;
        }
        if !unchanged {
            op(&mut inner.text);
            inner.revision += 1;
        }
        true
    }
}

impl Drop for Appender {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.generation == self.generation && inner.in_progress {
            inner.in_progress = false;
            inner.revision += 1;
            inner.cancel = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn second_admission_is_a_noop_and_keeps_text() {
        let state = CompletionState::new();
        let first = state.begin_request().expect("first request is admitted");
        first.append("partial");

        assert!(state.begin_request().is_none());

        let snap = state.snapshot();
        assert_eq!(snap.text, "partial");
        assert!(snap.in_progress);
    }

    #[test]
    fn admission_clears_previous_text() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        appender.append("old");
        drop(appender);
        assert_eq!(state.snapshot().text, "old");

        let _next = state.begin_request().unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.text, "");
        assert!(snap.in_progress);
    }

    #[test]
    fn appends_concatenate_in_order() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        for fragment in ["Hel", "lo", "", " wor", "ld"] {
            assert!(appender.append(fragment));
        }
        assert_eq!(state.snapshot().text, "Hello world");
    }

    #[test]
    fn error_text_is_merged_and_request_continues() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        appender.append("a");
        appender.append_error("rate limited");
        appender.append("b");

        let snap = state.snapshot();
        assert_eq!(snap.text, "arate limitedb");
        assert!(snap.in_progress);
    }

    #[test]
    fn fail_appends_and_releases_gate() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        appender.append("tok");
        assert!(appender.fail("Error making request: boom"));

        let snap = state.snapshot();
        assert_eq!(snap.text, "tokError making request: boom");
        assert!(!snap.in_progress);
        assert!(state.begin_request().is_some());
    }

    #[test]
    fn reset_is_immediate_and_detaches_appender() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        appender.append("visible");

        state.reset();
        assert_eq!(state.snapshot().text, "");
        assert!(!state.snapshot().in_progress);
        assert!(appender.cancellation().is_cancelled());
        assert!(!appender.is_live());

        assert!(!appender.append("late"));
        assert_eq!(state.snapshot().text, "");
    }

    #[test]
    fn detached_appender_drop_does_not_release_new_request() {
        let state = CompletionState::new();
        let stale = state.begin_request().unwrap();
        state.reset();

        let fresh = state.begin_request().expect("reset re-opens the gate");
        fresh.append("new");
        drop(stale);

        let snap = state.snapshot();
        assert!(snap.in_progress);
        assert_eq!(snap.text, "new");
        assert!(!fresh.cancellation().is_cancelled());
    }

    #[test]
    fn reset_without_request_is_harmless() {
        let state = CompletionState::new();
        state.reset();
        assert_eq!(state.snapshot().text, "");
        assert!(!state.snapshot().in_progress);
    }

    #[test]
    fn try_snapshot_since_reports_busy_unchanged_and_changed() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        appender.append("x");

        let TryRead::Changed(snap) = state.try_snapshot_since(0) else {
            panic!("expected a changed snapshot");
        };
        assert_eq!(snap.text, "x");
        assert_eq!(state.try_snapshot_since(snap.revision), TryRead::Unchanged);

        let guard = state.inner.lock();
        assert_eq!(state.try_snapshot_since(snap.revision), TryRead::Busy);
        drop(guard);
    }

    #[test]
    fn try_in_progress_does_not_wait_for_the_lock() {
        let state = CompletionState::new();
        assert_eq!(state.try_in_progress(), Some(false));

        let _appender = state.begin_request().unwrap();
        assert_eq!(state.try_in_progress(), Some(true));

        let guard = state.inner.lock();
        assert_eq!(state.try_in_progress(), None);
        drop(guard);
    }

    #[test]
    fn concurrent_reader_sees_monotonic_prefixes() {
        let state = CompletionState::new();
        let appender = state.begin_request().unwrap();
        let fragments: Vec<String> = (0..2_000).map(|i| format!("<{i}>")).collect();
        let expected: String = fragments.concat();

        let reader_state = state.clone();
        let reader_expected = expected.clone();
        let reader = thread::spawn(move || {
            let mut last_len = 0;
            loop {
                let snap = reader_state.snapshot();
                assert!(reader_expected.starts_with(&snap.text));
                assert!(snap.text.len() >= last_len);
                last_len = snap.text.len();
                if !snap.in_progress {
                    break;
                }
            }
        });

        let writer = thread::spawn(move || {
            for fragment in &fragments {
                assert!(appender.append(fragment));
            }
        });

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(state.snapshot().text, expected);
    }
}
