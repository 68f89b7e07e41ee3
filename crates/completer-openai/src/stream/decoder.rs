use completer_core::{provider::StreamStats, state::Appender};

use crate::{
    client::ChunkSink,
    error::OpenAiError,
    stream::{CompletionEvent, Framer, classify},
};

/// Chunk consumer that runs framer and classifier and writes the result into
/// an [`Appender`].
///
/// Tokens and upstream errors are appended in arrival order; malformed frames
/// are only counted.  A short count is returned when the framer fails or the
/// appender was detached by a reset, so the transport stops reading.
#[derive(Debug)]
pub struct CompletionDecoder<'a> {
    framer: Framer,
    appender: &'a Appender,
    stats: StreamStats,
    failure: Option<OpenAiError>,
    detached: bool,
}

impl<'a> CompletionDecoder<'a> {
    pub fn new(appender: &'a Appender) -> Self {
        Self::with_framer(appender, Framer::new())
    }

    pub fn with_framer(appender: &'a Appender, framer: Framer) -> Self {
        Self {
            framer,
            appender,
            stats: StreamStats::default(),
            failure: None,
            detached: false,
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Whether the last chunk was refused because the request was reset.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// The framing error that made the decoder refuse a chunk, if any.
    pub fn take_failure(&mut self) -> Option<OpenAiError> {
        self.failure.take()
    }

    fn apply(&mut self, event: CompletionEvent) -> bool {
        match event {
            CompletionEvent::Token { text } => {
                self.stats.tokens += 1;
                self.appender.append(&text)
            }
            CompletionEvent::Error { message } => {
                self.stats.errors += 1;
                self.appender.append_error(&message)
            }
            CompletionEvent::Malformed => {
                self.stats.malformed += 1;
                true
            }
        }
    }
}

impl ChunkSink for CompletionDecoder<'_> {
    fn on_chunk(&mut self, chunk: &[u8]) -> usize {
        self.stats.bytes += chunk.len();

        let mut frames = Vec::new();
        let pushed = self.framer.push(chunk, &mut frames);

        for frame in frames {
            self.stats.frames += 1;
            if !self.apply(classify(frame.as_bytes())) {
                self.detached = true;
                return 0;
            }
        }

        if let Err(err) = pushed {
            tracing::error!(%err, "abandoning stream");
            self.failure = Some(err);
            return 0;
        }

        chunk.len()
    }
}
