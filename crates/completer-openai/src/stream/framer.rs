//! Incremental brace-depth framer.
//!
//! The streaming endpoint sends each increment as its own JSON object,
//! wrapped in SSE noise (`data: `, blank lines, a trailing `[DONE]`).  The
//! transport hands those bytes over in arbitrarily sized chunks, so one object
//! may be split across reads and one read may carry several objects.
//!
//! [`Framer`] is a small state machine over that byte stream:
//!
//! * at depth 0 every byte up to the next `{` is dropped,
//! * `{` increases the depth and starts (or continues) the current frame,
//! * `}` decreases it, and reaching depth 0 again emits the frame.
//!
//! Braces inside JSON strings are counted like any other.  A frame that gets
//! mis-delimited that way simply fails to parse later on and is reported as
//! malformed; the framer itself never looks inside a frame.
//!
//! Scanning works on bytes: `{` and `}` are ASCII and can never appear inside
//! a multi-byte UTF-8 sequence, so a character split across two chunks is
//! carried over intact.

use bytes::{Bytes, BytesMut};

use crate::error::OpenAiError;

/// Upper bound for a frame that has not been closed yet.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024 * 1024;

/// One brace-balanced object cut out of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Carry-over state between two chunks: the partial frame and its depth.
#[derive(Debug)]
pub struct Framer {
    buf: BytesMut,
    depth: usize,
    max_frame_len: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            depth: 0,
            max_frame_len,
        }
    }

    /// Current nesting depth; non-zero while a frame is open.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bytes of the frame that is still open.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// Feed the next chunk and push every frame it completes onto `frames`.
    ///
    /// # Errors
    ///
    /// * [`OpenAiError::FrameTooLarge`] – the open frame grew past the limit.
    ///   Frames completed earlier in the same chunk are still pushed.  The
    ///   framer is cleared so it could be reused, but the stream it was
    ///   reading should be abandoned.
    pub fn push(&mut self, chunk: &[u8], frames: &mut Vec<Frame>) -> Result<(), OpenAiError> {
        // Start of the part of `chunk` that belongs to the open frame.
        let mut start = (self.depth > 0).then_some(0);

        for (pos, &byte) in chunk.iter().enumerate() {
            match byte {
                b'{' => {
                    if self.depth == 0 {
                        start = Some(pos);
                    }
                    self.depth += 1;
                }
                b'}' if self.depth > 0 => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        if let Some(from) = start.take() {
                            self.buf.extend_from_slice(&chunk[from..=pos]);
                        }
                        frames.push(Frame(self.buf.split().freeze()));
                    }
                }
                _ => {}
            }
        }

        if let Some(from) = start {
            self.buf.extend_from_slice(&chunk[from..]);
        }

        if self.buf.len() > self.max_frame_len {
            self.buf.clear();
            self.depth = 0;
            return Err(OpenAiError::FrameTooLarge {
                limit: self.max_frame_len,
            });
        }

        Ok(())
    }
}
