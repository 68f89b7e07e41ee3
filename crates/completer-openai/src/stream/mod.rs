//! Stream parsing pipeline: bytes ▶ [`Frame`]s ▶ [`CompletionEvent`]s ▶
//! appended text.
mod decoder;
mod event;
mod framer;

pub use decoder::CompletionDecoder;
pub use event::{CompletionEvent, classify};
pub use framer::{DEFAULT_MAX_FRAME_LEN, Frame, Framer};
