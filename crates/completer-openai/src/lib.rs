mod adapter;
mod model_map;

pub use adapter::{BASE_URL_ENV, OpenAiAdapter, OpenAiAdapterBuilder};
pub use client::{ChunkSink, OpenAiClient, StreamEnd};
pub mod api_v1;
mod client;
pub mod error;
pub mod stream;
