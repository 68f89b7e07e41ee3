//! # Stream Events – the parser without the operator
//!
//! Uses the OpenAI client directly and prints every classified event as it
//! arrives: tokens inline, upstream errors and malformed frames on stderr.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-…
//! cargo run -p completer --example stream_events
//! ```
//!
//! ---------------------------------------------------------------------------

use std::io::{self, Write};

use completer::openai::{OpenAiAdapterBuilder, api_v1::CompletionRequest, stream::CompletionEvent};
use completer::{ApiKey, RequestConfig};
use futures_util::StreamExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api_key = ApiKey::resolve("")?;
    let client = OpenAiAdapterBuilder::new_from_env().build()?.client(api_key);

    let config = RequestConfig::new("List three uses for a paperclip:\n1.", "gpt-3.5-turbo-instruct")
        .with_max_tokens(96)
        .with_temperature(0.7);
    let request = CompletionRequest::try_from(config)?;

    let mut events = Box::pin(client.completion_events(request));
    while let Some(event) = events.next().await {
        match event? {
            CompletionEvent::Token { text } => {
                print!("{text}");
                io::stdout().flush().ok();
            }
            CompletionEvent::Error { message } => eprintln!("\n[upstream error] {message}"),
            CompletionEvent::Malformed => eprintln!("\n[malformed frame skipped]"),
        }
    }

    println!("\n\nStream finished ✅");
    Ok(())
}
