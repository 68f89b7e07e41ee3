//! # Host Loop – simulated per-frame host
//!
//! Drives a [`CompletionOperator`] the way a visual-programming host would:
//! one `execute` call per frame at ~60 Hz, printing whatever new text became
//! visible since the previous frame.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-…      # or set `api_key` in the TOML file
//! cargo run -p completer --example host_loop -- "Write a limerick about crabs."
//! cargo run -p completer --example host_loop -- --params params.toml
//! ```
//!
//! Set `RUST_LOG=completer=debug` to see request lifecycle and frame
//! diagnostics.
//!
//! ---------------------------------------------------------------------------

use std::{
    io::{self, Write},
    thread,
    time::Duration,
};

use completer::openai::OpenAiAdapterBuilder;
use completer::{Admission, CompletionOperator, Parameters, Pulses};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    // 1. Parameters: a TOML file, or the prompt straight from the command line.
    let mut args = std::env::args().skip(1);
    let params = match args.next().as_deref() {
        Some("--params") => {
            let path = args.next().ok_or_else(|| anyhow::anyhow!("--params needs a path"))?;
            Parameters::from_toml_str(&std::fs::read_to_string(path)?)?
        }
        Some(prompt) => Parameters {
            prompt: prompt.to_owned(),
            max_tokens: 256,
            ..Parameters::default()
        },
        None => Parameters {
            prompt: "Tell me a two-sentence story about a lighthouse.".into(),
            ..Parameters::default()
        },
    };

    // 2. The host owns the runtime; the operator only needs a handle.
    let runtime = tokio::runtime::Runtime::new()?;
    let backend = OpenAiAdapterBuilder::new_from_env().build()?;
    let mut operator = CompletionOperator::new(backend, runtime.handle().clone());

    // 3. First frame pulses "complete".
    if operator.complete(&params) == Admission::MissingApiKey {
        println!("{}", operator.output());
        return Ok(());
    }

    // 4. Every following frame just republishes.
    let mut shown = 0;
    loop {
        let text = operator.execute(&params, Pulses::default());
        if text.len() > shown {
            print!("{}", &text[shown..]);
            io::stdout().flush().ok();
            shown = text.len();
        }
        if !operator.is_completing() {
            break;
        }
        thread::sleep(FRAME);
    }

    println!();
    Ok(())
}
