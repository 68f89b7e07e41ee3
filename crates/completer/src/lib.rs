//! # `completer` – streaming text completion for per-frame hosts
//!
//! This crate is the *one-stop import* for embedding a streaming completion
//! operator in a host that ticks once per frame (a visual-programming
//! environment, a game loop, a UI timer):
//!
//! | Crate                  | What it provides                                                       |
//! |------------------------|------------------------------------------------------------------------|
//! | **`completer-core`**   | `RequestConfig`, `CompletionState`, the provider trait, errors         |
//! | **`completer-openai`** | Completions transport, brace framer, event classifier *(optional)*     |
//! | **`completer`**        | [`CompletionOperator`], host [`Parameters`] and their schema           |
//!
//! ## How a request flows
//!
//! 1. The host sets the `complete` pulse.  The operator resolves the API key,
//!    admits the request on its [`CompletionState`] and spawns the provider
//!    on a Tokio runtime.
//! 2. The provider frames the response body into JSON objects, classifies
//!    each one and appends tokens (and upstream error messages) to the state.
//! 3. Every tick the operator republishes the text if it changed, without
//!    ever blocking on the background request.
//! 4. The `reset` pulse clears the text and cancels the request.
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use completer::{CompletionOperator, Parameters, Pulses};
//! use completer::openai::OpenAiAdapterBuilder;
//!
//! # fn main() -> anyhow::Result<()> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let backend = OpenAiAdapterBuilder::new_from_env().build()?;
//! let mut operator = CompletionOperator::new(backend, runtime.handle().clone());
//!
//! let params = Parameters { prompt: "Once upon a time".into(), ..Parameters::default() };
//! operator.execute(&params, Pulses { complete: true, reset: false });
//! loop {
//!     let text = operator.execute(&params, Pulses::default());
//!     println!("{text}");
//!     if !operator.is_completing() { break; }
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! # Ok(())
//! # }
//! ```
#![doc(html_root_url = "https://docs.rs/completer/latest")]

pub mod operator;
pub mod params;

pub use completer_core::*;
pub use operator::{Admission, CompletionOperator, OPERATOR_INFO, OperatorInfo, Pulses};
pub use params::{PARAMETERS, ParameterKind, ParameterSpec, Parameters};

#[cfg(feature = "openai")]
pub use completer_openai as openai;
