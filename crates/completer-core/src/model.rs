//! Model identifiers used throughout the **completer** workspace.
//!
//! Hosts hand the operator a plain string, so unlike a compile-time prompt
//! definition the identifier is parsed at runtime: well-known completion
//! models map onto an enum variant, everything else is kept verbatim in
//! [`Model::Custom`] and forwarded untouched.
//!
//! # Adding more models
//!
//! 1. Add the variant to [`OpenAiModel`] and to [`OpenAiModel::ALL`].
//! 2. Update `completer-openai::model_map::map_model`.
//!
//! # Example
//!
//! ```rust
//! use completer_core::model::{Model, OpenAiModel};
//! assert_eq!(Model::from("gpt-3.5-turbo-instruct"),
//!            Model::OpenAi(OpenAiModel::Gpt35TurboInstruct));
//! assert_eq!(Model::from("my-finetune"), Model::Custom("my-finetune".into()));
//! ```

use std::fmt::Display;

/// Universal identifier for a completion model.
///
/// * `OpenAi` – models the OpenAI legacy *completions* endpoint knows about.
/// * `Custom` – any other identifier (fine-tunes, compatible self-hosted
///   servers, models released after this list was written).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    OpenAi(OpenAiModel),
    Custom(String),
}

/// Completion models with a dedicated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenAiModel {
    Gpt35TurboInstruct,
    Davinci002,
    Babbage002,
    TextDavinci003,
}

impl OpenAiModel {
    pub const ALL: [OpenAiModel; 4] = [
        OpenAiModel::Gpt35TurboInstruct,
        OpenAiModel::Davinci002,
        OpenAiModel::Babbage002,
        OpenAiModel::TextDavinci003,
    ];

    /// Canonical wire identifier.
    pub fn id(self) -> &'static str {
        match self {
            OpenAiModel::Gpt35TurboInstruct => "gpt-3.5-turbo-instruct",
            OpenAiModel::Davinci002 => "davinci-002",
            OpenAiModel::Babbage002 => "babbage-002",
            OpenAiModel::TextDavinci003 => "text-davinci-003",
        }
    }
}

impl From<OpenAiModel> for Model {
    fn from(val: OpenAiModel) -> Self {
        Model::OpenAi(val)
    }
}

impl From<&str> for Model {
    fn from(value: &str) -> Self {
        let value = value.trim();
        OpenAiModel::ALL
            .into_iter()
            .find(|model| model.id() == value)
            .map(Model::OpenAi)
            .unwrap_or_else(|| Model::Custom(value.to_owned()))
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::OpenAi(model) => f.write_str(model.id()),
            Model::Custom(custom) => f.write_str(custom),
        }
    }
}
