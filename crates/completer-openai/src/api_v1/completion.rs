use completer_core::{config::RequestConfig, error::CompleterError};
use serde::Serialize;

use crate::model_map::map_model;

/// Body of `POST /v1/completions`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub stream: bool,
}

impl TryFrom<RequestConfig> for CompletionRequest {
    type Error = CompleterError;

    fn try_from(value: RequestConfig) -> Result<Self, Self::Error> {
        let model = map_model(&value.model)
            .ok_or_else(|| {
                CompleterError::InvalidRequest(format!(
                    "backend does not support selected model: {:?}",
                    value.model
                ))
            })?
            .into_owned();

        Ok(Self {
            model,
            prompt: value.prompt,
            // An empty stop sequence is rejected upstream; leave it out.
            stop: Some(value.stop).filter(|stop| !stop.is_empty()),
            max_tokens: value.max_tokens,
            temperature: value.temperature,
            top_p: value.top_p,
            presence_penalty: value.presence_penalty,
            frequency_penalty: value.frequency_penalty,
            stream: value.stream,
        })
    }
}
