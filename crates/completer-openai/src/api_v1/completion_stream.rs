use serde::Deserialize;

/// A single streaming choice payload.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct CompletionChunkChoice {
    pub text: String,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The outermost object sent by OpenAI for each streamed increment.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<CompletionChunkChoice>,
}

/// `{"error": {...}}`, sent either as the whole body of a failed request or
/// interleaved with increments on the stream.
#[derive(Debug, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
