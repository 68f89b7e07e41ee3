use serde::Deserialize;
use serde_json::Value;

use crate::api_v1::{ApiErrorEnvelope, CompletionChunk};

/// What a single frame turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionEvent {
    /// `{"error": {"message": ...}}`
    Error { message: String },
    /// `choices[0].text` of a regular increment; may be empty.
    Token { text: String },
    /// Not JSON, or JSON of neither shape.
    Malformed,
}

/// Parse one frame and classify it.
///
/// The frame is parsed into a generic [`Value`] first; the error shape is
/// checked before the token shape, so an object carrying both is an error.
/// Nothing here is fatal: whatever cannot be recognised becomes
/// [`CompletionEvent::Malformed`].
pub fn classify(frame: &[u8]) -> CompletionEvent {
    let value: Value = match serde_json::from_slice(frame) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, len = frame.len(), "frame is not valid JSON");
            return CompletionEvent::Malformed;
        }
    };

    if let Ok(envelope) = ApiErrorEnvelope::deserialize(&value) {
        return CompletionEvent::Error {
            message: envelope.error.message,
        };
    }

    match CompletionChunk::deserialize(&value) {
        Ok(chunk) => match chunk.choices.into_iter().next() {
            Some(choice) => CompletionEvent::Token { text: choice.text },
            None => {
                tracing::debug!("increment carries no choices");
                CompletionEvent::Malformed
            }
        },
        Err(err) => {
            tracing::debug!(%err, "frame matches neither token nor error shape");
            CompletionEvent::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str) -> CompletionEvent {
        CompletionEvent::Token { text: text.into() }
    }

    #[test]
    fn token_increment() {
        assert_eq!(classify(br#"{"choices":[{"text":"foo"}]}"#), token("foo"));
    }

    #[test]
    fn full_openai_increment() {
        let frame = br#"{"id":"cmpl-1","object":"text_completion","created":1,"choices":[{"text":" the","index":0,"logprobs":null,"finish_reason":null}],"model":"gpt-3.5-turbo-instruct"}"#;
        assert_eq!(classify(frame), token(" the"));
    }

    #[test]
    fn empty_text_is_still_a_token() {
        assert_eq!(
            classify(br#"{"choices":[{"text":"","finish_reason":"stop"}]}"#),
            token("")
        );
    }

    #[test]
    fn only_first_choice_counts() {
        assert_eq!(
            classify(br#"{"choices":[{"text":"a"},{"text":"b"}]}"#),
            token("a")
        );
    }

    #[test]
    fn error_payload() {
        assert_eq!(
            classify(br#"{"error":{"message":"bad key","type":"invalid_request_error"}}"#),
            CompletionEvent::Error {
                message: "bad key".into()
            }
        );
    }

    #[test]
    fn error_wins_over_choices() {
        assert_eq!(
            classify(br#"{"choices":[{"text":"x"}],"error":{"message":"nope"}}"#),
            CompletionEvent::Error {
                message: "nope".into()
            }
        );
    }

    #[test]
    fn unknown_shapes_are_malformed() {
        for frame in [
            &br#"{"foo":1}"#[..],
            br#"{"choices":[]}"#,
            br#"{"choices":[{"delta":{}}]}"#,
            br#"{"error":{"code":42}}"#,
            br#"{"choices":[{"text":"unterminated"#,
            b"{not json}",
        ] {
            assert_eq!(classify(frame), CompletionEvent::Malformed, "{frame:?}");
        }
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        assert_eq!(classify(b"{\"choices\":[{\"text\":\"\xff\"}]}"), CompletionEvent::Malformed);
    }
}
