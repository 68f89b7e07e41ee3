//! The immutable description of one completion request.
//!
//! A [`RequestConfig`] is assembled once, when the operator admits a request,
//! and never changes afterwards.  Every numeric setter clamps into the range
//! the completion endpoint accepts, so a config obtained from this module is
//! always valid to send.

use std::ops::RangeInclusive;

use crate::model::Model;

pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const TOP_P_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const PENALTY_RANGE: RangeInclusive<f64> = -2.0..=2.0;
pub const MAX_TOKENS_RANGE: RangeInclusive<u32> = 0..=4096;

pub const DEFAULT_MAX_TOKENS: u32 = 128;

/// The three prompt inputs a host exposes, concatenated as
/// `prefix + body + suffix`.
///
/// ```rust
/// use completer_core::config::PromptParts;
///
/// let prompt = PromptParts::new("Q: ", "why is the sky blue?", "\nA:").assemble();
/// assert_eq!(prompt, "Q: why is the sky blue?\nA:");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptParts {
    pub prefix: String,
    pub body: String,
    pub suffix: String,
}

impl PromptParts {
    pub fn new(prefix: impl Into<String>, body: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            body: body.into(),
            suffix: suffix.into(),
        }
    }

    pub fn assemble(&self) -> String {
        let mut prompt =
            String::with_capacity(self.prefix.len() + self.body.len() + self.suffix.len());
        prompt.push_str(&self.prefix);
        prompt.push_str(&self.body);
        prompt.push_str(&self.suffix);
        prompt
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub prompt: String,
    pub stop: String,
    pub model: Model,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub stream: bool,
}

impl RequestConfig {
    /// Config with the endpoint defaults: temperature and top-p at 1, no
    /// penalties, 128 tokens, no stop sequence, streaming on.
    pub fn new(prompt: impl Into<String>, model: impl Into<Model>) -> Self {
        Self {
            prompt: prompt.into(),
            stop: String::new(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 1.0,
            top_p: 1.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            stream: true,
        }
    }

    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop = stop.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: i64) -> Self {
        let (lo, hi) = (*MAX_TOKENS_RANGE.start(), *MAX_TOKENS_RANGE.end());
        self.max_tokens = max_tokens.clamp(i64::from(lo), i64::from(hi)) as u32;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = clamp(temperature, &TEMPERATURE_RANGE);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = clamp(top_p, &TOP_P_RANGE);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = clamp(penalty, &PENALTY_RANGE);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = clamp(penalty, &PENALTY_RANGE);
        self
    }
}

/// Clamp into `range`; NaN collapses to the lower bound.
fn clamp(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OpenAiModel;

    #[test]
    fn setters_clamp_into_endpoint_ranges() {
        let config = RequestConfig::new("hi", "gpt-3.5-turbo-instruct")
            .with_temperature(3.5)
            .with_top_p(-1.0)
            .with_max_tokens(10_000)
            .with_presence_penalty(-7.0)
            .with_frequency_penalty(f64::NAN);

        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.top_p, 0.0);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.presence_penalty, -2.0);
        assert_eq!(config.frequency_penalty, -2.0);
        assert_eq!(config.model, Model::OpenAi(OpenAiModel::Gpt35TurboInstruct));
    }

    #[test]
    fn negative_max_tokens_clamp_to_zero() {
        let config = RequestConfig::new("", Model::Custom("x".into())).with_max_tokens(-5);
        assert_eq!(config.max_tokens, 0);
    }

    #[test]
    fn new_config_always_streams() {
        let config = RequestConfig::new("", "davinci-002");
        assert!(config.stream);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.stop.is_empty());
    }

    #[test]
    fn prompt_parts_concatenate_in_order() {
        let parts = PromptParts::new("[", "body", "]");
        assert_eq!(parts.assemble(), "[body]");
        assert_eq!(PromptParts::default().assemble(), "");
    }
}
