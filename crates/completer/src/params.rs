//! Host-exposed parameters of the operator.
//!
//! [`Parameters`] holds the current value of every setting; [`PARAMETERS`]
//! describes them (name, label, kind, default, clamp range) in the order a
//! host should lay out its parameter page.  Headless hosts can load the
//! values from TOML:
//!
//! ```rust
//! use completer::params::Parameters;
//!
//! let params = Parameters::from_toml_str(r#"
//!     prompt = "Write a haiku about rust."
//!     temperature = 0.7
//! "#).unwrap();
//! assert_eq!(params.max_tokens, 128);
//! ```

use completer_core::{
    config::{MAX_TOKENS_RANGE, PENALTY_RANGE, TEMPERATURE_RANGE, TOP_P_RANGE},
    credentials::ApiKey,
    error::{CompleterError, Result},
    PromptParts, RequestConfig,
};
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-instruct";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Falls back to `OPENAI_API_KEY` when blank.
    pub api_key: String,
    pub model: String,
    pub prefix: String,
    pub prompt: String,
    pub suffix: String,
    pub stop: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: i64,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_owned(),
            prefix: String::new(),
            prompt: String::new(),
            suffix: String::new(),
            stop: String::new(),
            temperature: 1.0,
            top_p: 1.0,
            max_tokens: 128,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
        }
    }
}

impl Parameters {
    /// Parse parameters from TOML; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// * [`CompleterError::Invalid`] – malformed TOML or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|err| CompleterError::Invalid(err.to_string()))
    }

    /// Snapshot of the current values as a request, clamped into range.
    pub fn request_config(&self) -> RequestConfig {
        let prompt = PromptParts::new(&*self.prefix, &*self.prompt, &*self.suffix).assemble();
        RequestConfig::new(prompt, self.model.as_str())
            .with_stop(self.stop.as_str())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_presence_penalty(self.presence_penalty)
            .with_frequency_penalty(self.frequency_penalty)
    }

    /// Resolve the key with `lookup` standing in for the process environment.
    pub fn api_key_with(&self, lookup: impl FnOnce(&str) -> Option<String>) -> Result<ApiKey> {
        ApiKey::resolve_with(&self.api_key, lookup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParameterKind {
    Text { default: &'static str },
    Float { default: f64, min: f64, max: f64 },
    Int { default: i64, min: i64, max: i64 },
    /// One-shot trigger, see [`crate::operator::Pulses`].
    Pulse,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParameterKind,
}

const fn text(name: &'static str, label: &'static str, default: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        label,
        kind: ParameterKind::Text { default },
    }
}

const fn float(
    name: &'static str,
    label: &'static str,
    default: f64,
    range: &std::ops::RangeInclusive<f64>,
) -> ParameterSpec {
    ParameterSpec {
        name,
        label,
        kind: ParameterKind::Float {
            default,
            min: *range.start(),
            max: *range.end(),
        },
    }
}

const fn pulse(name: &'static str, label: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        label,
        kind: ParameterKind::Pulse,
    }
}

/// Parameter page, in display order.
pub const PARAMETERS: &[ParameterSpec] = &[
    text("Apikey", "Api Key", ""),
    text("Model", "Model", DEFAULT_MODEL),
    text("Prefix", "Prefix", ""),
    text("Suffix", "Suffix", ""),
    text("Prompt", "Prompt", ""),
    text("Stop", "Stop sequence", ""),
    float("Temperature", "Temperature", 1.0, &TEMPERATURE_RANGE),
    float("Topp", "Top P", 1.0, &TOP_P_RANGE),
    ParameterSpec {
        name: "Maxtokens",
        label: "Max Tokens",
        kind: ParameterKind::Int {
            default: 128,
            min: *MAX_TOKENS_RANGE.start() as i64,
            max: *MAX_TOKENS_RANGE.end() as i64,
        },
    },
    float("Presencepenalty", "Presence Penalty", 0.0, &PENALTY_RANGE),
    float("Frequencypenalty", "Frequency Penalty", 0.0, &PENALTY_RANGE),
    pulse("Complete", "Complete"),
    pulse("Reset", "Reset"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use completer_core::model::{Model, OpenAiModel};

    fn kind_of(name: &str) -> ParameterKind {
        PARAMETERS
            .iter()
            .find(|spec| spec.name == name)
            .map(|spec| spec.kind)
            .unwrap()
    }

    #[test]
    fn schema_defaults_match_parameter_defaults() {
        let params = Parameters::default();
        assert_eq!(kind_of("Model"), ParameterKind::Text { default: DEFAULT_MODEL });
        assert_eq!(params.model, DEFAULT_MODEL);
        assert_eq!(
            kind_of("Temperature"),
            ParameterKind::Float { default: params.temperature, min: 0.0, max: 1.0 }
        );
        assert_eq!(
            kind_of("Maxtokens"),
            ParameterKind::Int { default: params.max_tokens, min: 0, max: 4096 }
        );
        assert_eq!(
            kind_of("Frequencypenalty"),
            ParameterKind::Float { default: params.frequency_penalty, min: -2.0, max: 2.0 }
        );
        assert_eq!(kind_of("Complete"), ParameterKind::Pulse);
        assert_eq!(PARAMETERS.len(), 13);
    }

    #[test]
    fn request_config_concatenates_prompt_and_clamps() {
        let params = Parameters {
            prefix: "P:".into(),
            prompt: "body".into(),
            suffix: ":S".into(),
            temperature: 2.0,
            max_tokens: 9_999,
            presence_penalty: -3.0,
            ..Parameters::default()
        };

        let config = params.request_config();
        assert_eq!(config.prompt, "P:body:S");
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.presence_penalty, -2.0);
        assert_eq!(config.model, Model::OpenAi(OpenAiModel::Gpt35TurboInstruct));
        assert!(config.stream);
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let params = Parameters::from_toml_str(
            r#"
            model = "davinci-002"
            stop = "\n\n"
            top_p = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(params.model, "davinci-002");
        assert_eq!(params.stop, "\n\n");
        assert_eq!(params.top_p, 0.5);
        assert_eq!(params.temperature, 1.0);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        let err = Parameters::from_toml_str("temprature = 0.2").unwrap_err();
        assert!(matches!(err, CompleterError::Invalid(_)));
    }

    #[test]
    fn api_key_parameter_beats_environment() {
        let params = Parameters {
            api_key: "sk-param".into(),
            ..Parameters::default()
        };
        let key = params.api_key_with(|_| Some("sk-env".into())).unwrap();
        assert_eq!(key.expose(), "sk-param");
    }
}
