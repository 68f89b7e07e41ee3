use std::{env, fmt};

use crate::error::{CompleterError, Result};

/// Environment variable consulted when no key is configured explicitly.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// A bearer token for the completion endpoint.
///
/// `Debug` never prints the secret, so the key can travel inside structs that
/// end up in log lines.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap `key`, rejecting blank input.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_owned()))
    }

    /// Use `explicit` when it is non-blank, otherwise fall back to
    /// [`API_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// * [`CompleterError::MissingApiKey`] – both sources are empty.
    pub fn resolve(explicit: &str) -> Result<Self> {
        Self::resolve_with(explicit, |name| env::var(name).ok())
    }

    /// Like [`Self::resolve`] with an injectable environment lookup.
    pub fn resolve_with(explicit: &str, lookup: impl FnOnce(&str) -> Option<String>) -> Result<Self> {
        Self::new(explicit)
            .or_else(|| lookup(API_KEY_ENV).and_then(Self::new))
            .ok_or(CompleterError::MissingApiKey)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}
