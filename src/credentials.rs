use std::env;

use crate::error::{GeminiError, Result};

/// Ambient credential seam. Implementations are consulted on every request
/// so a key change takes effect on the next invocation; nothing is cached
/// across calls.
pub trait ApiKeyProvider: Send + Sync {
    fn api_key(&self) -> Result<String>;
}

/// Reads the key from the process environment on every call, the same way
/// the hosting environment hands keys to the app.
pub struct EnvKeyProvider;

impl ApiKeyProvider for EnvKeyProvider {
    fn api_key(&self) -> Result<String> {
        env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .map_err(|_| {
                GeminiError::ConfigError(
                    "No API key found. Set GEMINI_API_KEY or API_KEY.".into(),
                )
            })
    }
}

/// Fixed key, for configs that carry one and for tests.
pub struct StaticKeyProvider {
    key: String,
}

impl StaticKeyProvider {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl ApiKeyProvider for StaticKeyProvider {
    fn api_key(&self) -> Result<String> {
        Ok(self.key.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_provider_returns_its_key() {
        let provider = StaticKeyProvider::new("test-key");
        assert_eq!(provider.api_key().unwrap(), "test-key");
    }

    #[test]
    fn env_provider_reads_current_value_on_every_call() {
        env::set_var("GEMINI_API_KEY", "first");
        let provider = EnvKeyProvider;
        assert_eq!(provider.api_key().unwrap(), "first");

        env::set_var("GEMINI_API_KEY", "second");
        assert_eq!(provider.api_key().unwrap(), "second");
        env::remove_var("GEMINI_API_KEY");
    }
}
