//! Configuration for the Perplexity provider.

use std::env;
use watch_core::ProviderError;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.perplexity.ai";

/// Default model.
pub const DEFAULT_MODEL: &str = "sonar-pro";

/// Default HTTP timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for [`PerplexityProvider`](crate::PerplexityProvider).
#[derive(Debug, Clone)]
pub struct PerplexityConfig {
    /// API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for the response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    pub temperature: Option<f32>,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            temperature: Some(0.2),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PerplexityConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `PERPLEXITY_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `PERPLEXITY_API_URL` - API URL (default: https://api.perplexity.ai)
    /// - `PERPLEXITY_MODEL` - Model name (default: sonar-pro)
    /// - `PERPLEXITY_MAX_TOKENS` - Max tokens (default: provider default)
    /// - `PERPLEXITY_TIMEOUT_SECS` - HTTP timeout (default: 60)
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = env::var("PERPLEXITY_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::Configuration("PERPLEXITY_API_KEY not set".to_string())
            })?;

        let api_url =
            env::var("PERPLEXITY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let model = env::var("PERPLEXITY_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let max_tokens = env::var("PERPLEXITY_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok());

        let timeout_secs = env::var("PERPLEXITY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            timeout_secs,
            ..Self::default()
        })
    }

    /// Create a new config builder.
    pub fn builder() -> PerplexityConfigBuilder {
        PerplexityConfigBuilder::default()
    }

    /// Full chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// Builder for PerplexityConfig.
#[derive(Debug, Default)]
pub struct PerplexityConfigBuilder {
    config: PerplexityConfig,
}

impl PerplexityConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the HTTP timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> PerplexityConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PerplexityConfig::default();

        assert_eq!(config.api_url, "https://api.perplexity.ai");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, "sonar-pro");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_builder_all_options() {
        let config = PerplexityConfig::builder()
            .api_key("my-key")
            .api_url("https://proxy.example.com/")
            .model("sonar")
            .max_tokens(800)
            .temperature(0.0)
            .timeout_secs(5)
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.model, "sonar");
        assert_eq!(config.max_tokens, Some(800));
        assert_eq!(config.temperature, Some(0.0));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.completions_url(),
            "https://proxy.example.com/chat/completions"
        );
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        fn clear_all() {
            for var in [
                "PERPLEXITY_API_KEY",
                "PERPLEXITY_API_URL",
                "PERPLEXITY_MODEL",
                "PERPLEXITY_MAX_TOKENS",
                "PERPLEXITY_TIMEOUT_SECS",
            ] {
                std::env::remove_var(var);
            }
        }

        // Missing API key
        clear_all();
        match PerplexityConfig::from_env() {
            Err(ProviderError::Configuration(msg)) => assert!(msg.contains("PERPLEXITY_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Defaults
        clear_all();
        std::env::set_var("PERPLEXITY_API_KEY", "env-key");
        let config = PerplexityConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.model, "sonar-pro");
        assert_eq!(config.timeout_secs, 60);
        assert!(config.max_tokens.is_none());

        // Overrides
        std::env::set_var("PERPLEXITY_MODEL", "sonar");
        std::env::set_var("PERPLEXITY_TIMEOUT_SECS", "15");
        std::env::set_var("PERPLEXITY_MAX_TOKENS", "1200");
        let config = PerplexityConfig::from_env().unwrap();
        assert_eq!(config.model, "sonar");
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.max_tokens, Some(1200));

        clear_all();
    }
}
