//! Configuration types for telegram-client.

use std::env;

use crate::error::TelegramError;

/// Default Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Configuration for connecting to the Bot API.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Base URL of the Bot API (e.g., "https://api.telegram.org").
    pub api_url: String,
    /// Bot token issued by BotFather.
    pub bot_token: String,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl TelegramConfig {
    /// Create a configuration for the public Bot API.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            bot_token: bot_token.into(),
            timeout_secs: 30,
        }
    }

    /// Point the client at another API server (e.g. a local Bot API server).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Load from `BOT_TOKEN` and optional `TELEGRAM_API_URL`.
    pub fn from_env() -> Result<Self, TelegramError> {
        let token = env::var("BOT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| TelegramError::Config("BOT_TOKEN not set".to_string()))?;

        let config = Self::new(token);
        Ok(match env::var("TELEGRAM_API_URL") {
            Ok(url) if !url.trim().is_empty() => config.with_api_url(url),
            _ => config,
        })
    }

    /// URL of a Bot API method.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_url.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }
}
