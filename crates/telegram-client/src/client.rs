//! Bot API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};
use watch_core::{Notifier, NotifyError};

use crate::config::TelegramConfig;
use crate::error::TelegramError;
use crate::types::{ApiResponse, BotUser, SendMessageParams, SentMessage};

/// Bot API limit on message text length.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Client for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramClient {
    http: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    /// Build a client. No request is made until the first call.
    pub fn new(config: TelegramConfig) -> Result<Self, TelegramError> {
        if config.bot_token.trim().is_empty() {
            return Err(TelegramError::Config("bot token is empty".to_string()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TelegramError::Http)?;

        Ok(Self { http, config })
    }

    /// Build a client from `BOT_TOKEN` / `TELEGRAM_API_URL`.
    pub fn from_env() -> Result<Self, TelegramError> {
        Self::new(TelegramConfig::from_env()?)
    }

    /// Fetch the bot's own account. Useful as a startup token check.
    pub async fn get_me(&self) -> Result<BotUser, TelegramError> {
        let me: BotUser = self.call("getMe", &serde_json::json!({})).await?;
        info!(bot_id = me.id, username = ?me.username, "Telegram bot authenticated");
        Ok(me)
    }

    /// Send a message using the full parameter structure.
    pub async fn send(&self, mut params: SendMessageParams) -> Result<SentMessage, TelegramError> {
        params.text = truncate_message(&params.text);
        self.call("sendMessage", &params).await
    }

    /// Send plain text with link previews disabled.
    pub async fn send_text(&self, chat_id: i64, text: &str) -> Result<SentMessage, TelegramError> {
        info!(chat_id, "Sending text message");
        self.send(SendMessageParams::text(chat_id, text)).await
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.method_url(method);
        debug!(method, "Bot API call");

        let response = self.http.post(&url).json(params).send().await?;
        let body = response.text().await?;
        let envelope: ApiResponse<T> = serde_json::from_str(&body)?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                error_code,
                description,
                ..
            } => {
                let err = TelegramError::Api {
                    code: error_code.unwrap_or_default(),
                    description: description.unwrap_or_else(|| "no description".to_string()),
                };
                warn!(method, "Bot API call failed: {}", err);
                Err(err)
            }
        }
    }
}

/// Cut text to the Bot API limit, marking the cut with an ellipsis.
fn truncate_message(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    out.push('…');
    out
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        self.send_text(chat_id, text)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::SendFailed(e.to_string()))
    }
}
