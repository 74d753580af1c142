//! Telegram Bot API client.
//!
//! Sends plain-text messages with link previews disabled and implements the
//! [`Notifier`](watch_core::Notifier) seam for the scheduler.
//!
//! # Example
//!
//! ```no_run
//! use telegram_client::{TelegramClient, TelegramConfig};
//!
//! # async fn example() -> Result<(), telegram_client::TelegramError> {
//! let client = TelegramClient::new(TelegramConfig::new("123:ABC"))?;
//! client.send_text(1001, "Hello!").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod types;

pub use client::{TelegramClient, MAX_MESSAGE_CHARS};
pub use config::TelegramConfig;
pub use error::TelegramError;
pub use types::{LinkPreviewOptions, SendMessageParams};
