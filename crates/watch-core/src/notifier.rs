//! Outbound notification seam.

use async_trait::async_trait;

use crate::error::NotifyError;

/// Trait for delivering a composed message to a user.
///
/// Abstracted to support different transports (Telegram, tests, etc.).
/// Implementations must suppress link previews.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a text message to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        (**self).send_message(chat_id, text).await
    }
}
