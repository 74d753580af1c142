//! Notifier implementations that do not deliver anywhere.

use async_trait::async_trait;
use watch_core::{Notifier, NotifyError};

/// A no-op notifier that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn send_message(&self, _chat_id: i64, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// A notifier that logs every message instead of sending it. Used for
/// dry runs.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        tracing::info!("[dry-run] Message to {}: {}", chat_id, text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_notifier() {
        NoOpNotifier.send_message(1, "test").await.unwrap();
    }

    #[tokio::test]
    async fn test_logging_notifier() {
        LoggingNotifier.send_message(1, "test").await.unwrap();
        LoggingNotifier.send_message(-100123, "group").await.unwrap();
    }
}
