//! Recording notifier - captures outbound messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use watch_core::{Notifier, NotifyError};

/// A notifier that stores every message it is asked to send.
///
/// Clones share state. While failing is switched on, sends return
/// [`NotifyError::SendFailed`] and nothing is recorded.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(i64, String)>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All `(chat_id, text)` pairs delivered so far.
    pub fn messages(&self) -> Vec<(i64, String)> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Texts delivered to one chat.
    pub fn messages_for(&self, chat_id: i64) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.messages().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::SendFailed("recording notifier set to fail".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((chat_id, text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_messages_per_chat() {
        let notifier = RecordingNotifier::new();
        notifier.send_message(1, "a").await.unwrap();
        notifier.send_message(2, "b").await.unwrap();
        notifier.send_message(1, "c").await.unwrap();

        assert_eq!(notifier.count(), 3);
        assert_eq!(notifier.messages_for(1), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_failing_mode() {
        let notifier = RecordingNotifier::new();
        notifier.set_failing(true);
        assert!(notifier.send_message(1, "a").await.is_err());
        assert_eq!(notifier.count(), 0);

        notifier.set_failing(false);
        notifier.send_message(1, "b").await.unwrap();
        assert_eq!(notifier.count(), 1);
    }
}
