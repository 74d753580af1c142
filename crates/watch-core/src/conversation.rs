//! Per-user conversation state machine.
//!
//! Stored alongside the user record with an expiry, so an abandoned
//! "waiting for topic text" prompt does not linger forever.

use serde::{Deserialize, Serialize};

use crate::schedule::CheckInterval;

/// Where a user is in a multi-step chat interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    /// The bot asked for the text of a new topic.
    AwaitingTopicText,
    /// Topic text received; waiting for the user to pick an interval.
    AwaitingInterval { pending_topic: String },
    /// The user is replacing the text of an existing topic.
    EditingTopicText { topic_id: i64 },
}

/// What the chat layer should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEffect {
    /// Show the main menu; the input did not belong to any pending step.
    ShowMenu,
    /// Ask the user to choose a check interval for the pending topic.
    AskForInterval { pending_topic: String },
    /// Create a new watch topic.
    CreateTopic { query: String, interval: CheckInterval },
    /// Replace the text of an existing topic.
    UpdateTopicText { topic_id: i64, text: String },
}

impl ConversationState {
    /// Feed free text typed by the user.
    pub fn on_text(self, text: &str) -> (Self, ConversationEffect) {
        let text = text.trim();
        match self {
            Self::AwaitingTopicText if !text.is_empty() => {
                let pending_topic = text.to_string();
                (
                    Self::AwaitingInterval {
                        pending_topic: pending_topic.clone(),
                    },
                    ConversationEffect::AskForInterval { pending_topic },
                )
            }
            Self::EditingTopicText { topic_id } if !text.is_empty() => (
                Self::Idle,
                ConversationEffect::UpdateTopicText {
                    topic_id,
                    text: text.to_string(),
                },
            ),
            other => (other, ConversationEffect::ShowMenu),
        }
    }

    /// Feed an interval choice (menu button).
    pub fn on_interval_chosen(self, interval: CheckInterval) -> (Self, ConversationEffect) {
        match self {
            Self::AwaitingInterval { pending_topic } => (
                Self::Idle,
                ConversationEffect::CreateTopic {
                    query: pending_topic,
                    interval,
                },
            ),
            other => (other, ConversationEffect::ShowMenu),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
