//! Chat-side conversation steps, stored per user with an expiry.

use chrono::NaiveDateTime;
use database::{conversation, topic, user, DatabaseError, WatchTopic};
use tracing::debug;
use watch_core::{
    CheckInterval, Clock, ConversationEffect, ConversationState, Notifier, SearchProvider,
};

use crate::error::SchedulerError;
use crate::scheduler::DueCheckScheduler;

/// What the chat layer should show after a conversation step.
#[derive(Debug)]
pub enum ConversationReply {
    /// The input did not belong to a pending step.
    ShowMenu,
    /// Ask for the check interval of the pending topic.
    AskForInterval { pending_topic: String },
    /// A new topic was registered; its first check is pending.
    TopicRegistered(WatchTopic),
    /// An existing topic's text was replaced.
    TopicUpdated { topic_id: i64 },
}

impl<P, N, C> DueCheckScheduler<P, N, C>
where
    P: SearchProvider + 'static,
    N: Notifier + 'static,
    C: Clock + 'static,
{
    fn conversation_expiry(&self, now: NaiveDateTime) -> Result<NaiveDateTime, SchedulerError> {
        chrono::Duration::from_std(self.config().conversation_ttl)
            .map(|ttl| now + ttl)
            .map_err(|e| SchedulerError::Config(format!("conversation ttl out of range: {}", e)))
    }

    async fn store_state(
        &self,
        user_id: i64,
        state: &ConversationState,
        now: NaiveDateTime,
    ) -> Result<(), SchedulerError> {
        let expires_at = self.conversation_expiry(now)?;
        conversation::set_state(self.database().pool(), user_id, state, expires_at).await?;
        Ok(())
    }

    /// The user's current conversation step.
    pub async fn conversation_state(&self, user_id: i64) -> Result<ConversationState, SchedulerError> {
        Ok(conversation::get_state(self.database().pool(), user_id, self.now()).await?)
    }

    /// Start asking for the text of a new topic.
    pub async fn begin_new_topic(
        &self,
        user_id: i64,
        username: Option<&str>,
    ) -> Result<(), SchedulerError> {
        let now = self.now();
        user::ensure_user(self.database().pool(), user_id, username, now).await?;
        self.store_state(user_id, &ConversationState::AwaitingTopicText, now)
            .await
    }

    /// Start replacing the text of one of the user's active topics.
    pub async fn begin_edit_topic(&self, user_id: i64, topic_id: i64) -> Result<(), SchedulerError> {
        let existing = topic::get_topic(self.database().pool(), topic_id).await?;
        if existing.user_id != user_id || !existing.is_active {
            return Err(DatabaseError::NotFound {
                entity: "WatchTopic",
                id: topic_id.to_string(),
            }
            .into());
        }

        self.store_state(
            user_id,
            &ConversationState::EditingTopicText { topic_id },
            self.now(),
        )
        .await
    }

    /// Feed free text typed by the user.
    pub async fn handle_text(
        &self,
        user_id: i64,
        username: Option<&str>,
        text: &str,
    ) -> Result<ConversationReply, SchedulerError> {
        let now = self.now();
        let state = conversation::get_state(self.database().pool(), user_id, now).await?;
        let (next, effect) = state.on_text(text);
        if !next.is_idle() {
            user::ensure_user(self.database().pool(), user_id, username, now).await?;
        }
        self.store_state(user_id, &next, now).await?;
        self.apply_effect(user_id, username, effect).await
    }

    /// Feed an interval choice.
    pub async fn handle_interval_choice(
        &self,
        user_id: i64,
        username: Option<&str>,
        interval: CheckInterval,
    ) -> Result<ConversationReply, SchedulerError> {
        let now = self.now();
        let state = conversation::get_state(self.database().pool(), user_id, now).await?;
        let (next, effect) = state.on_interval_chosen(interval);
        self.store_state(user_id, &next, now).await?;
        self.apply_effect(user_id, username, effect).await
    }

    async fn apply_effect(
        &self,
        user_id: i64,
        username: Option<&str>,
        effect: ConversationEffect,
    ) -> Result<ConversationReply, SchedulerError> {
        debug!(user_id, ?effect, "Conversation effect");
        match effect {
            ConversationEffect::ShowMenu => Ok(ConversationReply::ShowMenu),
            ConversationEffect::AskForInterval { pending_topic } => {
                Ok(ConversationReply::AskForInterval { pending_topic })
            }
            ConversationEffect::CreateTopic { query, interval } => {
                let registration = self.register_topic(user_id, username, &query, interval).await?;
                Ok(ConversationReply::TopicRegistered(registration.topic))
            }
            ConversationEffect::UpdateTopicText { topic_id, text } => {
                self.update_topic_text(user_id, topic_id, &text).await?;
                Ok(ConversationReply::TopicUpdated { topic_id })
            }
        }
    }
}
