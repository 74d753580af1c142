//! Database models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use watch_core::{is_due, CheckInterval, TopicQuery};

/// A chat user, identified by their platform id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Platform user id (also the chat id for direct messages)
    pub id: i64,
    /// Username, if the platform exposed one
    pub username: Option<String>,
    /// False while the user has paused all monitoring
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// A topic the user asked us to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WatchTopic {
    pub id: i64,
    pub user_id: i64,
    /// Free-text query as the user typed it.
    pub query: String,
    /// Check interval in minutes. See [`CheckInterval::from_minutes`].
    pub interval_minutes: i64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub last_checked: Option<NaiveDateTime>,
    /// `None` = unlimited, `Some(n)` = stop after n more checks.
    pub checks_remaining: Option<i64>,
}

impl WatchTopic {
    pub fn interval(&self) -> CheckInterval {
        CheckInterval::from_minutes(self.interval_minutes)
    }

    /// Whether the topic should be checked at `now`.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.is_active && is_due(self.interval(), self.last_checked, self.checks_remaining, now)
    }

    /// The value handed to the search orchestrator.
    pub fn to_query(&self) -> TopicQuery {
        TopicQuery::new(self.id, self.user_id, self.query.clone())
    }
}

/// A search result that was admitted for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FoundResult {
    pub id: i64,
    pub topic_id: i64,
    pub title: String,
    pub url: String,
    pub summary: Option<String>,
    /// Hex SHA-256 over title, URL and summary.
    pub content_hash: String,
    pub found_at: NaiveDateTime,
    pub is_sent: bool,
}

/// Per-user, per-period search usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UsageStat {
    pub user_id: i64,
    /// Calendar period key, e.g. "2025-05".
    pub period: String,
    pub usage_count: i64,
    /// Whether the user was already told they hit the limit this period.
    pub limit_notified: bool,
    pub updated_at: NaiveDateTime,
}
