//! Usage Quota Tracker.
//!
//! A per-user, per-calendar-month counter with a hard ceiling. The counter
//! is clamped on write, so `remaining` never goes negative and a charge past
//! the ceiling is absorbed.

use chrono::NaiveDateTime;
use database::{usage, SqlitePool};
use tracing::{debug, info};
use watch_core::period_key;

use crate::error::SchedulerError;

/// Snapshot of a user's usage in the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageSummary {
    pub current_usage: i64,
    pub monthly_limit: i64,
    pub remaining: i64,
}

/// Reads and charges the monthly search quota.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    pool: SqlitePool,
    monthly_limit: i64,
}

impl QuotaTracker {
    pub fn new(pool: SqlitePool, monthly_limit: i64) -> Self {
        Self {
            pool,
            monthly_limit: monthly_limit.max(0),
        }
    }

    pub fn monthly_limit(&self) -> i64 {
        self.monthly_limit
    }

    /// Searches the user may still run in the period containing `now`.
    pub async fn remaining(&self, user_id: i64, now: NaiveDateTime) -> Result<i64, SchedulerError> {
        let used = usage::get_usage(&self.pool, user_id, &period_key(now)).await?;
        Ok((self.monthly_limit - used).max(0))
    }

    /// Charge `amount` searches and return the new remaining count.
    pub async fn charge(
        &self,
        user_id: i64,
        amount: i64,
        now: NaiveDateTime,
    ) -> Result<i64, SchedulerError> {
        let period = period_key(now);
        let before = usage::get_usage(&self.pool, user_id, &period).await?;
        let stored =
            usage::charge(&self.pool, user_id, &period, amount, self.monthly_limit, now).await?;

        let prev = (self.monthly_limit - before).max(0);
        let remaining = (self.monthly_limit - stored).max(0);
        info!(user_id, %period, "Charged {} search(es): {} -> {} remaining", amount, prev, remaining);
        Ok(remaining)
    }

    /// Current usage, limit and remaining searches.
    pub async fn usage_summary(
        &self,
        user_id: i64,
        now: NaiveDateTime,
    ) -> Result<UsageSummary, SchedulerError> {
        let current_usage = usage::get_usage(&self.pool, user_id, &period_key(now)).await?;
        Ok(UsageSummary {
            current_usage,
            monthly_limit: self.monthly_limit,
            remaining: (self.monthly_limit - current_usage).max(0),
        })
    }

    /// Number of users who used up the current period's quota.
    pub async fn users_at_limit(&self, now: NaiveDateTime) -> Result<i64, SchedulerError> {
        Ok(usage::count_users_at_limit(&self.pool, &period_key(now), self.monthly_limit).await?)
    }

    /// Claim the once-per-period limit notification. Only the first caller in
    /// a period gets `true`.
    pub async fn claim_limit_notification(
        &self,
        user_id: i64,
        now: NaiveDateTime,
    ) -> Result<bool, SchedulerError> {
        let claimed =
            usage::mark_limit_notified(&self.pool, user_id, &period_key(now), now).await?;
        if !claimed {
            debug!(user_id, "Limit notification already sent this period");
        }
        Ok(claimed)
    }
}
