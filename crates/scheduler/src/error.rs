//! Scheduler error types.

use database::DatabaseError;
use thiserror::Error;
use watch_core::NotifyError;

/// Errors raised while checking or registering topics.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Persistence failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The user has no searches left this period.
    #[error("user {user_id} reached the monthly limit of {limit} searches")]
    QuotaExceeded { user_id: i64, limit: i64 },

    /// A message could not be delivered.
    #[error("notification error: {0}")]
    Notify(#[from] NotifyError),
}
