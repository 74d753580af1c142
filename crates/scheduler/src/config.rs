//! Scheduler configuration.

use std::env;
use std::time::Duration;

use crate::error::SchedulerError;

/// Default SQLite file.
pub const DEFAULT_SQLITE_PATH: &str = "./data/watchbot.db";

/// Default cadence of due-check passes (5 minutes).
pub const DEFAULT_TICK: Duration = Duration::from_secs(300);

/// Default pause between two topics within one pass.
pub const DEFAULT_TOPIC_DELAY: Duration = Duration::from_secs(2);

/// Default monthly search ceiling per user.
pub const DEFAULT_MONTHLY_LIMIT: i64 = 200;

/// Default delay before a new topic's first check.
pub const DEFAULT_FIRST_CHECK_DELAY: Duration = Duration::from_secs(60);

/// Default number of top results a regular check tries to admit.
pub const DEFAULT_MAX_NOTIFIED_RESULTS: usize = 3;

/// Default lifetime of a pending conversation step.
pub const DEFAULT_CONVERSATION_TTL: Duration = Duration::from_secs(900);

/// Configuration for the [`DueCheckScheduler`](crate::DueCheckScheduler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// sqlx connection URL.
    pub database_url: String,

    /// Time between two due-check passes.
    pub tick: Duration,

    /// Pause between topics in one pass, so the provider and the chat
    /// transport are not hit in bursts.
    pub topic_delay: Duration,

    /// Searches a user may spend per calendar month.
    pub monthly_limit: i64,

    /// Delay between registration and the one-shot first check.
    pub first_check_delay: Duration,

    /// How many of the top-ranked results a regular check tries to admit.
    pub max_notified_results: usize,

    /// Expiry of a stored conversation step.
    pub conversation_ttl: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            database_url: sqlite_url(DEFAULT_SQLITE_PATH),
            tick: DEFAULT_TICK,
            topic_delay: DEFAULT_TOPIC_DELAY,
            monthly_limit: DEFAULT_MONTHLY_LIMIT,
            first_check_delay: DEFAULT_FIRST_CHECK_DELAY,
            max_notified_results: DEFAULT_MAX_NOTIFIED_RESULTS,
            conversation_ttl: DEFAULT_CONVERSATION_TTL,
        }
    }
}

/// Turn a file path into a sqlx SQLite URL that creates the file if needed.
pub fn sqlite_url(path: &str) -> String {
    format!("sqlite:{}?mode=rwc", path)
}

fn env_secs(name: &str, default: Duration) -> Result<Duration, SchedulerError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| SchedulerError::Config(format!("{} must be a number of seconds", name))),
        Err(_) => Ok(default),
    }
}

impl SchedulerConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `WATCH_SQLITE_PATH` - SQLite file (default: ./data/watchbot.db)
    /// - `WATCH_TICK_SECS` - seconds between passes (default: 300)
    /// - `WATCH_TOPIC_DELAY_SECS` - seconds between topics (default: 2)
    /// - `WATCH_MONTHLY_LIMIT` - searches per user per month (default: 200)
    /// - `WATCH_FIRST_CHECK_DELAY_SECS` - delay of the first check (default: 60)
    /// - `WATCH_MAX_NOTIFIED_RESULTS` - results admitted per regular check (default: 3)
    /// - `WATCH_CONVERSATION_TTL_SECS` - conversation step expiry (default: 900)
    pub fn from_env() -> Result<Self, SchedulerError> {
        let database_url = env::var("WATCH_SQLITE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(|p| sqlite_url(p.trim()))
            .unwrap_or_else(|| sqlite_url(DEFAULT_SQLITE_PATH));

        let tick = env_secs("WATCH_TICK_SECS", DEFAULT_TICK)?;
        if tick.is_zero() {
            return Err(SchedulerError::Config(
                "WATCH_TICK_SECS must be greater than zero".to_string(),
            ));
        }

        let monthly_limit = match env::var("WATCH_MONTHLY_LIMIT") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|l| *l >= 0)
                .ok_or_else(|| {
                    SchedulerError::Config("WATCH_MONTHLY_LIMIT must be a non-negative number".to_string())
                })?,
            Err(_) => DEFAULT_MONTHLY_LIMIT,
        };

        let max_notified_results = match env::var("WATCH_MAX_NOTIFIED_RESULTS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    SchedulerError::Config("WATCH_MAX_NOTIFIED_RESULTS must be positive".to_string())
                })?,
            Err(_) => DEFAULT_MAX_NOTIFIED_RESULTS,
        };

        Ok(Self {
            database_url,
            tick,
            topic_delay: env_secs("WATCH_TOPIC_DELAY_SECS", DEFAULT_TOPIC_DELAY)?,
            monthly_limit,
            first_check_delay: env_secs("WATCH_FIRST_CHECK_DELAY_SECS", DEFAULT_FIRST_CHECK_DELAY)?,
            max_notified_results,
            conversation_ttl: env_secs("WATCH_CONVERSATION_TTL_SECS", DEFAULT_CONVERSATION_TTL)?,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for SchedulerConfig.
#[derive(Debug, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.config.tick = tick;
        self
    }

    pub fn topic_delay(mut self, delay: Duration) -> Self {
        self.config.topic_delay = delay;
        self
    }

    pub fn monthly_limit(mut self, limit: i64) -> Self {
        self.config.monthly_limit = limit.max(0);
        self
    }

    pub fn first_check_delay(mut self, delay: Duration) -> Self {
        self.config.first_check_delay = delay;
        self
    }

    pub fn max_notified_results(mut self, max: usize) -> Self {
        self.config.max_notified_results = max.max(1);
        self
    }

    pub fn conversation_ttl(mut self, ttl: Duration) -> Self {
        self.config.conversation_ttl = ttl;
        self
    }

    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}
