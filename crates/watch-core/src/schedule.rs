//! Due-check rules: when a topic is due and how it advances after a check.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Length of the distinguished micro-interval, in minutes.
pub const MICRO_INTERVAL_MINUTES: i64 = 5;

/// Number of checks a micro-interval topic gets before it stops.
pub const MICRO_INTERVAL_CHECKS: i64 = 5;

/// How often a topic is re-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckInterval {
    /// Every five minutes, for a bounded number of checks.
    Micro,
    /// Every N hours, indefinitely.
    Hours(u32),
}

impl CheckInterval {
    /// Build an hourly interval. Zero hours is not a valid interval.
    pub fn from_hours(hours: u32) -> Option<Self> {
        (hours > 0).then_some(Self::Hours(hours))
    }

    /// Decode the stored minute count.
    pub fn from_minutes(minutes: i64) -> Self {
        if minutes == MICRO_INTERVAL_MINUTES {
            Self::Micro
        } else {
            let hours = (minutes / 60).clamp(1, u32::MAX as i64);
            Self::Hours(hours as u32)
        }
    }

    /// Encode as a minute count for storage.
    pub fn as_minutes(&self) -> i64 {
        match self {
            Self::Micro => MICRO_INTERVAL_MINUTES,
            Self::Hours(h) => i64::from(*h) * 60,
        }
    }

    /// Minimum elapsed time between two checks.
    pub fn period(&self) -> Duration {
        Duration::minutes(self.as_minutes())
    }

    /// Initial `checks_remaining` for a freshly created topic.
    pub fn initial_checks(&self) -> Option<i64> {
        match self {
            Self::Micro => Some(MICRO_INTERVAL_CHECKS),
            Self::Hours(_) => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::Micro => format!("every 5 minutes ({} checks)", MICRO_INTERVAL_CHECKS),
            Self::Hours(168) => "once a week".to_string(),
            Self::Hours(1) => "every hour".to_string(),
            Self::Hours(h) => format!("every {} hours", h),
        }
    }
}

/// Decide whether a topic needs re-checking at `now`.
pub fn is_due(
    interval: CheckInterval,
    last_checked: Option<NaiveDateTime>,
    checks_remaining: Option<i64>,
    now: NaiveDateTime,
) -> bool {
    if matches!(checks_remaining, Some(n) if n <= 0) {
        return false;
    }

    match last_checked {
        None => true,
        Some(last) => now - last >= interval.period(),
    }
}

/// The bookkeeping applied to a topic after a due-check, computed from the
/// `checks_remaining` value it had before the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvancePlan {
    /// New `checks_remaining` value.
    pub checks_remaining: Option<i64>,
    /// Whether the topic must be deactivated.
    pub deactivate: bool,
    /// Whether this check consumed the last remaining check. The caller
    /// tells the user that monitoring has ended.
    pub final_check: bool,
}

impl AdvancePlan {
    pub fn for_remaining(remaining: Option<i64>) -> Self {
        match remaining {
            None => Self {
                checks_remaining: None,
                deactivate: false,
                final_check: false,
            },
            Some(n) if n > 1 => Self {
                checks_remaining: Some(n - 1),
                deactivate: false,
                final_check: false,
            },
            Some(1) => Self {
                checks_remaining: Some(0),
                deactivate: true,
                final_check: true,
            },
            Some(n) => Self {
                checks_remaining: Some(n),
                deactivate: true,
                final_check: false,
            },
        }
    }
}
