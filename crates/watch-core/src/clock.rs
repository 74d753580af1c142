//! Wall-clock source.
//!
//! All timestamps are naive local wall-clock values; no timezone
//! normalization is performed anywhere in the system.

use chrono::{Local, NaiveDateTime};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Usage period key (calendar month) for a timestamp, e.g. `2025-05`.
pub fn period_key(now: NaiveDateTime) -> String {
    now.format("%Y-%m").to_string()
}
