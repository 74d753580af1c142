//! Due-check scheduling for the topic watch bot.
//!
//! The [`DueCheckScheduler`] ties the pieces together on a fixed tick:
//!
//! ```text
//! list due topics
//!     │  (sequential, short delay between topics)
//!     ▼
//! quota gate ──refused──▶ limit message (once per month), no advance
//!     │
//!     ▼
//! search orchestrator ──▶ charge one search per provider call
//!     │
//!     ▼
//! dedup admit (top results) ──▶ one composed message ──▶ mark sent
//!     │
//!     ▼
//! advance (always, also after failures)
//! ```
//!
//! New topics go through [`DueCheckScheduler::register_topic`], which also
//! schedules a one-shot first check shortly after creation.

pub mod config;
mod conversation;
mod error;
mod quota;
mod scheduler;

pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use conversation::ConversationReply;
pub use error::SchedulerError;
pub use quota::{QuotaTracker, UsageSummary};
pub use scheduler::{
    CheckMode, CheckOutcome, CheckReport, DueCheckScheduler, PassReport, Registration,
};
