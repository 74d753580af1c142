//! Core traits and domain types for the topic watch bot.
//!
//! This crate provides the shared vocabulary for every other crate in the
//! workspace. It defines:
//!
//! - [`SearchProvider`] - The seam to the external information-retrieval service
//! - [`Notifier`] - The seam to the outbound chat transport
//! - [`Candidate`] / [`TopicQuery`] - Values passed between scheduler, orchestrator and store
//! - [`CheckInterval`], [`is_due`] and [`AdvancePlan`] - Due-check bookkeeping rules
//! - [`ConversationState`] - Per-user conversation state machine
//! - [`Clock`] - Wall-clock source, swappable in tests
//!
//! # Example
//!
//! ```rust
//! use watch_core::{async_trait, ProviderError, SearchProvider, SearchRequest};
//!
//! struct StaticProvider;
//!
//! #[async_trait]
//! impl SearchProvider for StaticProvider {
//!     async fn search(&self, _request: &SearchRequest) -> Result<String, ProviderError> {
//!         Ok(r#"[{"title": "Release notes", "url": "https://example.com/notes"}]"#.to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "static"
//!     }
//! }
//! ```

mod candidate;
mod clock;
mod conversation;
mod error;
mod notifier;
mod provider;
mod schedule;

pub use candidate::{validate_url, Candidate, TopicQuery};
pub use clock::{period_key, Clock, SystemClock};
pub use conversation::{ConversationEffect, ConversationState};
pub use error::{CandidateError, NotifyError, ProviderError};
pub use notifier::Notifier;
pub use provider::{SearchDepth, SearchProvider, SearchRequest};
pub use schedule::{
    is_due, AdvancePlan, CheckInterval, MICRO_INTERVAL_CHECKS, MICRO_INTERVAL_MINUTES,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
