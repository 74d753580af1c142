//! Search orchestration and notification composition.
//!
//! # Architecture
//!
//! ```text
//! TopicQuery (from the scheduler)
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SEARCH ORCHESTRATOR                       │
//! │                                                             │
//! │  1. Classify intent, expand query with modifiers            │
//! │         ↓                                                   │
//! │  2. Provider call → parse (JSON, else markdown links)       │
//! │         ↓                                                   │
//! │  3. Relevance filter + rank                                 │
//! │         ↓                                                   │
//! │  4. Fewer than 3 relevant? One refine call with a date      │
//! │     qualifier, merged after the primary results             │
//! │         ↓                                                   │
//! │  5. Cap at 7                                                │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! SearchOutcome (ranked results + provider call count)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use orchestrator::SearchOrchestrator;
//! use perplexity_search::PerplexityProvider;
//! use watch_core::TopicQuery;
//!
//! let orchestrator = SearchOrchestrator::new(PerplexityProvider::from_env()?);
//! let outcome = orchestrator
//!     .search(&TopicQuery::new(1, 1001, "rust releases"), now, 2)
//!     .await;
//! println!("{} results in {} calls", outcome.results.len(), outcome.provider_calls);
//! ```

pub mod compose;
mod notifier;
pub mod parse;
mod search;

pub use notifier::{LoggingNotifier, NoOpNotifier};
pub use parse::{parse_response, ParseSource, ParsedResponse};
pub use search::{
    merge_results, refine_query, OrchestratorConfig, SearchOrchestrator, SearchOutcome,
    MAX_PROVIDER_CALLS, MAX_RESULTS, MIN_RELEVANT_RESULTS,
};
