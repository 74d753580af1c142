//! Perplexity-backed [`SearchProvider`](watch_core::SearchProvider).
//!
//! Sends the topic query to an OpenAI-compatible chat-completions endpoint
//! (Perplexity `sonar-pro` by default) with a system prompt asking for a
//! JSON array of `{title, url, summary}` objects, and returns the raw
//! message content. Parsing and validation happen in the orchestrator.
//!
//! # Example
//!
//! ```rust,ignore
//! use perplexity_search::PerplexityProvider;
//! use watch_core::{SearchProvider, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = PerplexityProvider::from_env()?;
//!     let body = provider.search(&SearchRequest::new("rust 2024 edition", 7)).await?;
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```

pub mod api_types;
mod config;
mod provider;

pub use config::{PerplexityConfig, PerplexityConfigBuilder};
pub use provider::{PerplexityProvider, SEARCH_SYSTEM_PROMPT};
