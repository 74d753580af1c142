//! Test doubles for the topic watch bot.
//!
//! - `ScriptedProvider` - Replays queued provider bodies and records requests
//! - `FailingProvider` - Always fails with a network error
//! - `DelayedProvider` - Wraps another provider with artificial delay
//! - `RecordingNotifier` - Captures outbound messages, can be told to fail
//! - `FixedClock` - Manually advanced wall clock
//!
//! # Example
//!
//! ```rust
//! use mock_provider::{results_json, ScriptedProvider};
//! use watch_core::{SearchProvider, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = ScriptedProvider::new();
//!     provider.push_body(results_json(&[("Rust 1.80", "https://blog.rust-lang.org/1.80", None)]));
//!
//!     let body = provider.search(&SearchRequest::new("rust", 7)).await.unwrap();
//!     assert!(body.contains("Rust 1.80"));
//!     assert_eq!(provider.call_count(), 1);
//! }
//! ```

mod clock;
mod delayed;
mod failing;
mod notifier;
mod scripted;

pub use clock::FixedClock;
pub use delayed::DelayedProvider;
pub use failing::FailingProvider;
pub use notifier::RecordingNotifier;
pub use scripted::{results_json, ScriptedProvider};
