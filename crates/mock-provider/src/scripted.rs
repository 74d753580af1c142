//! Scripted provider - replays queued responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use watch_core::{ProviderError, SearchProvider, SearchRequest};

enum Scripted {
    Body(String),
    Error(ProviderError),
}

#[derive(Default)]
struct Inner {
    queue: VecDeque<Scripted>,
    default_body: Option<String>,
    requests: Vec<SearchRequest>,
}

/// A provider that answers from a queue of scripted responses.
///
/// When the queue is empty it answers with the default body if one was
/// set, otherwise with [`ProviderError::EmptyResponse`]. Clones share state,
/// so a test can keep a handle after moving one into the code under test.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that always returns `body`.
    pub fn always(body: impl Into<String>) -> Self {
        let provider = Self::new();
        provider.set_default_body(body);
        provider
    }

    /// Queue a successful response.
    pub fn push_body(&self, body: impl Into<String>) {
        self.lock().queue.push_back(Scripted::Body(body.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ProviderError) {
        self.lock().queue.push_back(Scripted::Error(error));
    }

    /// Body returned once the queue is drained.
    pub fn set_default_body(&self, body: impl Into<String>) {
        self.lock().default_body = Some(body.into());
    }

    /// Number of `search` calls made so far.
    pub fn call_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// All requests received, in order.
    pub fn requests(&self) -> Vec<SearchRequest> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoned by a panicking test; the data is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    async fn search(&self, request: &SearchRequest) -> Result<String, ProviderError> {
        let mut inner = self.lock();
        inner.requests.push(request.clone());

        match inner.queue.pop_front() {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Error(e)) => Err(e),
            None => inner.default_body.clone().ok_or(ProviderError::EmptyResponse),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Build a provider-style JSON array from `(title, url, summary)` triples.
pub fn results_json(items: &[(&str, &str, Option<&str>)]) -> String {
    let values: Vec<serde_json::Value> = items
        .iter()
        .map(|(title, url, summary)| match summary {
            Some(summary) => json!({"title": title, "url": url, "summary": summary}),
            None => json!({"title": title, "url": url}),
        })
        .collect();
    serde_json::Value::Array(values).to_string()
}
