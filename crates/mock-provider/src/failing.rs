//! Failing provider - every call errors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use watch_core::{ProviderError, SearchProvider, SearchRequest};

/// A provider whose every call fails with a network error.
#[derive(Clone, Default)]
pub struct FailingProvider {
    calls: Arc<AtomicUsize>,
}

impl FailingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for FailingProvider {
    async fn search(&self, _request: &SearchRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Network("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}
