//! Delayed provider - wraps another provider with artificial delay.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use watch_core::{ProviderError, SearchProvider, SearchRequest};

/// A provider that sleeps before delegating.
///
/// Useful for checking that work is sequential and for simulating slow
/// upstreams.
pub struct DelayedProvider<P> {
    inner: P,
    delay: Duration,
}

impl<P: SearchProvider> DelayedProvider<P> {
    pub fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn with_millis(inner: P, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<P: SearchProvider> SearchProvider for DelayedProvider<P> {
    async fn search(&self, request: &SearchRequest) -> Result<String, ProviderError> {
        sleep(self.delay).await;
        self.inner.search(request).await
    }

    fn name(&self) -> &str {
        "delayed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedProvider;
    use std::time::Instant;

    #[tokio::test]
    async fn test_delayed_provider() {
        let provider = DelayedProvider::with_millis(ScriptedProvider::always("[]"), 50);

        let start = Instant::now();
        let body = provider.search(&SearchRequest::new("q", 7)).await.unwrap();

        assert_eq!(body, "[]");
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(provider.name(), "delayed");
    }
}
