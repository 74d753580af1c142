//! Retrieval provider seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// How hard the provider should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    #[default]
    Basic,
    Advanced,
}

/// A request to the retrieval provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free-text query, already expanded with intent modifiers.
    pub query: String,
    /// Desired number of results.
    pub max_results: usize,
    /// Optional depth hint.
    pub depth: SearchDepth,
}

impl SearchRequest {
    /// Create a basic-depth request.
    pub fn new(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            depth: SearchDepth::Basic,
        }
    }

    /// Set the depth hint.
    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }
}

/// Trait for the external information-retrieval service.
///
/// Implementations return the raw answer body. Candidates are parsed at the
/// orchestrator boundary so that malformed bodies can still be salvaged by
/// the markdown fallback.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a search and return the raw response content.
    async fn search(&self, request: &SearchRequest) -> Result<String, ProviderError>;

    /// Provider name used in logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl<P: SearchProvider + ?Sized> SearchProvider for std::sync::Arc<P> {
    async fn search(&self, request: &SearchRequest) -> Result<String, ProviderError> {
        (**self).search(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
