//! HTTP search provider.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use watch_core::{ProviderError, SearchDepth, SearchProvider, SearchRequest};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, WebSearchOptions,
};
use crate::config::PerplexityConfig;

/// Instructions sent with every search.
pub const SEARCH_SYSTEM_PROMPT: &str = "You are an expert search assistant. Return ONLY a JSON \
     array of the top search results for the user's query. Each result must be a JSON object \
     with exactly these fields: \"title\", \"url\", \"summary\". The summary is a short 1-2 \
     sentence description of what the link contains. Every url must be a complete, working \
     link starting with https://. Return only the JSON array, with no additional text.";

/// Search provider backed by the Perplexity chat-completions API.
pub struct PerplexityProvider {
    client: Client,
    config: PerplexityConfig,
}

impl PerplexityProvider {
    /// Create a provider with the given configuration.
    pub fn new(config: PerplexityConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "Perplexity API key is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        info!(
            "PerplexityProvider initialized with model: {}, timeout: {}s",
            config.model, config.timeout_secs
        );

        Ok(Self { client, config })
    }

    /// Create a provider from environment variables.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(PerplexityConfig::from_env()?)
    }

    pub fn config(&self) -> &PerplexityConfig {
        &self.config
    }

    fn build_request(&self, request: &SearchRequest) -> ChatCompletionRequest {
        let user_prompt = format!(
            "Find {} results about: {}",
            request.max_results.max(1),
            request.query
        );

        let context_size = match request.depth {
            SearchDepth::Basic => "medium",
            SearchDepth::Advanced => "high",
        };

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(SEARCH_SYSTEM_PROMPT),
                ChatMessage::user(user_prompt),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            web_search_options: Some(WebSearchOptions {
                search_context_size: context_size.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SearchProvider for PerplexityProvider {
    async fn search(&self, request: &SearchRequest) -> Result<String, ProviderError> {
        let url = self.config.completions_url();
        let body = self.build_request(request);

        debug!("Sending search request: {:?}", body);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);

            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Search token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        extract_content(completion)
    }

    fn name(&self) -> &str {
        "perplexity"
    }
}

/// Pull the first choice's text out of a completion.
fn extract_content(completion: ChatCompletionResponse) -> Result<String, ProviderError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> PerplexityProvider {
        let config = PerplexityConfig::builder().api_key("test").build();
        PerplexityProvider::new(config).unwrap()
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = PerplexityProvider::new(PerplexityConfig::default());
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_build_request_maps_depth() {
        let provider = provider();

        let basic = provider.build_request(&SearchRequest::new("rust", 7));
        assert_eq!(basic.messages.len(), 2);
        assert_eq!(basic.messages[0].role, "system");
        assert!(basic.messages[1].content.contains("Find 7 results about: rust"));
        assert_eq!(
            basic.web_search_options.unwrap().search_context_size,
            "medium"
        );

        let advanced = provider
            .build_request(&SearchRequest::new("rust", 7).with_depth(SearchDepth::Advanced));
        assert_eq!(
            advanced.web_search_options.unwrap().search_context_size,
            "high"
        );
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "[{\"title\": \"a\"}]"}, "finish_reason": "stop"}]}"#;
        let completion: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_content(completion).unwrap(), r#"[{"title": "a"}]"#);

        let empty = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "  "}, "finish_reason": "stop"}]}"#;
        let completion: ChatCompletionResponse = serde_json::from_str(empty).unwrap();
        assert!(matches!(
            extract_content(completion),
            Err(ProviderError::EmptyResponse)
        ));

        let no_choices: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            extract_content(no_choices),
            Err(ProviderError::EmptyResponse)
        ));
    }

    #[test]
    fn test_name() {
        assert_eq!(provider().name(), "perplexity");
    }
}
