//! Error types shared across the watch bot crates.

use thiserror::Error;

/// Errors returned by a retrieval provider.
///
/// None of these are fatal for a due-check: the orchestrator turns every
/// variant into "no results" and the topic is retried on its next cycle.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered with a non-success status.
    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered but carried no usable content.
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// Provider is misconfigured (missing key, bad URL).
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors returned by an outbound notification transport.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The message could not be delivered.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Transport is misconfigured.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Reasons a provider item is rejected before relevance filtering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    /// Title missing or blank.
    #[error("candidate has no title")]
    MissingTitle,

    /// URL missing or blank.
    #[error("candidate has no url")]
    MissingUrl,

    /// URL is not an absolute http(s) URL or carries whitespace/control characters.
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
}
