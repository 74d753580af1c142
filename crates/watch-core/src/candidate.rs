//! Candidate results and the per-check topic query value.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CandidateError;

/// The query carried from the scheduler into the search orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuery {
    /// Watch topic ID.
    pub topic_id: i64,
    /// Owning user (chat) ID.
    pub user_id: i64,
    /// Free-text topic as entered by the user.
    pub query: String,
}

impl TopicQuery {
    /// Create a new topic query.
    pub fn new(topic_id: i64, user_id: i64, query: impl Into<String>) -> Self {
        Self {
            topic_id,
            user_id,
            query: query.into(),
        }
    }
}

/// A structurally valid search result.
///
/// Construction goes through [`Candidate::new`], so every instance has a
/// non-empty title and an absolute http(s) URL. The summary is optional
/// because providers routinely omit it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub summary: Option<String>,
}

impl Candidate {
    /// Validate raw provider fields and build a candidate.
    pub fn new(
        title: Option<&str>,
        url: Option<&str>,
        summary: Option<&str>,
    ) -> Result<Self, CandidateError> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CandidateError::MissingTitle)?;

        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(CandidateError::MissingUrl)?;
        validate_url(url)?;

        let summary = summary
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            title: title.to_string(),
            url: url.to_string(),
            summary,
        })
    }

    /// Summary text, or an empty string when the provider gave none.
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}

/// Check that a URL is absolute http(s) with a host and no embedded
/// whitespace or control characters.
pub fn validate_url(raw: &str) -> Result<Url, CandidateError> {
    let invalid = || CandidateError::InvalidUrl(raw.to_string());

    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid());
    }

    if !(raw.starts_with("http://") || raw.starts_with("https://")) {
        return Err(invalid());
    }

    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }

    Ok(parsed)
}
