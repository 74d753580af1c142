//! Provider response parsing.
//!
//! Accepted shapes, tried in order:
//!
//! 1. A JSON array of result objects, optionally wrapped in a fenced code
//!    block.
//! 2. A JSON object with a `results` array.
//! 3. Free text containing markdown links `[title](https://...)`.
//!
//! Items that fail candidate validation are dropped one by one; they never
//! fail the whole response.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use watch_core::Candidate;

const MARKDOWN_LINK_PATTERN: &str = r"\[([^\]]*)\]\((https?://[^\s\)]+)\)";

static MARKDOWN_LINK: OnceLock<Option<Regex>> = OnceLock::new();

fn markdown_link() -> Option<&'static Regex> {
    MARKDOWN_LINK
        .get_or_init(|| Regex::new(MARKDOWN_LINK_PATTERN).ok())
        .as_ref()
}

/// Which branch of the parser produced the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    Json,
    Markdown,
}

/// Candidates extracted from one provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    pub candidates: Vec<Candidate>,
    pub source: ParseSource,
    /// Items that were present but structurally invalid.
    pub dropped: usize,
}

/// Parse a raw provider body into validated candidates.
pub fn parse_response(body: &str) -> ParsedResponse {
    match json_items(body) {
        Some(items) => {
            let total = items.len();
            let candidates: Vec<Candidate> = items.iter().filter_map(candidate_from_json).collect();
            let dropped = total - candidates.len();
            if dropped > 0 {
                debug!(dropped, "Dropped malformed JSON result items");
            }
            ParsedResponse {
                candidates,
                source: ParseSource::Json,
                dropped,
            }
        }
        None => {
            warn!("Provider response is not a JSON result list, using markdown fallback");
            parse_markdown_links(body)
        }
    }
}

/// Extract `[title](url)` pairs from free text. Markdown candidates carry
/// no summary.
pub fn parse_markdown_links(body: &str) -> ParsedResponse {
    let Some(re) = markdown_link() else {
        return ParsedResponse {
            candidates: Vec::new(),
            source: ParseSource::Markdown,
            dropped: 0,
        };
    };

    let mut candidates = Vec::new();
    let mut dropped = 0;
    for caps in re.captures_iter(body) {
        let title = caps.get(1).map(|m| m.as_str());
        let url = caps.get(2).map(|m| m.as_str());
        match Candidate::new(title, url, None) {
            Ok(candidate) => candidates.push(candidate),
            Err(_) => dropped += 1,
        }
    }

    ParsedResponse {
        candidates,
        source: ParseSource::Markdown,
        dropped,
    }
}

/// The list of result items, if the body is one of the JSON shapes.
fn json_items(body: &str) -> Option<Vec<Value>> {
    let body = body.trim();
    let value = serde_json::from_str::<Value>(body)
        .ok()
        .or_else(|| serde_json::from_str::<Value>(fenced_block(body)?).ok())?;
    match value {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Contents of the first ```` ``` ```` / ```` ```json ```` block, wherever it
/// sits in the text.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let rest = &text[start + 3..];
    let rest = rest.find('\n').map_or("", |i| &rest[i + 1..]);
    Some(rest.find("```").map_or(rest, |end| &rest[..end]).trim())
}

fn candidate_from_json(item: &Value) -> Option<Candidate> {
    let obj = item.as_object()?;
    let field = |name: &str| obj.get(name).and_then(Value::as_str);

    let url = field("url").or_else(|| field("link"));
    Candidate::new(field("title"), url, field("summary")).ok()
}
