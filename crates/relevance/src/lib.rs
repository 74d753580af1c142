//! Relevance engine for topic watch results.
//!
//! Two stages:
//!
//! 1. **Intent classification** - [`QueryIntent::classify`] picks a search
//!    strategy from the topic's wording. The intent supplies query-expansion
//!    modifiers and an exclusion rule.
//! 2. **Filtering and ranking** - candidates on low-signal hosts, candidates
//!    hit by the intent's exclusion rule, and candidates with too little
//!    lexical overlap with the topic are dropped. Partial matches add to the
//!    overlap but at least one keyword must match exactly. Survivors are
//!    scored and stably sorted.
//!
//! The engine is pure: no I/O, no clock, deterministic for a given input.
//!
//! # Example
//!
//! ```rust
//! use relevance::RelevanceEngine;
//! use watch_core::Candidate;
//!
//! let engine = RelevanceEngine::new();
//! let profile = engine.analyze("quarterly report release");
//!
//! let candidates = vec![
//!     Candidate::new(Some("Q3 quarterly report published"), Some("https://ir.example.com/q3"), None).unwrap(),
//!     Candidate::new(Some("Cat pictures"), Some("https://cats.example.com"), None).unwrap(),
//! ];
//!
//! let ranked = engine.evaluate(&profile, candidates);
//! assert_eq!(ranked.len(), 1);
//! ```

mod filter;
mod intent;
mod rank;
mod tokenize;

pub use filter::{
    exact_hits, is_low_signal_url, overlap_score, required_overlap, requests_medium,
    LOW_SIGNAL_HOSTS, MEDIUM_REQUEST_TERMS,
};
pub use intent::{ExclusionRule, QueryIntent, INTENT_PRIORITY};
pub use rank::{rank, score, ScoredCandidate};
pub use tokenize::{is_stop_word, keywords, tokenize};

use tracing::debug;
use watch_core::Candidate;

/// Tuning knobs for the overlap test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceConfig {
    /// Fraction of topic keywords that must overlap.
    pub overlap_ratio: f64,
    /// Floor for the required overlap.
    pub min_overlap: f64,
    /// Credit for a substring match between long tokens.
    pub partial_credit: f64,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            overlap_ratio: 0.3,
            min_overlap: 1.0,
            partial_credit: 0.5,
        }
    }
}

/// What the engine learned from a topic's text.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicProfile {
    pub intent: QueryIntent,
    pub keywords: Vec<String>,
    /// The topic itself asks for video/social content.
    pub requests_medium: bool,
}

/// Why a candidate was kept or dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Keep,
    LowSignalHost,
    ExcludedByIntent(QueryIntent),
    InsufficientOverlap { score: f64, required: f64 },
    /// Overlap came from partial matches only.
    NoExactKeyword,
}

impl Verdict {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }
}

/// Filters and ranks candidates against a topic.
#[derive(Debug, Clone, Default)]
pub struct RelevanceEngine {
    config: RelevanceConfig,
}

impl RelevanceEngine {
    /// Create an engine with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom tuning.
    pub fn with_config(config: RelevanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelevanceConfig {
        &self.config
    }

    /// Classify a topic and extract its keywords.
    pub fn analyze(&self, topic: &str) -> TopicProfile {
        TopicProfile {
            intent: QueryIntent::classify(topic),
            keywords: keywords(topic),
            requests_medium: requests_medium(topic),
        }
    }

    /// Decide whether a single candidate is relevant.
    pub fn judge(&self, profile: &TopicProfile, candidate: &Candidate) -> Verdict {
        if !profile.requests_medium && is_low_signal_url(&candidate.url) {
            return Verdict::LowSignalHost;
        }

        let text = format!("{} {}", candidate.title, candidate.summary_text());

        if let Some(rule) = profile.intent.exclusion() {
            if rule.rejects(&text) {
                return Verdict::ExcludedByIntent(profile.intent);
            }
        }

        // A topic made only of stop-words gives the overlap test nothing to
        // measure, so it admits everything.
        if profile.keywords.is_empty() {
            return Verdict::Keep;
        }

        let score = overlap_score(&profile.keywords, &text, self.config.partial_credit);
        let required = required_overlap(
            profile.keywords.len(),
            self.config.overlap_ratio,
            self.config.min_overlap,
        );
        if score < required {
            return Verdict::InsufficientOverlap { score, required };
        }
        if exact_hits(&profile.keywords, &text) == 0 {
            return Verdict::NoExactKeyword;
        }

        Verdict::Keep
    }

    /// Drop irrelevant candidates, preserving provider order.
    pub fn filter(&self, profile: &TopicProfile, candidates: Vec<Candidate>) -> Vec<Candidate> {
        candidates
            .into_iter()
            .filter(|candidate| {
                let verdict = self.judge(profile, candidate);
                if !verdict.is_keep() {
                    debug!(url = %candidate.url, ?verdict, "Dropping candidate");
                }
                verdict.is_keep()
            })
            .collect()
    }

    /// Filter, then rank the survivors.
    pub fn evaluate(&self, profile: &TopicProfile, candidates: Vec<Candidate>) -> Vec<ScoredCandidate> {
        let kept = self.filter(profile, candidates);
        rank(&profile.keywords, kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, url: &str, summary: Option<&str>) -> Candidate {
        Candidate::new(Some(title), Some(url), summary).unwrap()
    }

    #[test]
    fn test_zero_shared_tokens_is_filtered() {
        let engine = RelevanceEngine::new();
        let profile = engine.analyze("electric bicycle regulations");
        let c = candidate(
            "Best pasta recipes",
            "https://food.example.com/pasta",
            Some("Ten dinners for the week"),
        );

        assert!(matches!(
            engine.judge(&profile, &c),
            Verdict::InsufficientOverlap { .. }
        ));
    }

    #[test]
    fn test_substring_only_matches_are_filtered() {
        let engine = RelevanceEngine::new();
        let profile = engine.analyze("electric bicycles");
        let c = candidate(
            "Electrical bicycle guide",
            "https://shop.example.com/guide",
            None,
        );

        assert_eq!(engine.judge(&profile, &c), Verdict::NoExactKeyword);

        let exact = candidate(
            "Electric bicycle guide",
            "https://shop.example.com/guide",
            None,
        );
        assert_eq!(engine.judge(&profile, &exact), Verdict::Keep);
    }

    #[test]
    fn test_low_signal_host_dropped_unless_requested() {
        let engine = RelevanceEngine::new();
        let c = candidate(
            "Electric bicycle regulations explained",
            "https://www.youtube.com/watch?v=1",
            None,
        );

        let plain = engine.analyze("electric bicycle regulations");
        assert_eq!(engine.judge(&plain, &c), Verdict::LowSignalHost);

        let wants_video = engine.analyze("electric bicycle regulations video");
        assert_eq!(engine.judge(&wants_video, &c), Verdict::Keep);
    }

    #[test]
    fn test_software_update_rejects_tutorial_even_if_overlapping() {
        let engine = RelevanceEngine::new();
        let profile = engine.analyze("android update");
        assert_eq!(profile.intent, QueryIntent::SoftwareUpdate);

        let c = candidate(
            "Android update tutorial video",
            "https://blog.example.com/android",
            None,
        );
        assert_eq!(
            engine.judge(&profile, &c),
            Verdict::ExcludedByIntent(QueryIntent::SoftwareUpdate)
        );
    }

    #[test]
    fn test_overlap_threshold_scales_with_keyword_count() {
        let engine = RelevanceEngine::new();
        // 7 keywords -> required 2.1
        let profile =
            engine.analyze("solar panel battery storage inverter subsidy program");
        assert_eq!(profile.keywords.len(), 7);

        let one_hit = candidate("Solar news", "https://a.example/1", None);
        assert!(!engine.judge(&profile, &one_hit).is_keep());

        let three_hits = candidate(
            "Solar battery subsidy",
            "https://a.example/2",
            None,
        );
        assert!(engine.judge(&profile, &three_hits).is_keep());
    }

    #[test]
    fn test_stop_word_only_topic_keeps_everything() {
        let engine = RelevanceEngine::new();
        let profile = engine.analyze("what is it");
        assert!(profile.keywords.is_empty());

        let c = candidate("Anything", "https://a.example", None);
        assert!(engine.judge(&profile, &c).is_keep());
    }

    #[test]
    fn test_evaluate_ranks_title_hits_first() {
        let engine = RelevanceEngine::new();
        let profile = engine.analyze("lunar eclipse");

        let summary_only = candidate(
            "Sky events this month",
            "https://a.example/1",
            Some("A lunar eclipse is coming"),
        );
        let title_hit = candidate(
            "Lunar eclipse tonight",
            "https://a.example/2",
            Some("A lunar eclipse is coming"),
        );

        let ranked = engine.evaluate(&profile, vec![summary_only, title_hit.clone()]);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].candidate, title_hit);
    }
}
