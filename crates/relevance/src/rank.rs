//! Ranking of candidates that survived filtering.

use watch_core::Candidate;

use crate::tokenize::tokenize;

/// Score for a keyword found in the title.
pub const TITLE_HIT: f64 = 3.0;
/// Score for a keyword found only in the summary.
pub const SUMMARY_HIT: f64 = 1.5;
/// Bonus for an important (long) keyword present anywhere.
pub const IMPORTANT_HIT: f64 = 2.0;
/// Keywords longer than this are "important".
pub const IMPORTANT_MIN_LEN: usize = 4;

/// A candidate with its relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: f64,
}

/// Score one candidate against the topic keywords.
pub fn score(topic_keywords: &[String], candidate: &Candidate) -> f64 {
    let title_tokens = tokenize(&candidate.title);
    let summary = candidate.summary_text();
    let summary_tokens = tokenize(summary);

    let mut total = 0.0;
    for kw in topic_keywords {
        let in_title = title_tokens.iter().any(|t| t == kw);
        let in_summary = summary_tokens.iter().any(|t| t == kw);

        if in_title {
            total += TITLE_HIT;
        } else if in_summary {
            total += SUMMARY_HIT;
        }

        if (in_title || in_summary) && kw.chars().count() > IMPORTANT_MIN_LEN {
            total += IMPORTANT_HIT;
        }
    }

    let summary_len = summary.chars().count();
    if summary_len > 100 {
        total += 1.0;
    } else if summary_len > 50 {
        total += 0.5;
    }

    total
}

/// Score and sort descending. Ties keep provider order.
pub fn rank(topic_keywords: &[String], candidates: Vec<Candidate>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| ScoredCandidate {
            score: score(topic_keywords, &candidate),
            candidate,
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
