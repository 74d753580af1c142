//! Candidate filtering: low-signal hosts and lexical overlap.

use url::Url;

use crate::tokenize::{contains_term, keywords, normalized_padded};

/// Hosts whose content is rarely what a topic watcher wants, unless the
/// topic itself asks for that medium.
pub const LOW_SIGNAL_HOSTS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "facebook.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "pinterest.com",
    "vimeo.com",
];

/// Topic words that explicitly request video or social content.
pub const MEDIUM_REQUEST_TERMS: &[&str] = &[
    "video", "videos", "youtube", "tiktok", "facebook", "instagram", "twitter", "tweet",
    "tweets", "clip", "clips", "vimeo", "pinterest", "סרטון", "סרטונים", "וידאו", "יוטיוב",
];

/// Tokens longer than this earn partial credit on substring matches.
pub const PARTIAL_MATCH_MIN_LEN: usize = 4;

/// Whether the topic asks for video/social content.
pub fn requests_medium(topic: &str) -> bool {
    let padded = normalized_padded(topic);
    MEDIUM_REQUEST_TERMS
        .iter()
        .any(|term| contains_term(&padded, term))
}

/// Whether a URL points at a low-signal host. Unparseable URLs are not
/// considered low-signal here; structural validation happens earlier.
pub fn is_low_signal_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.trim_start_matches("www.").to_lowercase();

    LOW_SIGNAL_HOSTS
        .iter()
        .any(|pattern| host == *pattern || host.ends_with(&format!(".{}", pattern)))
}

/// Weighted overlap between topic keywords and candidate text.
///
/// Exact token match scores 1.0. Otherwise, when both tokens are longer than
/// [`PARTIAL_MATCH_MIN_LEN`] characters and one contains the other, the
/// keyword scores `partial_credit`. Each keyword contributes at most once.
pub fn overlap_score(topic_keywords: &[String], candidate_text: &str, partial_credit: f64) -> f64 {
    let candidate_tokens = keywords(candidate_text);

    topic_keywords
        .iter()
        .map(|kw| {
            if candidate_tokens.iter().any(|t| t == kw) {
                return 1.0;
            }
            if kw.chars().count() <= PARTIAL_MATCH_MIN_LEN {
                return 0.0;
            }
            let partial = candidate_tokens.iter().any(|t| {
                t.chars().count() > PARTIAL_MATCH_MIN_LEN
                    && (t.contains(kw.as_str()) || kw.contains(t.as_str()))
            });
            if partial {
                partial_credit
            } else {
                0.0
            }
        })
        .sum()
}

/// Number of topic keywords that appear verbatim among the candidate's tokens.
pub fn exact_hits(topic_keywords: &[String], candidate_text: &str) -> usize {
    let candidate_tokens = keywords(candidate_text);
    topic_keywords
        .iter()
        .filter(|kw| candidate_tokens.iter().any(|t| t == *kw))
        .count()
}

/// Minimum overlap a candidate needs: `max(min_overlap, ratio × keyword count)`.
pub fn required_overlap(keyword_count: usize, ratio: f64, min_overlap: f64) -> f64 {
    (ratio * keyword_count as f64).max(min_overlap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_low_signal_hosts() {
        assert!(is_low_signal_url("https://www.youtube.com/watch?v=abc"));
        assert!(is_low_signal_url("https://m.facebook.com/post/1"));
        assert!(is_low_signal_url("https://youtu.be/abc"));
        assert!(is_low_signal_url("https://x.com/someone/status/1"));
        assert!(!is_low_signal_url("https://box.com/file"));
        assert!(!is_low_signal_url("https://blog.rust-lang.org/"));
    }

    #[test]
    fn test_requests_medium() {
        assert!(requests_medium("cooking videos for pasta"));
        assert!(requests_medium("סרטון על בישול"));
        assert!(!requests_medium("pasta recipes"));
    }

    #[test]
    fn test_exact_overlap() {
        let score = overlap_score(&kws(&["quarterly", "report"]), "The quarterly report is out", 0.5);
        assert_eq!(score, 2.0);
    }

    #[test]
    fn test_partial_overlap_for_long_tokens() {
        // "releases" contains "release"
        let score = overlap_score(&kws(&["release"]), "New releases this week", 0.5);
        assert_eq!(score, 0.5);
    }

    #[test]
    fn test_short_tokens_get_no_partial_credit() {
        let score = overlap_score(&kws(&["gpu"]), "gpus are expensive", 0.5);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_keyword_contributes_once() {
        let score = overlap_score(&kws(&["report"]), "report report reports", 0.5);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_exact_hits_ignores_substring_matches() {
        let topic = kws(&["electric", "bicycles"]);
        assert_eq!(exact_hits(&topic, "Electrical bicycle guide"), 0);
        assert_eq!(exact_hits(&topic, "Electric bicycle guide"), 1);
    }

    #[test]
    fn test_required_overlap() {
        assert_eq!(required_overlap(1, 0.3, 1.0), 1.0);
        assert_eq!(required_overlap(3, 0.3, 1.0), 1.0);
        assert!((required_overlap(10, 0.3, 1.0) - 3.0).abs() < 1e-9);
    }
}
