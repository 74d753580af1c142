//! Notification text.
//!
//! One message per topic per due-check, never one per result. Messages are
//! plain text; the transport disables link previews.

use watch_core::{Candidate, CheckInterval};

/// Message listing newly admitted results. `None` when there is nothing to
/// report.
pub fn compose_results(topic_query: &str, results: &[Candidate]) -> Option<String> {
    let blocks: Vec<String> = results
        .iter()
        .filter(|c| !c.url.is_empty())
        .map(result_block)
        .collect();

    if blocks.is_empty() {
        return None;
    }

    let noun = if blocks.len() == 1 { "result" } else { "results" };
    Some(format!(
        "🔔 {} new {} for \"{}\"\n\n{}\n\nUse /topics to manage your watch list.",
        blocks.len(),
        noun,
        topic_query,
        blocks.join("\n\n")
    ))
}

fn result_block(candidate: &Candidate) -> String {
    match candidate.summary.as_deref() {
        Some(summary) => format!("• {}\n{}\n🔗 {}", candidate.title, summary, candidate.url),
        None => format!("• {}\n🔗 {}", candidate.title, candidate.url),
    }
}

/// Sent after the last check of a counted (micro-interval) topic.
pub fn compose_monitoring_ended(topic_query: &str) -> String {
    format!(
        "✅ Monitoring of \"{}\" has finished. All scheduled checks are done.\n\
         Add it again with /add if you want to keep watching.",
        topic_query
    )
}

/// Sent when the first check of a new topic found nothing new.
pub fn compose_first_check_empty(topic_query: &str) -> String {
    format!(
        "🔍 First check for \"{}\" is complete. Nothing new yet, I'll keep looking.",
        topic_query
    )
}

/// Sent once per period when the user runs out of searches.
pub fn compose_limit_reached(monthly_limit: i64) -> String {
    format!(
        "⚠️ You have used all {} searches for this month. \
         Monitoring resumes automatically next month.",
        monthly_limit
    )
}

/// Confirmation after a topic is registered.
pub fn compose_topic_registered(topic_query: &str, interval: CheckInterval) -> String {
    format!(
        "👍 Watching \"{}\" {}. The first check runs in about a minute.",
        topic_query,
        interval.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, url: &str, summary: Option<&str>) -> Candidate {
        Candidate::new(Some(title), Some(url), summary).unwrap()
    }

    #[test]
    fn test_single_message_with_all_results() {
        let results = vec![
            candidate("Rust 1.80", "https://blog.rust-lang.org/1.80", Some("LazyLock lands")),
            candidate("Cargo news", "https://blog.rust-lang.org/cargo", None),
        ];

        let text = compose_results("rust releases", &results).unwrap();

        assert!(text.starts_with("🔔 2 new results for \"rust releases\""));
        assert!(text.contains("• Rust 1.80\nLazyLock lands\n🔗 https://blog.rust-lang.org/1.80"));
        assert!(text.contains("• Cargo news\n🔗 https://blog.rust-lang.org/cargo"));
    }

    #[test]
    fn test_empty_results_compose_nothing() {
        assert!(compose_results("rust", &[]).is_none());
    }

    #[test]
    fn test_singular_header() {
        let results = vec![candidate("A", "https://a.example", None)];
        assert!(compose_results("a", &results)
            .unwrap()
            .starts_with("🔔 1 new result for"));
    }

    #[test]
    fn test_lifecycle_messages_name_the_topic() {
        assert!(compose_monitoring_ended("gpu prices").contains("\"gpu prices\""));
        assert!(compose_first_check_empty("gpu prices").contains("Nothing new yet"));
        assert!(compose_limit_reached(200).contains("200"));
        assert!(compose_topic_registered("gpu prices", CheckInterval::Hours(24))
            .contains("every 24 hours"));
    }
}
