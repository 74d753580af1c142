//! Query intent classification.
//!
//! A topic's text is matched against per-intent vocabulary. The first intent
//! in [`INTENT_PRIORITY`] whose vocabulary occurs wins, so update/version
//! wording beats generic "how to", which beats generic "news".

use crate::tokenize::{contains_term, normalized_padded};

/// The search strategy implied by a topic's wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryIntent {
    SoftwareUpdate,
    Troubleshooting,
    HowTo,
    Definition,
    Review,
    NewsUpdate,
    General,
}

/// Classification order. Earlier entries win when vocabularies co-occur.
pub const INTENT_PRIORITY: [QueryIntent; 6] = [
    QueryIntent::SoftwareUpdate,
    QueryIntent::Troubleshooting,
    QueryIntent::HowTo,
    QueryIntent::Definition,
    QueryIntent::Review,
    QueryIntent::NewsUpdate,
];

/// Rejects a candidate whose text mentions any `reject` term, unless it also
/// mentions one of the `unless` terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionRule {
    pub reject: &'static [&'static str],
    pub unless: &'static [&'static str],
}

impl ExclusionRule {
    /// Apply the rule to candidate text.
    pub fn rejects(&self, text: &str) -> bool {
        let padded = normalized_padded(text);
        let hit = |terms: &[&str]| terms.iter().any(|t| contains_term(&padded, t));
        hit(self.reject) && !hit(self.unless)
    }
}

impl QueryIntent {
    /// Classify a topic's text.
    pub fn classify(topic: &str) -> Self {
        let padded = normalized_padded(topic);
        INTENT_PRIORITY
            .into_iter()
            .find(|intent| {
                intent
                    .vocabulary()
                    .iter()
                    .any(|term| contains_term(&padded, term))
            })
            .unwrap_or(Self::General)
    }

    /// Words that signal this intent in a topic.
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            Self::SoftwareUpdate => &[
                "update", "updates", "version", "versions", "release notes", "changelog",
                "patch", "firmware", "upgrade", "עדכון", "עדכונים", "גרסה", "גרסת",
            ],
            Self::Troubleshooting => &[
                "error", "errors", "bug", "bugs", "crash", "crashes", "fix", "not working",
                "issue", "problem", "troubleshoot", "troubleshooting", "fails", "failing",
                "שגיאה", "באג", "תקלה", "לא עובד", "בעיה",
            ],
            Self::HowTo => &[
                "how to", "how do", "guide", "tutorial", "step by step", "איך", "מדריך",
            ],
            Self::Definition => &[
                "what is", "what are", "meaning", "definition", "מה זה", "הגדרה", "פירוש",
            ],
            Self::Review => &[
                "review", "reviews", "comparison", "vs", "versus", "best", "ביקורת", "השוואה",
                "המלצות",
            ],
            Self::NewsUpdate => &[
                "news", "announcement", "announced", "launch", "release", "latest", "חדשות",
                "הכרזה", "השקה",
            ],
            Self::General => &[],
        }
    }

    /// Query-expansion terms appended to the provider query.
    pub fn modifiers(&self) -> &'static [&'static str] {
        match self {
            Self::SoftwareUpdate => &["changelog", "release notes", "latest version"],
            Self::Troubleshooting => &["fix", "solution", "workaround"],
            Self::HowTo => &["step by step", "guide"],
            Self::Definition => &["meaning", "explained"],
            Self::Review => &["review", "comparison"],
            Self::NewsUpdate => &["latest news", "announcement"],
            Self::General => &[],
        }
    }

    /// Filtering rule applied to candidates for this intent.
    pub fn exclusion(&self) -> Option<ExclusionRule> {
        match self {
            // Changelog-like content is wanted, not walkthroughs.
            Self::SoftwareUpdate => Some(ExclusionRule {
                reject: &[
                    "tutorial", "video", "walkthrough", "unboxing", "for beginners", "מדריך",
                    "סרטון",
                ],
                unless: &[],
            }),
            Self::Troubleshooting => Some(ExclusionRule {
                reject: &[
                    "tutorial", "beginner", "beginners", "introduction", "getting started",
                    "course", "overview", "למתחילים", "מבוא",
                ],
                unless: &[
                    "fix", "fixed", "fixes", "bug", "error", "solution", "solved", "workaround",
                    "crash", "resolve", "resolved", "תיקון", "באג", "שגיאה", "פתרון",
                ],
            }),
            Self::HowTo => Some(ExclusionRule {
                reject: &["rumor", "rumors", "leak", "leaked"],
                unless: &[],
            }),
            Self::Definition => Some(ExclusionRule {
                reject: &["coupon", "discount", "buy now", "deal"],
                unless: &[],
            }),
            Self::Review => Some(ExclusionRule {
                reject: &["press release", "coupon"],
                unless: &[],
            }),
            Self::NewsUpdate => Some(ExclusionRule {
                reject: &["tutorial", "course", "for beginners"],
                unless: &[],
            }),
            Self::General => None,
        }
    }

    /// The topic text with this intent's modifiers appended.
    pub fn expand_query(&self, query: &str) -> String {
        let query = query.trim();
        let modifiers = self.modifiers();
        if modifiers.is_empty() {
            query.to_string()
        } else {
            format!("{} {}", query, modifiers.join(" "))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoftwareUpdate => "software_update",
            Self::Troubleshooting => "troubleshooting",
            Self::HowTo => "how_to",
            Self::Definition => "definition",
            Self::Review => "review",
            Self::NewsUpdate => "news_update",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_intent() {
        assert_eq!(QueryIntent::classify("iOS 18 update"), QueryIntent::SoftwareUpdate);
        assert_eq!(
            QueryIntent::classify("docker build error on arm"),
            QueryIntent::Troubleshooting
        );
        assert_eq!(QueryIntent::classify("how to brew cold coffee"), QueryIntent::HowTo);
        assert_eq!(QueryIntent::classify("what is a vector database"), QueryIntent::Definition);
        assert_eq!(QueryIntent::classify("best mechanical keyboards"), QueryIntent::Review);
        assert_eq!(QueryIntent::classify("spacex launch news"), QueryIntent::NewsUpdate);
        assert_eq!(QueryIntent::classify("sourdough starter"), QueryIntent::General);
    }

    #[test]
    fn test_update_wins_over_how_to_and_news() {
        assert_eq!(
            QueryIntent::classify("how to install the latest firmware update"),
            QueryIntent::SoftwareUpdate
        );
        assert_eq!(
            QueryIntent::classify("how to read the news"),
            QueryIntent::HowTo
        );
    }

    #[test]
    fn test_classify_hebrew() {
        assert_eq!(QueryIntent::classify("עדכון גרסה לאנדרואיד"), QueryIntent::SoftwareUpdate);
        assert_eq!(QueryIntent::classify("חדשות בינה מלאכותית"), QueryIntent::NewsUpdate);
    }

    #[test]
    fn test_expand_query_appends_modifiers() {
        assert_eq!(
            QueryIntent::Troubleshooting.expand_query(" wifi drops "),
            "wifi drops fix solution workaround"
        );
        assert_eq!(QueryIntent::General.expand_query("sourdough"), "sourdough");
    }

    #[test]
    fn test_software_update_rejects_tutorial_videos() {
        let rule = QueryIntent::SoftwareUpdate.exclusion().unwrap();
        assert!(rule.rejects("Android 15 update walkthrough video"));
        assert!(!rule.rejects("Android 15 changelog: what changed"));
    }

    #[test]
    fn test_troubleshooting_keeps_tutorials_with_fix_vocabulary() {
        let rule = QueryIntent::Troubleshooting.exclusion().unwrap();
        assert!(rule.rejects("Docker tutorial for beginners"));
        assert!(!rule.rejects("Docker tutorial: fix the permission denied error"));
    }
}
