//! Tokenisation and the bilingual stop-word set.

/// Tokens with this many characters or fewer never count as keywords.
pub const MAX_SHORT_TOKEN_LEN: usize = 2;

/// English and Hebrew function words that carry no topical signal.
const STOP_WORDS: &[&str] = &[
    // English
    "the", "and", "for", "with", "from", "that", "this", "these", "those", "are", "was",
    "were", "been", "being", "have", "has", "had", "not", "but", "you", "your", "our",
    "its", "his", "her", "their", "they", "them", "what", "which", "who", "whom", "when",
    "where", "why", "how", "about", "into", "over", "under", "than", "then", "there",
    "here", "will", "would", "should", "could", "can", "any", "all", "some", "more",
    "most", "other", "such", "only", "own", "same", "very", "just", "also", "out",
    "off", "does", "did", "doing", "each", "few", "both", "between", "after", "before",
    "again", "once", "per", "via",
    // Hebrew
    "של", "את", "על", "עם", "זה", "זו", "זאת", "הוא", "היא", "הם", "הן", "אני", "אתה",
    "אנחנו", "מה", "איך", "למה", "מתי", "איפה", "כל", "גם", "או", "אם", "כי",
    "לא", "יש", "אין", "רק", "עוד", "כמו", "אבל", "היה", "היו", "אל", "מן", "בין",
    "לפי", "כדי", "אחרי", "לפני", "שלי", "שלך", "שלו", "שלה", "אצל", "תחת", "מאוד",
];

/// Whether a lowercase token is a stop-word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Split text into lowercase alphanumeric tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Tokens that carry topical signal: no stop-words, no short tokens, no
/// duplicates. Order of first appearance is preserved.
pub fn keywords(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokenize(text) {
        if token.chars().count() <= MAX_SHORT_TOKEN_LEN || is_stop_word(&token) {
            continue;
        }
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}

/// Lowercase text with every non-alphanumeric run collapsed to one space and
/// a space at each end, so whole-word phrases can be found with `contains`.
pub(crate) fn normalized_padded(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(' ');
    for token in tokenize(text) {
        out.push_str(&token);
        out.push(' ');
    }
    out
}

/// Whole-word (or whole-phrase) match against text prepared by
/// [`normalized_padded`].
pub(crate) fn contains_term(padded: &str, term: &str) -> bool {
    let needle = normalized_padded(term);
    !needle.trim().is_empty() && padded.contains(&needle)
}
