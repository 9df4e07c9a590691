//! Keyword extraction used wherever semantic matching degrades to
//! keyword-only behavior.

/// Common stop words filtered out before word-level matching.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "shall", "should", "may", "might", "must", "can",
    "could", "i", "me", "my", "myself", "we", "our", "ours", "you", "your", "yours", "he", "him",
    "his", "she", "her", "hers", "it", "its", "they", "them", "their", "what", "which", "who",
    "whom", "this", "that", "these", "those", "am", "and", "but", "or", "nor", "not", "no", "so",
    "if", "then", "than", "too", "very", "just", "now", "here", "there", "how", "all", "each",
    "every", "both", "few", "more", "most", "some", "any", "such", "only", "own", "same", "also",
    "into", "from", "with", "for", "on", "at", "to", "of", "in", "by", "up", "about", "out",
    "off", "over", "under", "again", "once", "where", "when", "why", "after", "before", "please",
    "want", "need", "help", "like", "make", "let", "get", "know", "think", "tell", "show",
    "give", "use",
];

/// Extract significant words: lowercased, 3+ chars, not a stop word.
pub fn significant_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut words: Vec<String> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
        .filter(|w| w.len() >= 3)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(String::from)
        .collect();
    let mut seen = std::collections::HashSet::new();
    words.retain(|w| seen.insert(w.clone()));
    words
}

/// Count significant words the two texts share.
pub fn shared_significant_words(a: &str, b: &str) -> usize {
    let words_b = significant_words(b);
    significant_words(a)
        .iter()
        .filter(|w| words_b.contains(w))
        .count()
}

/// Keyword-level match: the needle's name appears verbatim, or the texts
/// share at least two significant words.
pub fn keyword_match(message: &str, name: &str, content: &str) -> bool {
    let msg_lower = message.to_lowercase();
    let name_lower = name.to_lowercase();
    if !name_lower.is_empty() && msg_lower.contains(&name_lower) {
        return true;
    }
    shared_significant_words(message, content) >= 2
}
