//! Lightweight text signals used by the relationship detector.
//!
//! Everything here is deterministic and allocation-light: lowercase
//! tokenisation, a small stopword list, suffix stemming, keyword and
//! TF-IDF overlap, and edit-ratio similarity via `similar`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use similar::TextDiff;

/// Number of keywords kept per item for keyword overlap.
pub const KEYWORD_LIMIT: usize = 12;

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "did", "do", "does", "each", "for", "from", "get", "had", "has",
    "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "me",
    "more", "most", "my", "new", "no", "not", "of", "on", "one", "or", "our", "out", "over", "she",
    "so", "some", "than", "that", "the", "their", "them", "then", "there", "these", "they",
    "this", "those", "to", "up", "use", "using", "was", "we", "were", "what", "when", "which",
    "who", "why", "will", "with", "would", "you", "your",
];

/// Lowercase alphanumeric tokens. Hyphens and apostrophes stay inside
/// words; single-character tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '\'' || ch == '-' {
            current.extend(ch.to_lowercase());
        } else if !current.is_empty() {
            push_token(&mut tokens, &mut current);
        }
    }
    push_token(&mut tokens, &mut current);

    tokens
}

fn push_token(tokens: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim_matches(|c| c == '-' || c == '\'');
    if trimmed.chars().count() > 1 {
        tokens.push(trimmed.to_string());
    }
    current.clear();
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Tokens with stopwords removed.
pub fn content_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stopword(t))
        .collect()
}

/// Strip common English inflections so "frameworks" and "framework" meet.
pub fn stem(word: &str) -> String {
    const SUFFIXES: &[(&str, &str)] = &[("ies", "y"), ("ing", ""), ("ed", ""), ("s", "")];

    for (suffix, replacement) in SUFFIXES {
        if let Some(base) = word.strip_suffix(suffix)
            && base.chars().count() >= 3
            && !(*suffix == "s" && (base.ends_with('s') || base.ends_with('u')))
        {
            return format!("{base}{replacement}");
        }
    }
    word.to_string()
}

/// The `limit` most frequent tokens. Ties go to the alphabetically first.
pub fn keywords(tokens: &[String], limit: usize) -> HashSet<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // BTreeMap order is alphabetical and the sort is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(token, _)| token.to_string())
        .collect()
}

/// Whether `phrase` occurs as a contiguous run inside `tokens`.
pub fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|w| w == phrase)
}

/// Intersection over union; two empty sets score 0.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Word-level diff ratio of two strings, case-insensitive.
pub fn word_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    f64::from(TextDiff::from_words(a.as_str(), b.as_str()).ratio())
}

/// Character-level diff ratio of two strings, case-insensitive.
pub fn char_similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    f64::from(TextDiff::from_chars(a.as_str(), b.as_str()).ratio())
}

/// Document frequencies over a small in-memory corpus.
#[derive(Debug, Default)]
pub struct DocumentFrequencies {
    documents: usize,
    frequencies: HashMap<String, usize>,
}

impl DocumentFrequencies {
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut stats = Self::default();
        for tokens in documents {
            stats.documents += 1;
            let unique: HashSet<&String> = tokens.iter().collect();
            for token in unique {
                *stats.frequencies.entry(token.clone()).or_default() += 1;
            }
        }
        stats
    }

    /// Smoothed inverse document frequency; always positive.
    pub fn idf(&self, term: &str) -> f64 {
        let df = self.frequencies.get(term).copied().unwrap_or(0);
        ((self.documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0
    }

    fn weights(&self, tokens: &[String]) -> HashMap<String, f64> {
        let mut tf: HashMap<String, f64> = HashMap::new();
        for token in tokens {
            *tf.entry(token.clone()).or_default() += 1.0;
        }
        for (term, weight) in &mut tf {
            *weight *= self.idf(term);
        }
        tf
    }

    /// Cosine similarity of the TF-IDF vectors of two token lists.
    pub fn cosine(&self, a: &[String], b: &[String]) -> f64 {
        let (wa, wb) = (self.weights(a), self.weights(b));
        let dot: f64 = wa
            .iter()
            .filter_map(|(term, x)| wb.get(term).map(|y| x * y))
            .sum();
        let norm = |w: &HashMap<String, f64>| w.values().map(|x| x * x).sum::<f64>().sqrt();
        let denominator = norm(&wa) * norm(&wb);
        if denominator == 0.0 {
            0.0
        } else {
            (dot / denominator).clamp(0.0, 1.0)
        }
    }
}
