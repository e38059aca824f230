//! Relevance scoring between a content item and a query.
//!
//! The coordinator takes any [`RelevanceScorer`]; [`KeywordRelevance`] is a
//! dependency-free default that counts query terms found in the item.

use crate::types::ContentItem;

/// Scores how well a content item matches a query.
///
/// Implementations must be pure and return a value in `[0, 1]`.
pub trait RelevanceScorer: Send + Sync {
    fn calculate_relevance(&self, item: &ContentItem, query: &str) -> f64;
}

/// Term-overlap relevance: each query term contributes its best hit.
///
/// | Hit location | Credit |
/// |--------------|--------|
/// | title        | 1.0    |
/// | tag          | 0.8    |
/// | body text    | 0.5    |
///
/// The score is the mean credit over query terms.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordRelevance;

const TITLE_CREDIT: f64 = 1.0;
const TAG_CREDIT: f64 = 0.8;
const BODY_CREDIT: f64 = 0.5;

impl RelevanceScorer for KeywordRelevance {
    fn calculate_relevance(&self, item: &ContentItem, query: &str) -> f64 {
        let terms: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
            .collect();
        if terms.is_empty() {
            return 0.0;
        }

        let title = item.title.to_lowercase();
        let body = item.content.to_lowercase();
        let tags: Vec<String> = item.tags.iter().map(|t| t.to_lowercase()).collect();

        let total: f64 = terms
            .iter()
            .map(|term| {
                if title.contains(term.as_str()) {
                    TITLE_CREDIT
                } else if tags.iter().any(|tag| tag.contains(term.as_str())) {
                    TAG_CREDIT
                } else if body.contains(term.as_str()) {
                    BODY_CREDIT
                } else {
                    0.0
                }
            })
            .sum();

        (total / terms.len() as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ContentItem {
        ContentItem::new("1", "Understanding Rust Ownership", "docs")
            .with_content("Borrowing rules and lifetimes explained")
            .with_tags(["memory", "safety"])
    }

    #[test]
    fn all_terms_in_title_score_one() {
        let score = KeywordRelevance.calculate_relevance(&item(), "rust ownership");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tag_and_body_hits_score_lower() {
        let score = KeywordRelevance.calculate_relevance(&item(), "memory lifetimes");
        assert!((score - (TAG_CREDIT + BODY_CREDIT) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_hits_score_zero() {
        let score = KeywordRelevance.calculate_relevance(&item(), "python");
        assert!(score.abs() < f64::EPSILON);
    }

    #[test]
    fn empty_query_scores_zero() {
        assert!(KeywordRelevance.calculate_relevance(&item(), "  ").abs() < f64::EPSILON);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let score = KeywordRelevance.calculate_relevance(&item(), "RUST");
        assert!((score - 1.0).abs() < f64::EPSILON);
    }
}
