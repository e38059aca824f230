//! Heuristic content quality score.
//!
//! | Signal                                   | Points |
//! |------------------------------------------|--------|
//! | word count in `[200, 1000]`              | 0.3    |
//! | otherwise word count above 100           | 0.1    |
//! | known author                             | 0.2    |
//! | published less than 30 days ago          | 0.2    |
//! | otherwise published less than a year ago | 0.1    |
//! | more than two distinct tags              | 0.2    |
//! | `documentation` or `tutorial` type       | 0.1    |
//!
//! The total is capped at 1.0.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::ContentItem;

const AUTHOR_PLACEHOLDERS: &[&str] = &["unknown", "anonymous", "n/a"];
const PREFERRED_TYPES: &[&str] = &["documentation", "tutorial"];

/// Quality of `item` as of `now`, in `[0, 1]`.
pub fn quality_score(item: &ContentItem, now: DateTime<Utc>) -> f64 {
    let mut score = 0.0;

    let words = item.word_count();
    if (200..=1000).contains(&words) {
        score += 0.3;
    } else if words > 100 {
        score += 0.1;
    }

    if has_known_author(item) {
        score += 0.2;
    }

    if let Some(published) = item.metadata.publish_date {
        let age_days = (now - published).num_days();
        if age_days < 30 {
            score += 0.2;
        } else if age_days < 365 {
            score += 0.1;
        }
    }

    let distinct_tags: HashSet<String> = item
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    if distinct_tags.len() > 2 {
        score += 0.2;
    }

    if item
        .metadata
        .content_type
        .as_deref()
        .is_some_and(|kind| PREFERRED_TYPES.iter().any(|p| kind.eq_ignore_ascii_case(p)))
    {
        score += 0.1;
    }

    f64::min(score, 1.0)
}

fn has_known_author(item: &ContentItem) -> bool {
    item.metadata.author.as_deref().is_some_and(|author| {
        let author = author.trim();
        !author.is_empty()
            && !AUTHOR_PLACEHOLDERS
                .iter()
                .any(|p| author.eq_ignore_ascii_case(p))
    })
}
