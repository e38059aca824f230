//! First-occurrence deduplication of items gathered from many sources.
//!
//! Items are keyed by their normalised URL when they have one, otherwise by
//! title plus source. The first item seen for a key is kept and every later
//! one is dropped, so callers control precedence through input order.

use std::collections::HashSet;

use crate::types::ContentItem;

use super::url_normalize::normalize_url;

/// An item tagged with the registry source that returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedItem {
    /// Registry identifier of the source.
    pub source_id: String,
    /// That source's reliability weight at query time.
    pub source_weight: f64,
    pub item: ContentItem,
}

/// Deduplication key of an item.
pub fn dedup_key(item: &ContentItem) -> String {
    match item.url() {
        Some(url) => format!("url:{}", normalize_url(url)),
        None => format!("title:{}\u{1f}{}", item.title.trim(), item.source),
    }
}

/// Drop every item whose key was already seen, preserving input order.
pub fn deduplicate(items: Vec<SourcedItem>) -> Vec<SourcedItem> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|sourced| seen.insert(dedup_key(&sourced.item)))
        .collect()
}
