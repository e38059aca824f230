//! Core types for content items, discovery requests, and aggregated results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// A single piece of content returned by a source.
///
/// Every field except `id` tolerates being absent in serialized input;
/// missing tags, metadata, or body text become empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    /// Caller-assigned unique identifier.
    pub id: String,
    /// Title of the item.
    pub title: String,
    /// Canonical location of the item, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Body text.
    pub content: String,
    /// Identifier of the source that produced this item.
    pub source: String,
    /// Free-form tags. Order carries no meaning.
    pub tags: Vec<String>,
    /// Optional descriptive metadata.
    pub metadata: ContentMetadata,
    /// Relevance to the current query in `[0, 1]`. Rewritten by merge strategies.
    pub relevance_score: f64,
}

impl ContentItem {
    /// Create an item with the given id, title, and source.
    pub fn new(id: impl Into<String>, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source: source.into(),
            ..Self::default()
        }
    }

    /// Attach a URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Attach body text.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Attach tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: ContentMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The URL, if present and non-blank.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Word count from metadata, falling back to counting words in the body.
    pub fn word_count(&self) -> usize {
        self.metadata
            .word_count
            .unwrap_or_else(|| self.content.split_whitespace().count())
    }
}

/// Optional descriptive metadata attached to a [`ContentItem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    /// Kind of content, e.g. `documentation`, `tutorial`, `article`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Hints passed through to every queried source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryOptions {
    /// Per-source result cap. Never raises a source's configured cap.
    pub max_results: Option<usize>,
    /// Restrict the fan-out to these source identifiers.
    pub sources: Option<Vec<String>>,
    pub difficulty: Option<String>,
    pub include_code: Option<bool>,
    pub language: Option<String>,
}

/// What a single source returns for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryResponse {
    pub items: Vec<ContentItem>,
    /// Total number of matches the source knows about (may exceed `items.len()`).
    pub total_found: usize,
    /// Time the source reports having spent, in milliseconds.
    pub search_time_ms: u64,
}

impl DiscoveryResponse {
    /// Build a response whose `total_found` equals the number of items.
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self {
            total_found: items.len(),
            items,
            search_time_ms: 0,
        }
    }
}

/// Policy used to combine results once every source has responded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// `relevance * 0.7 + source_weight * 0.3`, highest first.
    #[default]
    WeightedMerge,
    /// One item per source per round, in source order.
    RoundRobin,
    /// `relevance * 0.4 + quality * 0.4 + source_weight * 0.2`, highest first.
    QualityFirst,
    /// Relevance order, skipping items that add neither a new source nor a new type.
    DiversityMax,
}

impl MergeStrategy {
    /// Returns the wire name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WeightedMerge => "weighted_merge",
            Self::RoundRobin => "round_robin",
            Self::QualityFirst => "quality_first",
            Self::DiversityMax => "diversity_max",
        }
    }

    /// Returns all strategies.
    pub fn all() -> &'static [MergeStrategy] {
        &[
            Self::WeightedMerge,
            Self::RoundRobin,
            Self::QualityFirst,
            Self::DiversityMax,
        ]
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MergeStrategy {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| SourceError::Config(format!("unknown merge strategy: {s}")))
    }
}

/// Aggregated output of a multi-source discovery call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcedContentResult {
    /// Deduplicated, merged, ordered items.
    pub items: Vec<ContentItem>,
    /// Sum of `total_found` across successful sources.
    pub total_found: usize,
    /// Wall-clock duration of the whole call in milliseconds.
    pub search_time_ms: u64,
    /// Sources that answered successfully, in registry order.
    pub sources: Vec<String>,
    /// Deduplicated items contributed by each successful source.
    pub source_breakdown: BTreeMap<String, Vec<ContentItem>>,
    pub quality_metrics: QualityMetrics,
    pub performance_metrics: PerformanceMetrics,
}

/// Quality summary of a merged result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Mean final `relevance_score` of the returned items; 0 when empty.
    pub average_relevance: f64,
    /// Distinct contributing sources divided by registered sources.
    pub source_diversity: f64,
    /// Mean heuristic quality score of the returned items; 0 when empty.
    pub average_quality: f64,
}

/// Timing of one successful source call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTiming {
    pub source_id: String,
    pub elapsed_ms: u64,
    pub item_count: usize,
}

/// A source that was excluded from aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedSource {
    pub source_id: String,
    /// Human-readable failure reason.
    pub error: String,
    /// Whether the failure was a timeout rather than an error.
    pub timed_out: bool,
}

/// Per-call performance report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub fastest_source: Option<SourceTiming>,
    pub slowest_source: Option<SourceTiming>,
    /// Timings of every successful source, in registry order.
    pub source_timings: Vec<SourceTiming>,
    pub failed_sources: Vec<FailedSource>,
    pub total_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_item_builder() {
        let item = ContentItem::new("1", "Rust async", "docs")
            .with_url("https://example.com/async")
            .with_content("tokio runtime basics")
            .with_tags(["rust", "async"]);
        assert_eq!(item.id, "1");
        assert_eq!(item.url(), Some("https://example.com/async"));
        assert_eq!(item.tags.len(), 2);
        assert_eq!(item.word_count(), 3);
    }

    #[test]
    fn blank_url_treated_as_missing() {
        let item = ContentItem::new("1", "t", "s").with_url("   ");
        assert!(item.url().is_none());
    }

    #[test]
    fn metadata_word_count_takes_precedence() {
        let item = ContentItem::new("1", "t", "s")
            .with_content("one two")
            .with_metadata(ContentMetadata {
                word_count: Some(500),
                ..Default::default()
            });
        assert_eq!(item.word_count(), 500);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let item: ContentItem = serde_json::from_str(r#"{"id":"x","title":"T"}"#).expect("parse");
        assert!(item.tags.is_empty());
        assert!(item.content.is_empty());
        assert!(item.metadata.author.is_none());
        assert!(item.relevance_score.abs() < f64::EPSILON);
    }

    #[test]
    fn merge_strategy_default_is_weighted() {
        assert_eq!(MergeStrategy::default(), MergeStrategy::WeightedMerge);
    }

    #[test]
    fn merge_strategy_parses_wire_names() {
        for strategy in MergeStrategy::all() {
            let parsed: MergeStrategy = strategy.name().parse().expect("parse");
            assert_eq!(parsed, *strategy);
        }
        assert!("fastest".parse::<MergeStrategy>().is_err());
    }

    #[test]
    fn merge_strategy_serde_uses_snake_case() {
        let json = serde_json::to_string(&MergeStrategy::DiversityMax).expect("serialize");
        assert_eq!(json, "\"diversity_max\"");
    }

    #[test]
    fn response_from_items_counts_total() {
        let response = DiscoveryResponse::from_items(vec![
            ContentItem::new("a", "A", "s"),
            ContentItem::new("b", "B", "s"),
        ]);
        assert_eq!(response.total_found, 2);
    }
}
