//! Quality and performance summaries of a discovery call.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::{FailedSource, PerformanceMetrics, QualityMetrics, SourceTiming};

use super::dedup::SourcedItem;
use super::quality::quality_score;

/// Summarise the quality of the final merged items.
///
/// `registered_sources` is the size of the whole registry, disabled
/// sources included.
pub fn quality_metrics(
    items: &[SourcedItem],
    registered_sources: usize,
    now: DateTime<Utc>,
) -> QualityMetrics {
    if items.is_empty() {
        return QualityMetrics::default();
    }

    let count = items.len() as f64;
    let average_relevance = items.iter().map(|s| s.item.relevance_score).sum::<f64>() / count;
    let average_quality = items
        .iter()
        .map(|s| quality_score(&s.item, now))
        .sum::<f64>()
        / count;

    let contributing: HashSet<&str> = items.iter().map(|s| s.source_id.as_str()).collect();
    let source_diversity = if registered_sources == 0 {
        0.0
    } else {
        contributing.len() as f64 / registered_sources as f64
    };

    QualityMetrics {
        average_relevance,
        source_diversity,
        average_quality,
    }
}

/// Build the performance report from per-source timings and failures.
///
/// Ties for fastest go to the earlier source; ties for slowest to the later.
pub fn performance_metrics(
    source_timings: Vec<SourceTiming>,
    failed_sources: Vec<FailedSource>,
    total_time_ms: u64,
) -> PerformanceMetrics {
    let fastest_source = source_timings.iter().min_by_key(|t| t.elapsed_ms).cloned();
    let slowest_source = source_timings.iter().max_by_key(|t| t.elapsed_ms).cloned();

    PerformanceMetrics {
        fastest_source,
        slowest_source,
        source_timings,
        failed_sources,
        total_time_ms,
    }
}
