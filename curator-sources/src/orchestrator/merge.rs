//! Merge strategies that turn deduplicated items into a final ordering.
//!
//! # Formulas
//!
//! ```text
//! weighted_merge: score = relevance * 0.7 + source_weight * 0.3
//! quality_first:  score = relevance * 0.4 + quality * 0.4 + source_weight * 0.2
//! ```
//!
//! Both sort by `score` descending and store it as the item's
//! `relevance_score`. `round_robin` and `diversity_max` store the scorer's
//! relevance unchanged. All sorts are stable.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::relevance::RelevanceScorer;
use crate::types::MergeStrategy;

use super::dedup::SourcedItem;
use super::quality::quality_score;

/// Items kept unconditionally by `diversity_max` before it starts skipping.
pub const DIVERSITY_FLOOR: usize = 5;

/// Apply `strategy` to deduplicated items.
pub fn merge(
    strategy: MergeStrategy,
    items: Vec<SourcedItem>,
    query: &str,
    scorer: &dyn RelevanceScorer,
    now: DateTime<Utc>,
) -> Vec<SourcedItem> {
    match strategy {
        MergeStrategy::WeightedMerge => rank_by(items, query, scorer, |relevance, sourced| {
            relevance * 0.7 + sourced.source_weight * 0.3
        }),
        MergeStrategy::QualityFirst => rank_by(items, query, scorer, |relevance, sourced| {
            relevance * 0.4 + quality_score(&sourced.item, now) * 0.4 + sourced.source_weight * 0.2
        }),
        MergeStrategy::RoundRobin => round_robin(items, query, scorer),
        MergeStrategy::DiversityMax => diversity_max(items, query, scorer),
    }
}

fn relevance_of(scorer: &dyn RelevanceScorer, sourced: &SourcedItem, query: &str) -> f64 {
    let relevance = scorer.calculate_relevance(&sourced.item, query);
    if relevance.is_nan() {
        0.0
    } else {
        relevance.clamp(0.0, 1.0)
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn rank_by<F>(
    items: Vec<SourcedItem>,
    query: &str,
    scorer: &dyn RelevanceScorer,
    score: F,
) -> Vec<SourcedItem>
where
    F: Fn(f64, &SourcedItem) -> f64,
{
    let mut scored: Vec<(f64, SourcedItem)> = items
        .into_iter()
        .map(|mut sourced| {
            let relevance = relevance_of(scorer, &sourced, query);
            let combined = score(relevance, &sourced).clamp(0.0, 1.0);
            sourced.item.relevance_score = combined;
            (combined, sourced)
        })
        .collect();

    scored.sort_by(|a, b| descending(a.0, b.0));
    scored.into_iter().map(|(_, sourced)| sourced).collect()
}

fn round_robin(items: Vec<SourcedItem>, query: &str, scorer: &dyn RelevanceScorer) -> Vec<SourcedItem> {
    // Queues in order of each source's first appearance.
    let mut queues: Vec<VecDeque<SourcedItem>> = Vec::new();
    let mut queue_of: HashMap<String, usize> = HashMap::new();
    let total = items.len();

    for mut sourced in items {
        sourced.item.relevance_score = relevance_of(scorer, &sourced, query);
        let index = *queue_of.entry(sourced.source_id.clone()).or_insert_with(|| {
            queues.push(VecDeque::new());
            queues.len() - 1
        });
        queues[index].push_back(sourced);
    }

    let mut merged = Vec::with_capacity(total);
    while merged.len() < total {
        for queue in &mut queues {
            if let Some(sourced) = queue.pop_front() {
                merged.push(sourced);
            }
        }
    }
    merged
}

fn diversity_max(items: Vec<SourcedItem>, query: &str, scorer: &dyn RelevanceScorer) -> Vec<SourcedItem> {
    // Rank of each item within its own source breaks relevance ties, so
    // equally relevant sources interleave instead of one source leading.
    let mut per_source: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<(f64, usize, SourcedItem)> = items
        .into_iter()
        .map(|mut sourced| {
            let relevance = relevance_of(scorer, &sourced, query);
            sourced.item.relevance_score = relevance;
            let counter = per_source.entry(sourced.source_id.clone()).or_insert(0);
            let rank = *counter;
            *counter += 1;
            (relevance, rank, sourced)
        })
        .collect();

    ranked.sort_by(|a, b| descending(a.0, b.0).then(a.1.cmp(&b.1)));

    let mut seen_sources: HashSet<String> = HashSet::new();
    let mut seen_types: HashSet<Option<String>> = HashSet::new();
    let mut kept = Vec::new();

    for (_, _, sourced) in ranked {
        let content_type = sourced
            .item
            .metadata
            .content_type
            .as_deref()
            .map(str::to_lowercase);
        let new_source = !seen_sources.contains(&sourced.source_id);
        let new_type = !seen_types.contains(&content_type);

        if new_source || new_type || kept.len() < DIVERSITY_FLOOR {
            seen_sources.insert(sourced.source_id.clone());
            seen_types.insert(content_type);
            kept.push(sourced);
        }
    }
    kept
}
