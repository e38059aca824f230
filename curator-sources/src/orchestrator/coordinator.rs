//! Multi-source discovery coordinator: select, fan out, dedup, merge, report.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::config::CoordinatorSettings;
use crate::error::SourceError;
use crate::registry::SourceRegistry;
use crate::relevance::{KeywordRelevance, RelevanceScorer};
use crate::types::{
    ContentItem, DiscoveryOptions, FailedSource, MergeStrategy, SourceTiming,
    SourcedContentResult,
};

use super::dedup::{deduplicate, SourcedItem};
use super::fanout::{fan_out, FanOutTarget};
use super::merge::merge;
use super::metrics::{performance_metrics, quality_metrics};

/// Queries every enabled source concurrently and merges what comes back.
///
/// The coordinator owns its [`SourceRegistry`]. A discovery call borrows it
/// immutably, so configuration cannot change while a call is in flight.
pub struct SourceCoordinator {
    registry: SourceRegistry,
    scorer: Arc<dyn RelevanceScorer>,
    default_strategy: MergeStrategy,
}

impl std::fmt::Debug for SourceCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCoordinator")
            .field("registry", &self.registry)
            .field("default_strategy", &self.default_strategy)
            .finish_non_exhaustive()
    }
}

impl SourceCoordinator {
    /// Create a coordinator scoring relevance with [`KeywordRelevance`].
    pub fn new(registry: SourceRegistry) -> Self {
        Self::with_scorer(registry, Arc::new(KeywordRelevance))
    }

    /// Create a coordinator with a custom relevance scorer.
    pub fn with_scorer(registry: SourceRegistry, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self {
            registry,
            scorer,
            default_strategy: MergeStrategy::default(),
        }
    }

    /// Apply settings: per-source updates and the default strategy.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if an update produces an invalid config.
    pub fn apply_settings(&mut self, settings: &CoordinatorSettings) -> Result<(), SourceError> {
        self.registry.apply_settings(settings)?;
        self.default_strategy = settings.default_strategy;
        Ok(())
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SourceRegistry {
        &mut self.registry
    }

    pub fn default_strategy(&self) -> MergeStrategy {
        self.default_strategy
    }

    /// Discover with the default merge strategy.
    ///
    /// # Errors
    ///
    /// Same as [`SourceCoordinator::discover_from_multiple_sources`].
    pub async fn discover(
        &self,
        query: &str,
        options: &DiscoveryOptions,
    ) -> Result<SourcedContentResult, SourceError> {
        self.discover_from_multiple_sources(query, options, self.default_strategy)
            .await
    }

    /// Query all selected sources concurrently and merge their results.
    ///
    /// # Pipeline
    ///
    /// 1. Select enabled sources, narrowed by `options.sources`
    /// 2. Fan out one task per source, each raced against its own timeout
    /// 3. Record failures; cap and stamp items from successful sources
    /// 4. Deduplicate (first occurrence wins, registry order)
    /// 5. Merge with `strategy`
    /// 6. Compute quality and performance metrics
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoEnabledSources`] if no source is selected.
    /// Failing or slow sources never fail the call; they are listed in
    /// `performance_metrics.failed_sources`.
    pub async fn discover_from_multiple_sources(
        &self,
        query: &str,
        options: &DiscoveryOptions,
        strategy: MergeStrategy,
    ) -> Result<SourcedContentResult, SourceError> {
        let started = Instant::now();
        tracing::trace!(query, %strategy, "multi-source discovery");

        // 1. Select sources.
        let targets = self.select_targets(options);
        if targets.is_empty() {
            return Err(SourceError::NoEnabledSources);
        }
        let caps: BTreeMap<String, usize> = targets
            .iter()
            .map(|t| (t.source_id.clone(), effective_cap(t.config.max_results, options)))
            .collect();

        // 2. Fan out.
        let outcomes = fan_out(query, targets).await;

        // 3. Split successes from failures.
        let mut gathered: Vec<SourcedItem> = Vec::new();
        let mut succeeded: Vec<String> = Vec::new();
        let mut timings: Vec<SourceTiming> = Vec::new();
        let mut failed: Vec<FailedSource> = Vec::new();
        let mut total_found = 0usize;

        for outcome in outcomes {
            match outcome.result {
                Ok(response) => {
                    let cap = caps.get(&outcome.source_id).copied().unwrap_or(usize::MAX);
                    let items: Vec<ContentItem> = response
                        .items
                        .into_iter()
                        .take(cap)
                        .map(|item| stamp_source(item, &outcome.source_id))
                        .collect();
                    tracing::debug!(
                        source = %outcome.source_id,
                        count = items.len(),
                        elapsed_ms = outcome.elapsed_ms,
                        "source returned items"
                    );

                    total_found += response.total_found.max(items.len());
                    timings.push(SourceTiming {
                        source_id: outcome.source_id.clone(),
                        elapsed_ms: outcome.elapsed_ms,
                        item_count: items.len(),
                    });
                    gathered.extend(items.into_iter().map(|item| SourcedItem {
                        source_id: outcome.source_id.clone(),
                        source_weight: outcome.config.reliability_weight,
                        item,
                    }));
                    succeeded.push(outcome.source_id);
                }
                Err(err) => {
                    tracing::warn!(source = %outcome.source_id, error = %err, "source query failed");
                    failed.push(FailedSource {
                        source_id: outcome.source_id,
                        timed_out: matches!(err, SourceError::Timeout { .. }),
                        error: err.to_string(),
                    });
                }
            }
        }

        // 4. Deduplicate.
        let deduped = deduplicate(gathered);

        let mut source_breakdown: BTreeMap<String, Vec<ContentItem>> = succeeded
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for sourced in &deduped {
            if let Some(bucket) = source_breakdown.get_mut(&sourced.source_id) {
                bucket.push(sourced.item.clone());
            }
        }

        // 5. Merge.
        let now = Utc::now();
        let merged = merge(strategy, deduped, query, self.scorer.as_ref(), now);

        // 6. Metrics.
        let quality = quality_metrics(&merged, self.registry.len(), now);
        let total_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let performance = performance_metrics(timings, failed, total_time_ms);

        Ok(SourcedContentResult {
            items: merged.into_iter().map(|sourced| sourced.item).collect(),
            total_found,
            search_time_ms: total_time_ms,
            sources: succeeded,
            source_breakdown,
            quality_metrics: quality,
            performance_metrics: performance,
        })
    }

    fn select_targets(&self, options: &DiscoveryOptions) -> Vec<FanOutTarget> {
        self.registry
            .enabled_sources()
            .filter(|(id, _)| {
                options
                    .sources
                    .as_ref()
                    .is_none_or(|wanted| wanted.iter().any(|w| w == id))
            })
            .map(|(id, source)| {
                let mut source_options = options.clone();
                source_options.max_results =
                    Some(effective_cap(source.config.max_results, options));
                FanOutTarget {
                    source_id: id.to_string(),
                    connector: Arc::clone(&source.connector),
                    config: source.config.clone(),
                    options: source_options,
                }
            })
            .collect()
    }
}

/// A caller override may lower a source's cap but never raise it.
fn effective_cap(configured: usize, options: &DiscoveryOptions) -> usize {
    options
        .max_results
        .map_or(configured, |requested| requested.min(configured))
}

fn stamp_source(mut item: ContentItem, source_id: &str) -> ContentItem {
    if item.source.trim().is_empty() {
        item.source = source_id.to_string();
    }
    item
}
