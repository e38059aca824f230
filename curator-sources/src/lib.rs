//! # curator-sources
//!
//! Concurrent multi-source content discovery for the curator.
//!
//! A [`SourceRegistry`] holds one [`SourceConnector`] and one
//! [`SourceConfig`] per source. The [`SourceCoordinator`] queries every
//! enabled source at once, tolerates slow or failing sources, and merges
//! what comes back into a single [`SourcedContentResult`].
//!
//! ## Design
//!
//! - One tokio task per source, each raced against its own timeout
//! - Cooperative cancellation through a `CancellationToken` handed to connectors
//! - Failed and timed-out sources are reported as data, never as errors
//! - First-occurrence deduplication by normalised URL, then title + source
//! - Four merge strategies: weighted, round robin, quality first, diversity
//!
//! Queries are logged only at trace level.

pub mod config;
pub mod connector;
pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod relevance;
pub mod types;

pub use config::{CoordinatorSettings, SourceConfig, SourceConfigUpdate};
pub use connector::SourceConnector;
pub use error::{Result, SourceError};
pub use orchestrator::SourceCoordinator;
pub use registry::SourceRegistry;
pub use relevance::{KeywordRelevance, RelevanceScorer};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    ContentItem, ContentMetadata, DiscoveryOptions, DiscoveryResponse, FailedSource,
    MergeStrategy, PerformanceMetrics, QualityMetrics, SourceTiming, SourcedContentResult,
};

/// Query every enabled source in `registry` once with the default strategy.
///
/// Convenience wrapper for one-off calls; build a [`SourceCoordinator`] to
/// reuse a registry or plug in a custom [`RelevanceScorer`].
///
/// # Errors
///
/// Returns [`SourceError::NoEnabledSources`] if no source is enabled.
///
/// # Examples
///
/// ```no_run
/// # async fn example(registry: curator_sources::SourceRegistry) -> curator_sources::Result<()> {
/// let result = curator_sources::discover(registry, "rust async").await?;
/// for item in &result.items {
///     println!("{} ({:.2})", item.title, item.relevance_score);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn discover(registry: SourceRegistry, query: &str) -> Result<SourcedContentResult> {
    SourceCoordinator::new(registry)
        .discover(query, &DiscoveryOptions::default())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discover_with_empty_registry_fails() {
        let err = discover(SourceRegistry::new(), "anything").await.unwrap_err();
        assert!(err.to_string().contains("no sources"));
    }
}
