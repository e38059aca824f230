//! Integration tests for the discovery coordinator.
//!
//! These tests drive the full select → fan out → dedup → merge → metrics
//! pipeline with in-process mock connectors (no network calls).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use curator_sources::{
    CancellationToken, ContentItem, CoordinatorSettings, DiscoveryOptions, DiscoveryResponse,
    MergeStrategy, RelevanceScorer, SourceConfig, SourceConnector, SourceCoordinator, SourceError,
    SourceRegistry,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Returns a fixed item list after an optional delay.
struct MockSource {
    delay: Duration,
    items: Vec<ContentItem>,
}

impl MockSource {
    fn instant(items: Vec<ContentItem>) -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::ZERO,
            items,
        })
    }

    fn delayed(delay_ms: u64, items: Vec<ContentItem>) -> Arc<Self> {
        Arc::new(Self {
            delay: Duration::from_millis(delay_ms),
            items,
        })
    }
}

#[async_trait]
impl SourceConnector for MockSource {
    async fn discover(
        &self,
        _query: &str,
        options: &DiscoveryOptions,
        cancel: CancellationToken,
    ) -> Result<DiscoveryResponse, SourceError> {
        tokio::select! {
            () = cancel.cancelled() => Err(SourceError::Connector("cancelled".into())),
            () = tokio::time::sleep(self.delay) => {
                let limit = options.max_results.unwrap_or(usize::MAX);
                Ok(DiscoveryResponse::from_items(
                    self.items.iter().take(limit).cloned().collect(),
                ))
            }
        }
    }
}

/// Every item is equally relevant.
struct Flat;

impl RelevanceScorer for Flat {
    fn calculate_relevance(&self, _item: &ContentItem, _query: &str) -> f64 {
        0.5
    }
}

fn item(id: &str, source: &str, title: &str, url: Option<&str>) -> ContentItem {
    let mut item = ContentItem::new(id, title, source);
    item.url = url.map(str::to_string);
    item
}

fn config(weight: f64, timeout_ms: u64) -> SourceConfig {
    SourceConfig {
        reliability_weight: weight,
        timeout_ms,
        ..Default::default()
    }
}

fn ids(result: &[ContentItem]) -> Vec<&str> {
    result.iter().map(|i| i.id.as_str()).collect()
}

#[tokio::test]
async fn slow_source_excluded_and_reported() {
    init_tracing();
    let mut registry = SourceRegistry::new();
    registry
        .register(
            "W",
            MockSource::delayed(200, vec![item("w1", "W", "Rust from W", Some("https://w.example/1"))]),
            config(0.8, 50),
        )
        .unwrap();
    registry
        .register(
            "X",
            MockSource::instant(vec![
                item("x1", "X", "Rust from X", Some("https://x.example/1")),
                item("x2", "X", "More rust from X", Some("https://x.example/2")),
            ]),
            config(0.6, 500),
        )
        .unwrap();

    let coordinator = SourceCoordinator::new(registry);
    let result = coordinator
        .discover_from_multiple_sources("rust", &DiscoveryOptions::default(), MergeStrategy::WeightedMerge)
        .await
        .expect("partial failure is not fatal");

    let mut returned = ids(&result.items);
    returned.sort_unstable();
    assert_eq!(returned, vec!["x1", "x2"]);
    assert_eq!(result.sources, vec!["X".to_string()]);

    let failed = &result.performance_metrics.failed_sources;
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].source_id, "W");
    assert!(failed[0].timed_out);
    assert!(result.search_time_ms < 200, "coordinator waited for the slow source");
}

#[tokio::test]
async fn zero_enabled_sources_is_an_error() {
    let mut registry = SourceRegistry::new();
    registry
        .register(
            "off",
            MockSource::instant(vec![]),
            SourceConfig {
                enabled: false,
                ..Default::default()
            },
        )
        .unwrap();
    let err = SourceCoordinator::new(registry)
        .discover("rust", &DiscoveryOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::NoEnabledSources));
}

#[tokio::test]
async fn round_robin_skips_exhausted_sources() {
    let mut registry = SourceRegistry::new();
    registry
        .register(
            "A",
            MockSource::instant(vec![
                item("A1", "A", "a one", None),
                item("A2", "A", "a two", None),
                item("A3", "A", "a three", None),
            ]),
            SourceConfig::default(),
        )
        .unwrap();
    registry
        .register(
            "B",
            MockSource::instant(vec![item("B1", "B", "b one", None)]),
            SourceConfig::default(),
        )
        .unwrap();

    let result = SourceCoordinator::new(registry)
        .discover_from_multiple_sources("q", &DiscoveryOptions::default(), MergeStrategy::RoundRobin)
        .await
        .unwrap();
    assert_eq!(ids(&result.items), vec!["A1", "B1", "A2", "A3"]);
}

#[tokio::test]
async fn diversity_reaches_both_sources_in_first_two_picks() {
    let mut registry = SourceRegistry::new();
    for source in ["A", "B"] {
        let items = (1..=3)
            .map(|i| item(&format!("{source}{i}"), source, &format!("{source} item {i}"), None))
            .collect();
        registry
            .register(source, MockSource::instant(items), SourceConfig::default())
            .unwrap();
    }

    let result = SourceCoordinator::with_scorer(registry, Arc::new(Flat))
        .discover_from_multiple_sources("q", &DiscoveryOptions::default(), MergeStrategy::DiversityMax)
        .await
        .unwrap();
    let first_two: HashSet<&str> = result.items[..2].iter().map(|i| i.source.as_str()).collect();
    assert_eq!(first_two.len(), 2);
}

#[tokio::test]
async fn weighted_merge_invariants_hold() {
    let mut registry = SourceRegistry::new();
    registry
        .register(
            "docs",
            MockSource::instant(vec![
                item("d1", "docs", "Rust ownership guide", Some("https://shared.example/own")),
                item("d2", "docs", "Async in depth", Some("https://docs.example/async")),
            ]),
            config(0.9, 1_000),
        )
        .unwrap();
    registry
        .register(
            "forum",
            MockSource::instant(vec![
                item("f1", "forum", "Rust ownership question", Some("https://Shared.example/own/")),
                item("f2", "forum", "Rust borrow checker rant", Some("https://forum.example/2")),
            ]),
            config(0.3, 1_000),
        )
        .unwrap();
    registry
        .register(
            "disabled",
            MockSource::instant(vec![item("z1", "disabled", "Rust", Some("https://z.example"))]),
            SourceConfig {
                enabled: false,
                ..Default::default()
            },
        )
        .unwrap();

    let result = SourceCoordinator::new(registry)
        .discover("rust ownership", &DiscoveryOptions::default())
        .await
        .unwrap();

    // Every item comes from an enabled source.
    let enabled: HashSet<&str> = ["docs", "forum"].into_iter().collect();
    assert!(result.items.iter().all(|i| enabled.contains(i.source.as_str())));

    // No two items share a URL.
    let urls: Vec<&str> = result.items.iter().filter_map(|i| i.url()).collect();
    let unique: HashSet<&str> = urls.iter().copied().collect();
    assert_eq!(urls.len(), unique.len());
    assert_eq!(result.items.len(), 3);

    // Ordered by combined score.
    for pair in result.items.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
    }
    assert_eq!(result.items[0].id, "d1");

    assert!((result.quality_metrics.source_diversity - 2.0 / 3.0).abs() < 1e-9);
    assert!(result.quality_metrics.average_relevance > 0.0);
}

#[tokio::test]
async fn source_filter_limits_fan_out() {
    let mut registry = SourceRegistry::new();
    registry
        .register("a", MockSource::instant(vec![item("a1", "a", "x", None)]), SourceConfig::default())
        .unwrap();
    registry
        .register("b", MockSource::instant(vec![item("b1", "b", "y", None)]), SourceConfig::default())
        .unwrap();

    let options = DiscoveryOptions {
        sources: Some(vec!["b".into()]),
        ..Default::default()
    };
    let result = SourceCoordinator::new(registry)
        .discover("q", &options)
        .await
        .unwrap();
    assert_eq!(ids(&result.items), vec!["b1"]);
    assert_eq!(result.sources, vec!["b".to_string()]);
}

#[tokio::test]
async fn settings_file_reconfigures_sources() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sources.toml");
    std::fs::write(
        &path,
        r#"
default_strategy = "round_robin"

[sources.slow]
timeout_ms = 20
"#,
    )
    .unwrap();

    let mut registry = SourceRegistry::new();
    registry
        .register(
            "slow",
            MockSource::delayed(300, vec![item("s1", "slow", "late", None)]),
            config(0.5, 1_000),
        )
        .unwrap();
    registry
        .register("quick", MockSource::instant(vec![item("q1", "quick", "early", None)]), SourceConfig::default())
        .unwrap();

    let mut coordinator = SourceCoordinator::new(registry);
    coordinator
        .apply_settings(&CoordinatorSettings::from_file(&path).unwrap())
        .unwrap();
    assert_eq!(coordinator.default_strategy(), MergeStrategy::RoundRobin);

    let result = coordinator.discover("q", &DiscoveryOptions::default()).await.unwrap();
    assert_eq!(ids(&result.items), vec!["q1"]);
    assert_eq!(result.performance_metrics.failed_sources[0].source_id, "slow");
}

#[tokio::test]
async fn performance_metrics_rank_sources_by_time() {
    let mut registry = SourceRegistry::new();
    registry
        .register("fast", MockSource::instant(vec![item("f", "fast", "f", None)]), SourceConfig::default())
        .unwrap();
    registry
        .register("steady", MockSource::delayed(40, vec![item("s", "steady", "s", None)]), SourceConfig::default())
        .unwrap();

    let result = SourceCoordinator::new(registry)
        .discover("q", &DiscoveryOptions::default())
        .await
        .unwrap();
    let perf = &result.performance_metrics;
    assert_eq!(perf.fastest_source.as_ref().map(|t| t.source_id.as_str()), Some("fast"));
    assert_eq!(perf.slowest_source.as_ref().map(|t| t.source_id.as_str()), Some("steady"));
    assert_eq!(perf.source_timings.len(), 2);
    assert!(perf.failed_sources.is_empty());
}
