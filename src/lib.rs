//! Curator: multi-source content aggregation and knowledge linking.
//!
//! Two halves share one content model:
//!
//! - **Discovery** ([`curator_sources`]): a [`SourceCoordinator`] queries every
//!   enabled source concurrently, drops slow or failing ones, deduplicates,
//!   and merges the rest under a [`MergeStrategy`].
//! - **Linking** ([`linking`], [`graph`]): a [`KnowledgeLinker`] compares each
//!   new item with every item already in the graph and records typed,
//!   weighted [`KnowledgeLink`]s (similar, related, dependency, hierarchy,
//!   temporal).
//!
//! [`Curator`] runs the first and feeds its output into the second.
//!
//! Neither half installs a tracing subscriber; that is left to the binary.

pub mod config;
pub mod curator;
pub mod error;
pub mod graph;
pub mod linking;

pub use config::{LinkOptions, LinkingConfig};
pub use curator::{CurationOutcome, Curator};
pub use error::{CuratorError, Result};
pub use graph::{GraphStats, KnowledgeGraph, KnowledgeGraphStore, KnowledgeLink, LinkType};
pub use linking::{KnowledgeLinker, RelationRule, RelationRules, RelationshipDetector, RuleKind};

pub use curator_sources::{
    CancellationToken, ContentItem, ContentMetadata, CoordinatorSettings, DiscoveryOptions,
    DiscoveryResponse, MergeStrategy, RelevanceScorer, SourceConfig, SourceConnector,
    SourceCoordinator, SourceError, SourceRegistry, SourcedContentResult,
};
