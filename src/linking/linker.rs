//! Incremental linking of content into the knowledge graph.

use curator_sources::ContentItem;

use crate::config::LinkOptions;
use crate::graph::{GraphStats, KnowledgeGraph, KnowledgeGraphStore, KnowledgeLink};

use super::detector::{RelationshipDetector, select_links};
use super::rules::RelationRules;

/// Owns the graph and links every new item against what is already there.
///
/// Insertion order matters: each item is compared only with nodes present
/// when it arrives, and existing pairs are never recomputed.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeLinker {
    detector: RelationshipDetector,
    graph: KnowledgeGraphStore,
}

impl KnowledgeLinker {
    /// Linker using the builtin relation rules.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: RelationRules) -> Self {
        Self {
            detector: RelationshipDetector::new(rules),
            graph: KnowledgeGraphStore::new(),
        }
    }

    /// Link `item` against every existing node, insert it, and append the
    /// accepted links. Returns only the links created by this call.
    ///
    /// Re-adding an id overwrites the node and keeps earlier links.
    /// An invalid `min_link_strength` (NaN or outside `[0, 1]`) is replaced
    /// by the default threshold.
    pub fn add_content(&mut self, item: ContentItem, options: &LinkOptions) -> Vec<KnowledgeLink> {
        if let Err(err) = options.validate() {
            tracing::warn!(error = %err, "invalid link options; using default threshold");
        }
        let candidates = self.detector.detect(&item, self.graph.nodes());
        let candidate_count = candidates.len();
        let links = select_links(candidates, options);

        tracing::debug!(
            node = %item.id,
            candidates = candidate_count,
            accepted = links.len(),
            "linked content"
        );

        if self.graph.insert_node(item).is_some() {
            tracing::debug!("replaced existing node; earlier links kept");
        }
        self.graph.append_links(links.iter().cloned());
        links
    }

    pub fn get_links_for_content(&self, id: &str) -> Vec<KnowledgeLink> {
        self.graph.links_for(id)
    }

    pub fn get_graph_stats(&self) -> GraphStats {
        self.graph.stats()
    }

    pub fn export_graph(&self) -> KnowledgeGraph {
        self.graph.export()
    }

    /// Replace the cluster groups shown in exports.
    pub fn set_clusters(&mut self, clusters: Vec<Vec<String>>) {
        self.graph.set_clusters(clusters);
    }

    pub fn clear(&mut self) {
        self.graph.clear();
    }

    pub fn graph(&self) -> &KnowledgeGraphStore {
        &self.graph
    }

    pub fn rules(&self) -> &RelationRules {
        self.detector.rules()
    }
}
