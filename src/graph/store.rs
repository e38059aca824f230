//! Owned storage for graph nodes, links, and clusters.

use std::collections::BTreeMap;

use curator_sources::ContentItem;

use super::types::{GraphStats, KnowledgeGraph, KnowledgeLink};

/// Nodes keyed by id, links in discovery order, and externally supplied
/// clusters.
///
/// The store has a single owner and is mutated through `&mut self`; it
/// never deduplicates links.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraphStore {
    nodes: BTreeMap<String, ContentItem>,
    links: Vec<KnowledgeLink>,
    clusters: Vec<Vec<String>>,
}

impl KnowledgeGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a node. Returns the previous entry for this id.
    pub fn insert_node(&mut self, item: ContentItem) -> Option<ContentItem> {
        self.nodes.insert(item.id.clone(), item)
    }

    /// Append links in order.
    pub fn append_links<I>(&mut self, links: I)
    where
        I: IntoIterator<Item = KnowledgeLink>,
    {
        self.links.extend(links);
    }

    pub fn node(&self, id: &str) -> Option<&ContentItem> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ContentItem> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Every link with `id` as source or target, in discovery order.
    pub fn links_for(&self, id: &str) -> Vec<KnowledgeLink> {
        self.links.iter().filter(|l| l.touches(id)).cloned().collect()
    }

    pub fn stats(&self) -> GraphStats {
        let node_count = self.nodes.len();
        let link_count = self.links.len();
        let average_links_per_node = if node_count == 0 {
            0.0
        } else {
            link_count as f64 / node_count as f64
        };

        let mut link_types = BTreeMap::new();
        for link in &self.links {
            *link_types.entry(link.link_type).or_insert(0) += 1;
        }

        GraphStats {
            node_count,
            link_count,
            average_links_per_node,
            link_types,
        }
    }

    /// Replace the cluster groups.
    pub fn set_clusters(&mut self, clusters: Vec<Vec<String>>) {
        self.clusters = clusters;
    }

    pub fn clusters(&self) -> &[Vec<String>] {
        &self.clusters
    }

    /// Detached copy of the whole graph.
    pub fn export(&self) -> KnowledgeGraph {
        KnowledgeGraph {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            clusters: self.clusters.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.clusters.clear();
    }
}
