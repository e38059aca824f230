//! Knowledge graph data types: links, link kinds, snapshots, and stats.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use curator_sources::ContentItem;

use crate::error::CuratorError;

/// The kind of relationship a link expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// Overlapping tags or text.
    Similar,
    /// Loosely connected, e.g. the same publisher.
    Related,
    /// The source is a prerequisite of the target.
    Dependency,
    /// The source is a broader topic than the target.
    Hierarchy,
    /// Both items belong to a versioned series.
    Temporal,
}

impl LinkType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Similar => "similar",
            Self::Related => "related",
            Self::Dependency => "dependency",
            Self::Hierarchy => "hierarchy",
            Self::Temporal => "temporal",
        }
    }

    pub fn all() -> &'static [LinkType] {
        &[
            Self::Similar,
            Self::Related,
            Self::Dependency,
            Self::Hierarchy,
            Self::Temporal,
        ]
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LinkType {
    type Err = CuratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| CuratorError::Config(format!("unknown link type: {s}")))
    }
}

/// A typed, directed, weighted relationship between two content items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeLink {
    pub source_id: String,
    pub target_id: String,
    pub link_type: LinkType,
    /// Strength in `[0, 1]`.
    pub strength: f64,
    /// Human-readable explanation.
    pub reason: String,
    /// Whether the reverse direction is also materialised.
    pub bidirectional: bool,
}

impl KnowledgeLink {
    /// Create a link. `strength` is clamped to `[0, 1]`; NaN becomes 0.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        link_type: LinkType,
        strength: f64,
        reason: impl Into<String>,
    ) -> Self {
        let strength = if strength.is_nan() {
            0.0
        } else {
            strength.clamp(0.0, 1.0)
        };
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            link_type,
            strength,
            reason: reason.into(),
            bidirectional: false,
        }
    }

    /// Mark the link as bidirectional.
    #[must_use]
    pub fn bidirectional(mut self) -> Self {
        self.bidirectional = true;
        self
    }

    /// The reverse-direction entry of a bidirectional link.
    pub fn mirrored(&self) -> Self {
        Self {
            source_id: self.target_id.clone(),
            target_id: self.source_id.clone(),
            link_type: self.link_type,
            strength: self.strength,
            reason: format!("Bidirectional: {}", self.reason),
            bidirectional: self.bidirectional,
        }
    }

    /// Whether `id` is either end of this link.
    pub fn touches(&self, id: &str) -> bool {
        self.source_id == id || self.target_id == id
    }
}

/// Detached copy of the whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: BTreeMap<String, ContentItem>,
    pub links: Vec<KnowledgeLink>,
    pub clusters: Vec<Vec<String>>,
}

/// Summary counts of the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub link_count: usize,
    /// `link_count / node_count`, or 0 for an empty graph.
    pub average_links_per_node: f64,
    pub link_types: BTreeMap<LinkType, usize>,
}
