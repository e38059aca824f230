//! In-memory knowledge graph of content items and typed links.

pub mod store;
pub mod types;

pub use store::KnowledgeGraphStore;
pub use types::{GraphStats, KnowledgeGraph, KnowledgeLink, LinkType};
