//! Relationship detection and the knowledge linker.

pub mod detector;
pub mod linker;
pub mod rules;
pub mod text;

pub use detector::{RelationshipDetector, select_links};
pub use linker::KnowledgeLinker;
pub use rules::{RelationRule, RelationRules, RuleKind};
