//! Discovery orchestrator: concurrent fan-out, dedup, merge, metrics.
//!
//! This module fans a query out to every enabled source concurrently,
//! isolates per-source failures and timeouts, deduplicates by normalised
//! URL, merges under a [`crate::types::MergeStrategy`], and reports quality
//! and performance metrics.

pub mod coordinator;
pub mod dedup;
pub mod fanout;
pub mod merge;
pub mod metrics;
pub mod quality;
pub mod url_normalize;

pub use coordinator::SourceCoordinator;
