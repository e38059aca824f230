//! Discovery and linking wired together.

use curator_sources::{DiscoveryOptions, MergeStrategy, SourceCoordinator, SourcedContentResult};

use crate::config::{LinkOptions, LinkingConfig};
use crate::error::Result;
use crate::graph::KnowledgeLink;
use crate::linking::KnowledgeLinker;

/// Output of one [`Curator::curate`] call.
#[derive(Debug, Clone)]
pub struct CurationOutcome {
    /// Merged discovery result.
    pub result: SourcedContentResult,
    /// Every link created while inserting the result items, in order.
    pub links: Vec<KnowledgeLink>,
}

/// Runs multi-source discovery and feeds the results into the knowledge
/// graph.
#[derive(Debug)]
pub struct Curator {
    coordinator: SourceCoordinator,
    linker: KnowledgeLinker,
}

impl Curator {
    pub fn new(coordinator: SourceCoordinator, linker: KnowledgeLinker) -> Self {
        Self {
            coordinator,
            linker,
        }
    }

    /// Build from a linking settings file's rule table.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CuratorError::Config`] if the configured rules are invalid.
    pub fn from_config(coordinator: SourceCoordinator, config: &LinkingConfig) -> Result<Self> {
        Ok(Self::new(
            coordinator,
            KnowledgeLinker::with_rules(config.relation_rules()?),
        ))
    }

    /// Discover content for `query`, then link every returned item in
    /// result order.
    ///
    /// Discovery completes before linking starts.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CuratorError::Sources`] when discovery fails as a
    /// whole, e.g. no source is enabled. The graph is untouched in that case.
    pub async fn curate(
        &mut self,
        query: &str,
        options: &DiscoveryOptions,
        strategy: MergeStrategy,
        link_options: &LinkOptions,
    ) -> Result<CurationOutcome> {
        let result = self
            .coordinator
            .discover_from_multiple_sources(query, options, strategy)
            .await?;

        let mut links = Vec::new();
        for item in &result.items {
            links.extend(self.linker.add_content(item.clone(), link_options));
        }
        tracing::debug!(
            items = result.items.len(),
            links = links.len(),
            "curation complete"
        );

        Ok(CurationOutcome { result, links })
    }

    pub fn coordinator(&self) -> &SourceCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut SourceCoordinator {
        &mut self.coordinator
    }

    pub fn linker(&self) -> &KnowledgeLinker {
        &self.linker
    }

    pub fn linker_mut(&mut self) -> &mut KnowledgeLinker {
        &mut self.linker
    }
}
