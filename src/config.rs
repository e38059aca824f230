//! Linking configuration.
//!
//! [`LinkOptions`] tunes how many links each insertion keeps.
//! [`LinkingConfig`] is the on-disk form, usually `linking.toml`:
//!
//! ```toml
//! [options]
//! min_link_strength = 0.4
//! max_links_per_content = 5
//! link_types = ["similar", "dependency"]
//!
//! [[rules]]
//! from = "rust"
//! to = "tokio"
//! strength = 0.8
//! kind = "dependency"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CuratorError, Result};
use crate::graph::LinkType;
use crate::linking::{RelationRule, RelationRules};

const DEFAULT_MIN_LINK_STRENGTH: f64 = 0.3;

/// Per-insertion link filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Candidates weaker than this are dropped.
    pub min_link_strength: f64,
    /// Upper bound on links returned by one insertion, mirrors included.
    pub max_links_per_content: usize,
    /// Materialise the reverse direction of bidirectional links.
    pub enable_bidirectional: bool,
    /// Allow-list of link types; `None` allows every type.
    pub link_types: Option<Vec<LinkType>>,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            min_link_strength: DEFAULT_MIN_LINK_STRENGTH,
            max_links_per_content: 10,
            enable_bidirectional: true,
            link_types: None,
        }
    }
}

impl LinkOptions {
    /// Validates these options.
    ///
    /// Checks:
    /// - `min_link_strength` must lie in `[0, 1]`
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_link_strength) {
            return Err(CuratorError::Config(format!(
                "min_link_strength must be within [0, 1], got {}",
                self.min_link_strength
            )));
        }
        Ok(())
    }

    /// The threshold actually applied: `min_link_strength` when it is a
    /// value in `[0, 1]`, otherwise the default 0.3. A NaN threshold would
    /// let every candidate through.
    pub fn effective_min_strength(&self) -> f64 {
        if (0.0..=1.0).contains(&self.min_link_strength) {
            self.min_link_strength
        } else {
            DEFAULT_MIN_LINK_STRENGTH
        }
    }

    /// Whether `link_type` passes the allow-list.
    pub fn allows(&self, link_type: LinkType) -> bool {
        self.link_types
            .as_ref()
            .is_none_or(|types| types.contains(&link_type))
    }
}

/// Linking settings file: default options plus an optional rule table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkingConfig {
    pub options: LinkOptions,
    /// Replaces the builtin relation rules when present.
    pub rules: Option<Vec<RelationRule>>,
}

impl LinkingConfig {
    /// Parse and validate linking settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CuratorError::Config`] for malformed TOML or invalid options.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CuratorError::Config(e.to_string()))?;
        config.options.validate()?;
        Ok(config)
    }

    /// Load linking settings from a TOML file, falling back to defaults for
    /// missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// The configured rule table, or the builtin one.
    ///
    /// # Errors
    ///
    /// Returns [`CuratorError::Config`] if a configured rule is invalid.
    pub fn relation_rules(&self) -> Result<RelationRules> {
        match &self.rules {
            Some(rules) => RelationRules::new(rules.clone()),
            None => Ok(RelationRules::builtin()),
        }
    }
}
