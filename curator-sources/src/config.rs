//! Source configuration with sensible defaults.
//!
//! [`SourceConfig`] controls whether a source is queried, how much its
//! results are trusted, how many items it may contribute, and how long the
//! coordinator waits for it. [`CoordinatorSettings`] carries partial updates
//! for many sources at once and is usually loaded from a TOML file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::types::MergeStrategy;

/// Per-source configuration owned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Disabled sources are skipped by the fan-out.
    pub enabled: bool,
    /// Trust placed in this source's results, in `[0, 1]`.
    pub reliability_weight: f64,
    /// Maximum number of items taken from this source per call.
    pub max_results: usize,
    /// How long the coordinator waits for this source.
    pub timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reliability_weight: 0.5,
            max_results: 10,
            timeout_ms: 5_000,
        }
    }
}

impl SourceConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `reliability_weight` must lie in `[0, 1]`
    /// - `max_results` must be greater than 0
    /// - `timeout_ms` must be greater than 0
    pub fn validate(&self) -> Result<(), SourceError> {
        if !(0.0..=1.0).contains(&self.reliability_weight) {
            return Err(SourceError::Config(format!(
                "reliability_weight must be within [0, 1], got {}",
                self.reliability_weight
            )));
        }
        if self.max_results == 0 {
            return Err(SourceError::Config(
                "max_results must be greater than 0".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(SourceError::Config(
                "timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with every field set in `update` applied.
    #[must_use]
    pub fn merged(&self, update: &SourceConfigUpdate) -> Self {
        Self {
            enabled: update.enabled.unwrap_or(self.enabled),
            reliability_weight: update.reliability_weight.unwrap_or(self.reliability_weight),
            max_results: update.max_results.unwrap_or(self.max_results),
            timeout_ms: update.timeout_ms.unwrap_or(self.timeout_ms),
        }
    }
}

/// Partial update for a [`SourceConfig`]. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfigUpdate {
    pub enabled: Option<bool>,
    pub reliability_weight: Option<f64>,
    pub max_results: Option<usize>,
    pub timeout_ms: Option<u64>,
}

/// Coordinator-wide settings, typically read from `sources.toml`.
///
/// ```toml
/// default_strategy = "quality_first"
///
/// [sources.docs]
/// reliability_weight = 0.9
/// timeout_ms = 2000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorSettings {
    /// Strategy used when the caller does not pick one.
    pub default_strategy: MergeStrategy,
    /// Partial config updates keyed by source identifier.
    pub sources: BTreeMap<String, SourceConfigUpdate>,
}

impl CoordinatorSettings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the text is not valid settings TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, SourceError> {
        toml::from_str(content).map_err(|e| SourceError::Config(e.to_string()))
    }

    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SourceConfig::default();
        assert!(config.enabled);
        assert!((config.reliability_weight - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.timeout_ms, 5_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn weight_out_of_range_rejected() {
        let config = SourceConfig {
            reliability_weight: 1.5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("reliability_weight"));
    }

    #[test]
    fn zero_max_results_rejected() {
        let config = SourceConfig {
            max_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = SourceConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn merge_keeps_unspecified_fields() {
        let config = SourceConfig {
            enabled: true,
            reliability_weight: 0.8,
            max_results: 25,
            timeout_ms: 900,
        };
        let merged = config.merged(&SourceConfigUpdate {
            timeout_ms: Some(50),
            ..Default::default()
        });
        assert!(merged.enabled);
        assert!((merged.reliability_weight - 0.8).abs() < f64::EPSILON);
        assert_eq!(merged.max_results, 25);
        assert_eq!(merged.timeout_ms, 50);
    }

    #[test]
    fn settings_parse_from_toml() {
        let settings = CoordinatorSettings::from_toml_str(
            r#"
default_strategy = "round_robin"

[sources.docs]
reliability_weight = 0.9

[sources.forum]
enabled = false
"#,
        )
        .expect("parse settings");
        assert_eq!(settings.default_strategy, MergeStrategy::RoundRobin);
        assert_eq!(settings.sources.len(), 2);
        assert_eq!(settings.sources["forum"].enabled, Some(false));
        assert!(settings.sources["docs"].timeout_ms.is_none());
    }

    #[test]
    fn empty_settings_use_defaults() {
        let settings = CoordinatorSettings::from_toml_str("").expect("parse");
        assert_eq!(settings.default_strategy, MergeStrategy::WeightedMerge);
        assert!(settings.sources.is_empty());
    }

    #[test]
    fn invalid_settings_rejected() {
        let err = CoordinatorSettings::from_toml_str("default_strategy = \"fastest\"").unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
    }
}
