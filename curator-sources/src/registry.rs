//! Source registry: connector plus configuration per source identifier.
//!
//! Sources are kept in identifier order. That order is the fan-out order,
//! which in turn decides which duplicate wins deduplication and the order
//! of sources in round-robin merging.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{CoordinatorSettings, SourceConfig, SourceConfigUpdate};
use crate::connector::SourceConnector;
use crate::error::SourceError;

/// A connector together with its configuration.
#[derive(Clone)]
pub struct RegisteredSource {
    pub connector: Arc<dyn SourceConnector>,
    pub config: SourceConfig,
}

impl std::fmt::Debug for RegisteredSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Holds every known source, enabled or not.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: BTreeMap<String, RegisteredSource>,
}

impl SourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if `config` fails validation.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        connector: Arc<dyn SourceConnector>,
        config: SourceConfig,
    ) -> Result<(), SourceError> {
        config.validate()?;
        let id = id.into();
        tracing::debug!(source = %id, enabled = config.enabled, "registering source");
        self.sources
            .insert(id, RegisteredSource { connector, config });
        Ok(())
    }

    /// Remove a source. Returns `true` if it was registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.sources.remove(id).is_some()
    }

    /// Merge a partial update into a source's configuration.
    ///
    /// The merged config is validated before it replaces the old one, so a
    /// rejected update leaves the source unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnknownSource`] for unregistered ids and
    /// [`SourceError::Config`] if the merged config is invalid.
    pub fn update_config(
        &mut self,
        id: &str,
        update: &SourceConfigUpdate,
    ) -> Result<&SourceConfig, SourceError> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| SourceError::UnknownSource(id.to_string()))?;
        let merged = source.config.merged(update);
        merged.validate()?;
        source.config = merged;
        Ok(&source.config)
    }

    /// Enable or disable a source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::UnknownSource`] for unregistered ids.
    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> Result<(), SourceError> {
        self.update_config(
            id,
            &SourceConfigUpdate {
                enabled: Some(enabled),
                ..Default::default()
            },
        )
        .map(|_| ())
    }

    /// Apply per-source updates from a settings file.
    ///
    /// Entries naming sources that are not registered are skipped with a
    /// warning; the first invalid update aborts with an error.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if a merged config is invalid.
    pub fn apply_settings(&mut self, settings: &CoordinatorSettings) -> Result<(), SourceError> {
        for (id, update) in &settings.sources {
            match self.update_config(id, update) {
                Ok(_) => {}
                Err(SourceError::UnknownSource(_)) => {
                    tracing::warn!(source = %id, "settings name an unregistered source, skipping");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Configuration of a source, if registered.
    pub fn config(&self, id: &str) -> Option<&SourceConfig> {
        self.sources.get(id).map(|s| &s.config)
    }

    /// Look up a registered source.
    pub fn get(&self, id: &str) -> Option<&RegisteredSource> {
        self.sources.get(id)
    }

    /// All registered identifiers, in registry order.
    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    /// Enabled sources, in registry order.
    pub fn enabled_sources(&self) -> impl Iterator<Item = (&str, &RegisteredSource)> {
        self.sources
            .iter()
            .filter(|(_, s)| s.config.enabled)
            .map(|(id, s)| (id.as_str(), s))
    }

    /// Number of registered sources, enabled or not.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscoveryOptions, DiscoveryResponse};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct EmptyConnector;

    #[async_trait]
    impl SourceConnector for EmptyConnector {
        async fn discover(
            &self,
            _query: &str,
            _options: &DiscoveryOptions,
            _cancel: CancellationToken,
        ) -> Result<DiscoveryResponse, SourceError> {
            Ok(DiscoveryResponse::default())
        }
    }

    fn registry_with(ids: &[&str]) -> SourceRegistry {
        let mut registry = SourceRegistry::new();
        for id in ids {
            registry
                .register(*id, Arc::new(EmptyConnector), SourceConfig::default())
                .expect("register");
        }
        registry
    }

    #[test]
    fn register_rejects_invalid_config() {
        let mut registry = SourceRegistry::new();
        let err = registry
            .register(
                "bad",
                Arc::new(EmptyConnector),
                SourceConfig {
                    timeout_ms: 0,
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn sources_iterate_in_id_order() {
        let registry = registry_with(&["zeta", "alpha", "mid"]);
        let ids: Vec<&str> = registry.source_ids().collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn update_is_a_partial_merge() {
        let mut registry = registry_with(&["docs"]);
        registry
            .update_config(
                "docs",
                &SourceConfigUpdate {
                    reliability_weight: Some(0.9),
                    ..Default::default()
                },
            )
            .expect("update");
        let config = registry.config("docs").expect("registered");
        assert!((config.reliability_weight - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.max_results, SourceConfig::default().max_results);
        assert_eq!(config.timeout_ms, SourceConfig::default().timeout_ms);
    }

    #[test]
    fn invalid_update_leaves_config_unchanged() {
        let mut registry = registry_with(&["docs"]);
        let err = registry
            .update_config(
                "docs",
                &SourceConfigUpdate {
                    reliability_weight: Some(-0.1),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, SourceError::Config(_)));
        assert_eq!(registry.config("docs"), Some(&SourceConfig::default()));
    }

    #[test]
    fn update_unknown_source_fails() {
        let mut registry = SourceRegistry::new();
        let err = registry
            .update_config("ghost", &SourceConfigUpdate::default())
            .unwrap_err();
        assert!(matches!(err, SourceError::UnknownSource(ref id) if id == "ghost"));
    }

    #[test]
    fn disabled_sources_not_listed_as_enabled() {
        let mut registry = registry_with(&["a", "b"]);
        registry.set_enabled("a", false).expect("disable");
        let enabled: Vec<&str> = registry.enabled_sources().map(|(id, _)| id).collect();
        assert_eq!(enabled, vec!["b"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn unregister_removes_source() {
        let mut registry = registry_with(&["a"]);
        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert!(registry.is_empty());
    }

    #[test]
    fn apply_settings_skips_unknown_sources() {
        let mut registry = registry_with(&["docs"]);
        let settings = CoordinatorSettings::from_toml_str(
            r#"
[sources.docs]
timeout_ms = 250

[sources.unknown]
enabled = false
"#,
        )
        .expect("parse");
        registry.apply_settings(&settings).expect("apply");
        assert_eq!(registry.config("docs").map(|c| c.timeout_ms), Some(250));
        assert!(registry.config("unknown").is_none());
    }
}
