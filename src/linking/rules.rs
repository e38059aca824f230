//! Technology and topic relation tables.
//!
//! Dependency rules say "learn `from` before `to`"; hierarchy rules say
//! "`from` is the broader topic containing `to`". The tables are plain data
//! and can be replaced from TOML:
//!
//! ```toml
//! [[rules]]
//! from = "rust"
//! to = "tokio"
//! strength = 0.8
//! kind = "dependency"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CuratorError, Result};

/// Which relationship a rule produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Dependency,
    Hierarchy,
}

/// One directed relation between two terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRule {
    pub from: String,
    pub to: String,
    pub strength: f64,
    pub kind: RuleKind,
}

impl RelationRule {
    pub fn dependency(from: &str, to: &str, strength: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            strength,
            kind: RuleKind::Dependency,
        }
    }

    pub fn hierarchy(from: &str, to: &str, strength: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            strength,
            kind: RuleKind::Hierarchy,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(CuratorError::Config(
                "relation rule terms must not be empty".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(CuratorError::Config(format!(
                "relation rule {} -> {} has strength {} outside [0, 1]",
                self.from, self.to, self.strength
            )));
        }
        Ok(())
    }
}

/// A validated rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRules {
    rules: Vec<RelationRule>,
}

#[derive(Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<RelationRule>,
}

const FRAMEWORK_STRENGTH: f64 = 0.7;
const TOPIC_STRENGTH: f64 = 0.7;

impl RelationRules {
    /// Build a table, rejecting empty terms and strengths outside `[0, 1]`.
    /// Terms are stored lowercase.
    pub fn new(rules: Vec<RelationRule>) -> Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                rule.validate()?;
                Ok(RelationRule {
                    from: rule.from.trim().to_lowercase(),
                    to: rule.to.trim().to_lowercase(),
                    ..rule
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// The shipped technology and topic tables.
    pub fn builtin() -> Self {
        let dependencies = [
            ("html", "css", 0.6),
            ("html", "javascript", 0.6),
            ("javascript", "react", 0.8),
            ("javascript", "vue", 0.8),
            ("javascript", "angular", 0.7),
            ("javascript", "node.js", 0.7),
            ("python", "django", 0.8),
            ("python", "flask", 0.8),
            ("python", "pandas", 0.7),
            ("rust", "tokio", 0.8),
            ("rust", "axum", 0.7),
            ("java", "spring", 0.8),
            ("sql", "postgresql", 0.6),
            ("git", "github", 0.6),
            ("docker", "kubernetes", 0.8),
            ("linux", "docker", 0.5),
            ("statistics", "machine learning", 0.7),
        ];
        let frameworks = [
            ("react", "next.js"),
            ("vue", "nuxt"),
            ("node.js", "express"),
            ("svelte", "sveltekit"),
        ];
        let topics = [
            ("web development", "frontend"),
            ("web development", "backend"),
            ("databases", "sql"),
            ("devops", "docker"),
            ("artificial intelligence", "machine learning"),
            ("machine learning", "deep learning"),
        ];

        let rules = dependencies
            .into_iter()
            .map(|(from, to, strength)| RelationRule::dependency(from, to, strength))
            .chain(
                frameworks
                    .into_iter()
                    .map(|(from, to)| RelationRule::hierarchy(from, to, FRAMEWORK_STRENGTH)),
            )
            .chain(
                topics
                    .into_iter()
                    .map(|(from, to)| RelationRule::hierarchy(from, to, TOPIC_STRENGTH)),
            )
            .chain(std::iter::once(RelationRule::hierarchy(
                "javascript",
                "typescript",
                0.8,
            )))
            .collect();
        Self { rules }
    }

    /// Parse a `[[rules]]` table from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`CuratorError::Config`] for malformed TOML or invalid rules.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RulesFile =
            toml::from_str(content).map_err(|e| CuratorError::Config(e.to_string()))?;
        Self::new(file.rules)
    }

    /// Load a `[[rules]]` table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelationRule> {
        self.rules.iter()
    }

    pub fn of_kind(&self, kind: RuleKind) -> impl Iterator<Item = &RelationRule> {
        self.rules.iter().filter(move |r| r.kind == kind)
    }

    /// Every distinct term named by a rule, in first-seen order.
    pub fn vocabulary(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for rule in &self.rules {
            for term in [&rule.from, &rule.to] {
                if !terms.contains(term) {
                    terms.push(term.clone());
                }
            }
        }
        terms
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RelationRules {
    fn default() -> Self {
        Self::builtin()
    }
}
