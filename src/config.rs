//! Engine configuration: ontology vocabulary and edge-label rules.
//!
//! The defaults match the KaBOB conventions (OBO `IAO_0000219` "denotes" marker,
//! `owl:Restriction` axioms, `ccp`/`obo` namespaces). Everything can be overridden
//! from a TOML file:
//!
//! ```toml
//! [vocabulary]
//! denotes_marker = "IAO_0000219"
//!
//! [[label_rules]]
//! pattern = "go:"
//! matcher = "prefix"
//! priority = 0
//! ```

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(owl_nets::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(owl_nets::config::parse),
        help("Check the TOML syntax. Parser said: {message}")
    )]
    Parse { path: String, message: String },

    #[error("invalid config: {message}")]
    #[diagnostic(
        code(owl_nets::config::invalid),
        help("Vocabulary terms and label rule patterns must be non-empty.")
    )]
    Invalid { message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Predicates and classes the abstraction recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Substring identifying the "denotes" marker predicate.
    #[serde(default = "default_denotes_marker")]
    pub denotes_marker: String,
    /// Predicates whose subject is accepted directly as an entity node.
    #[serde(default = "default_label_predicates")]
    pub label_predicates: Vec<String>,
    /// The `rdf:type` predicate.
    #[serde(default = "default_type_predicate")]
    pub type_predicate: String,
    /// The class marking restriction nodes.
    #[serde(default = "default_restriction_class")]
    pub restriction_class: String,
    /// Predicate used in generated label placeholder patterns.
    #[serde(default = "default_label_predicate")]
    pub label_predicate: String,
    /// Suffix of the label variable generated per entity variable.
    #[serde(default = "default_node_label_suffix")]
    pub node_label_suffix: String,
    /// Suffix of the label variable generated per edge concept.
    #[serde(default = "default_edge_label_suffix")]
    pub edge_label_suffix: String,
}

fn default_denotes_marker() -> String {
    "IAO_0000219".into()
}
fn default_label_predicates() -> Vec<String> {
    vec!["rdfs:label".into(), "dcterms:title".into()]
}
fn default_type_predicate() -> String {
    "rdf:type".into()
}
fn default_restriction_class() -> String {
    "owl:Restriction".into()
}
fn default_label_predicate() -> String {
    "rdfs:label".into()
}
fn default_node_label_suffix() -> String {
    "_name".into()
}
fn default_edge_label_suffix() -> String {
    "_Name".into()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            denotes_marker: default_denotes_marker(),
            label_predicates: default_label_predicates(),
            type_predicate: default_type_predicate(),
            restriction_class: default_restriction_class(),
            label_predicate: default_label_predicate(),
            node_label_suffix: default_node_label_suffix(),
            edge_label_suffix: default_edge_label_suffix(),
        }
    }
}

impl Vocabulary {
    /// Whether `predicate` is the "denotes" marker.
    pub fn is_marker(&self, predicate: &str) -> bool {
        predicate.contains(&self.denotes_marker)
    }

    /// Whether `predicate` is one of the direct entity label predicates.
    pub fn is_label_predicate(&self, predicate: &str) -> bool {
        self.label_predicates.iter().any(|p| p == predicate)
    }

    /// Whether `predicate object` declares its subject a restriction.
    pub fn is_restriction_type(&self, predicate: &str, object: &str) -> bool {
        predicate == self.type_predicate && object == self.restriction_class
    }
}

/// How a [`LabelRule`] pattern is matched against a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMatch {
    /// The concept starts with the pattern.
    Prefix,
    /// The concept contains the pattern, ignoring ASCII case.
    Contains,
}

/// One entry of the edge-label priority table. Lower priority wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRule {
    pub pattern: String,
    pub matcher: PatternMatch,
    pub priority: u32,
}

impl LabelRule {
    pub fn new(pattern: impl Into<String>, matcher: PatternMatch, priority: u32) -> Self {
        Self {
            pattern: pattern.into(),
            matcher,
            priority,
        }
    }

    /// Whether this rule accepts `concept`.
    pub fn matches(&self, concept: &str) -> bool {
        match self.matcher {
            PatternMatch::Prefix => concept.starts_with(&self.pattern),
            PatternMatch::Contains => concept
                .to_ascii_lowercase()
                .contains(&self.pattern.to_ascii_lowercase()),
        }
    }
}

fn default_label_rules() -> Vec<LabelRule> {
    vec![
        // extension ontology concepts, e.g. ccp_obo_ext:GO_MI_EXT_binding_or_direct_interaction
        LabelRule::new("ccp", PatternMatch::Prefix, 1),
        LabelRule::new("obo", PatternMatch::Prefix, 2),
        LabelRule::new("schema", PatternMatch::Contains, 3),
    ]
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetsConfig {
    #[serde(default)]
    pub vocabulary: Vocabulary,
    #[serde(default = "default_label_rules")]
    pub label_rules: Vec<LabelRule>,
}

impl Default for NetsConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            label_rules: default_label_rules(),
        }
    }
}

impl NetsConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Reject vocabularies that would match every statement.
    pub fn validate(&self) -> ConfigResult<()> {
        let vocab = &self.vocabulary;
        for (name, term) in [
            ("denotes_marker", &vocab.denotes_marker),
            ("type_predicate", &vocab.type_predicate),
            ("restriction_class", &vocab.restriction_class),
            ("label_predicate", &vocab.label_predicate),
        ] {
            if term.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("vocabulary.{name} is empty"),
                });
            }
        }
        if let Some(rule) = self.label_rules.iter().find(|r| r.pattern.is_empty()) {
            return Err(ConfigError::Invalid {
                message: format!("label rule with priority {} has an empty pattern", rule.priority),
            });
        }
        Ok(())
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }
}
