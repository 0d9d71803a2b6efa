//! Instance-level OWL representation.
//!
//! The non-abstracted counterpart of the NETS graph: every query pattern is
//! instantiated once per result row, so restriction and class nodes stay in the
//! graph. Useful for comparing the abstraction against its source.

use std::collections::HashMap;
use std::path::Path;

use petgraph::algo::connected_components;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::bindings::{QueryResults, resolve};
use crate::config::Vocabulary;
use crate::error::ExportError;
use crate::export::{dot_label, write_dot};
use crate::graph::{Triple, variable_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwlNodeAttributes {
    /// Variable name the value came from, or the constant itself.
    #[serde(rename = "type")]
    pub node_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwlEdgeAttributes {
    pub predicate: String,
    /// The source pattern as `s-p-o`.
    pub triple: String,
}

/// Statement graph over concrete values.
#[derive(Debug, Clone, Default)]
pub struct OwlGraph {
    graph: DiGraph<(String, OwlNodeAttributes), OwlEdgeAttributes>,
    node_index: HashMap<String, NodeIndex>,
}

impl OwlGraph {
    fn upsert_node(&mut self, name: &str, attributes: OwlNodeAttributes) -> NodeIndex {
        match self.node_index.get(name) {
            Some(&idx) => {
                self.graph[idx].1 = attributes;
                idx
            }
            None => {
                let idx = self.graph.add_node((name.to_string(), attributes));
                self.node_index.insert(name.to_string(), idx);
                idx
            }
        }
    }

    pub fn node(&self, name: &str) -> Option<&OwlNodeAttributes> {
        self.node_index.get(name).map(|&idx| &self.graph[idx].1)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&OwlEdgeAttributes> {
        let s = *self.node_index.get(source)?;
        let t = *self.node_index.get(target)?;
        self.graph.find_edge(s, t).map(|e| &self.graph[e])
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Graphviz rendering: nodes show their value, edges their predicate.
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, edge| dot_label(&edge.weight().predicate),
            &|_, (_, (name, _))| dot_label(name),
        );
        format!("{dot:?}")
    }

    pub fn write_dot(&self, path: &Path) -> Result<(), ExportError> {
        write_dot(path, &self.to_dot())
    }

    pub fn to_document(&self) -> OwlDocument {
        OwlDocument {
            nodes: self.graph.node_weights().cloned().collect(),
            edges: self
                .graph
                .edge_references()
                .map(|e| {
                    (
                        self.graph[e.source()].0.clone(),
                        self.graph[e.target()].0.clone(),
                        e.weight().clone(),
                    )
                })
                .collect(),
        }
    }
}

/// Serialized OWL graph: `{"nodes": [[id, attrs]], "edges": [[s, t, attrs]]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwlDocument {
    pub nodes: Vec<(String, OwlNodeAttributes)>,
    pub edges: Vec<(String, String, OwlEdgeAttributes)>,
}

impl OwlDocument {
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialization {
            message: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

fn term_type(term: &str) -> String {
    if term.starts_with('?') {
        variable_name(term).to_string()
    } else {
        term.to_string()
    }
}

/// Instantiate the query patterns for every result row.
///
/// Label statements are left out. A pattern with an unbound variable in a row
/// is skipped for that row.
pub fn owl_graph(triples: &[Triple], results: &QueryResults, vocab: &Vocabulary) -> OwlGraph {
    let patterns: Vec<&Triple> = triples
        .iter()
        .filter(|t| !vocab.is_label_predicate(&t.predicate))
        .collect();
    let mut owl = OwlGraph::default();

    for row in results.rows() {
        for pattern in &patterns {
            let (Some(subject), Some(object)) =
                (resolve(row, &pattern.subject), resolve(row, &pattern.object))
            else {
                continue;
            };
            let s = owl.upsert_node(
                subject,
                OwlNodeAttributes {
                    node_type: term_type(&pattern.subject),
                },
            );
            let o = owl.upsert_node(
                object,
                OwlNodeAttributes {
                    node_type: term_type(&pattern.object),
                },
            );
            owl.graph.update_edge(
                s,
                o,
                OwlEdgeAttributes {
                    predicate: pattern.predicate.clone(),
                    triple: format!("{}-{}-{}", pattern.subject, pattern.predicate, pattern.object),
                },
            );
        }
    }

    tracing::info!(
        nodes = owl.node_count(),
        edges = owl.edge_count(),
        components = owl.component_count(),
        "built OWL representation graph"
    );
    owl
}
