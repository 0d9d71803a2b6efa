//! NETS graph assembly.
//!
//! Every result row instantiates every oriented edge: both endpoint values are
//! looked up in the entity records, each becomes a node named by its shortest
//! label, and a directed edge is drawn between the two names. Adding a node or
//! edge that already exists overwrites its attributes.

use std::collections::HashMap;
use std::path::Path;

use petgraph::algo::connected_components;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::bindings::{QueryResults, value};
use crate::error::ExportError;
use crate::export::{dot_label, write_dot};
use crate::graph::variable_name;
use crate::provenance::EdgeProvenance;
use crate::records::EntityRecords;

/// Attributes of a NETS node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Every label seen for the entity, paired with `id`.
    pub labels: Vec<String>,
    /// External identifiers, paired with `labels`.
    pub id: Vec<String>,
    /// The raw bound value.
    pub bio: String,
    /// Entity variables the value was bound to, joined by `-`.
    #[serde(rename = "type")]
    pub entity_type: String,
}

/// Attributes of a NETS edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeAttributes {
    /// Human-readable relation label, when a label source was found and bound.
    pub labels: Option<String>,
    /// Ontology concept linking the endpoints.
    pub id: Option<String>,
    /// `subjectVar-objectVar`.
    pub edge: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NetsNode {
    name: String,
    attributes: NodeAttributes,
}

/// The abstracted entity graph.
///
/// Nodes are keyed by display label. Iteration follows first insertion.
#[derive(Debug, Clone, Default)]
pub struct NetsGraph {
    graph: DiGraph<NetsNode, EdgeAttributes>,
    node_index: HashMap<String, NodeIndex>,
}

impl NetsGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node or overwrite the attributes of an existing one.
    pub fn upsert_node(&mut self, name: &str, attributes: NodeAttributes) {
        match self.node_index.get(name) {
            Some(&idx) => self.graph[idx].attributes = attributes,
            None => {
                let idx = self.graph.add_node(NetsNode {
                    name: name.to_string(),
                    attributes,
                });
                self.node_index.insert(name.to_string(), idx);
            }
        }
    }

    /// Insert an edge or overwrite the attributes of an existing one.
    /// Missing endpoints are created with empty attributes.
    pub fn upsert_edge(&mut self, source: &str, target: &str, attributes: EdgeAttributes) {
        let s = self.ensure_node(source);
        let t = self.ensure_node(target);
        self.graph.update_edge(s, t, attributes);
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        self.upsert_node(name, NodeAttributes::default());
        self.node_index[name]
    }

    pub fn node(&self, name: &str) -> Option<&NodeAttributes> {
        self.node_index
            .get(name)
            .map(|&idx| &self.graph[idx].attributes)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeAttributes> {
        let s = *self.node_index.get(source)?;
        let t = *self.node_index.get(target)?;
        self.graph.find_edge(s, t).map(|e| &self.graph[e])
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, &NodeAttributes)> {
        self.graph
            .node_weights()
            .map(|n| (n.name.as_str(), &n.attributes))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, &EdgeAttributes)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].name.as_str(),
                self.graph[e.target()].name.as_str(),
                e.weight(),
            )
        })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of weakly connected components.
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Graphviz rendering. Nodes show their name; edges show the relation
    /// label, falling back to the ontology id and then the edge type.
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, edge| {
                let attrs = edge.weight();
                let label = attrs
                    .labels
                    .as_deref()
                    .or(attrs.id.as_deref())
                    .unwrap_or(&attrs.edge);
                dot_label(label)
            },
            &|_, (_, node)| dot_label(&node.name),
        );
        format!("{dot:?}")
    }

    pub fn write_dot(&self, path: &Path) -> Result<(), ExportError> {
        write_dot(path, &self.to_dot())
    }
}

/// Build the NETS graph from result rows.
///
/// Rows leaving an endpoint unbound, or binding a value without a record, are
/// skipped for that edge.
pub fn assemble(
    results: &QueryResults,
    provenance: &[EdgeProvenance],
    records: &EntityRecords,
) -> NetsGraph {
    let mut nets = NetsGraph::new();
    let mut skipped = 0usize;

    for row in results.rows() {
        for edge in provenance {
            let subject = &edge.edge.subject;
            let object = &edge.edge.object;
            let (Some(s_value), Some(o_value)) = (value(row, subject), value(row, object)) else {
                skipped += 1;
                continue;
            };
            let (Some(s_record), Some(o_record)) =
                (records.record(subject, s_value), records.record(object, o_value))
            else {
                skipped += 1;
                continue;
            };
            let s_name = s_record.display_label().unwrap_or(s_value);
            let o_name = o_record.display_label().unwrap_or(o_value);

            nets.upsert_node(
                s_name,
                NodeAttributes {
                    labels: s_record.labels.clone(),
                    id: s_record.ids.clone(),
                    bio: s_value.to_string(),
                    entity_type: records.entity_type(s_value),
                },
            );
            nets.upsert_node(
                o_name,
                NodeAttributes {
                    labels: o_record.labels.clone(),
                    id: o_record.ids.clone(),
                    bio: o_value.to_string(),
                    entity_type: records.entity_type(o_value),
                },
            );
            nets.upsert_edge(
                s_name,
                o_name,
                EdgeAttributes {
                    labels: edge
                        .label
                        .as_ref()
                        .and_then(|l| value(row, &l.variable))
                        .map(str::to_string),
                    id: edge.ontology_id().map(|c| variable_name(c).to_string()),
                    edge: format!("{}-{}", variable_name(subject), variable_name(object)),
                },
            );
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "row/edge combinations skipped for unbound endpoints");
    }
    tracing::info!(
        nodes = nets.node_count(),
        edges = nets.edge_count(),
        components = nets.component_count(),
        "assembled NETS graph"
    );
    nets
}
