//! In-memory statement graph backed by petgraph.
//!
//! Nodes are query terms, edges carry the predicate. The graph is a simple
//! directed graph: one edge per ordered (subject, object) pair.

use std::collections::HashMap;

use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::GraphError;

use super::Triple;

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Directed graph of query statements.
///
/// Built once by [`StatementGraph::from_triples`] and read-only afterward.
/// Iteration over nodes and edges follows insertion order, which is the order
/// of the query's triples.
#[derive(Debug, Clone, Default)]
pub struct StatementGraph {
    /// Nodes are terms, edges are predicates.
    graph: DiGraph<String, String>,
    /// Term → NodeIndex mapping for O(1) node lookups.
    node_index: HashMap<String, NodeIndex>,
}

impl StatementGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate the statement graph for a query.
    ///
    /// Fails when there are no triples, when the graph splits into more than one
    /// (weakly) connected component, or when two triples share a
    /// (subject, object) pair so that the edge count differs from the triple count.
    pub fn from_triples(triples: &[Triple]) -> GraphResult<Self> {
        if triples.is_empty() {
            return Err(GraphError::EmptyQuery);
        }

        let mut graph = Self::new();
        let mut collision: Option<(Triple, String)> = None;
        for triple in triples {
            if let Some(kept) = graph.insert_triple(triple) {
                tracing::warn!(
                    subject = %triple.subject,
                    object = %triple.object,
                    kept = %kept,
                    dropped = %triple.predicate,
                    "triples collapse onto the same node pair"
                );
                collision.get_or_insert((triple.clone(), kept));
            }
        }

        let components = graph.component_count();
        if components != 1 {
            return Err(GraphError::Disconnected { components });
        }

        if graph.edge_count() != triples.len() {
            let (dropped, kept) = collision.unwrap_or_else(|| {
                (Triple::new(String::new(), String::new(), String::new()), String::new())
            });
            return Err(GraphError::CountMismatch {
                triples: triples.len(),
                edges: graph.edge_count(),
                subject: dropped.subject,
                object: dropped.object,
                kept,
                dropped: dropped.predicate,
            });
        }

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built statement graph"
        );
        Ok(graph)
    }

    /// Wrap an already-built petgraph graph, rebuilding the term index.
    pub(crate) fn from_graph(graph: DiGraph<String, String>) -> Self {
        let node_index = graph
            .node_indices()
            .map(|idx| (graph[idx].clone(), idx))
            .collect();
        Self { graph, node_index }
    }

    /// Ensure a node exists for the given term, returning its NodeIndex.
    fn ensure_node(&mut self, term: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(term) {
            return idx;
        }
        let idx = self.graph.add_node(term.to_string());
        self.node_index.insert(term.to_string(), idx);
        idx
    }

    /// Insert a triple. If the (subject, object) pair already has an edge the
    /// triple is not added and the existing predicate is returned.
    fn insert_triple(&mut self, triple: &Triple) -> Option<String> {
        let subj_idx = self.ensure_node(&triple.subject);
        let obj_idx = self.ensure_node(&triple.object);

        if let Some(edge) = self.graph.find_edge(subj_idx, obj_idx) {
            return Some(self.graph[edge].clone());
        }
        self.graph
            .add_edge(subj_idx, obj_idx, triple.predicate.clone());
        None
    }

    /// Number of weakly connected components.
    pub fn component_count(&self) -> usize {
        connected_components(&self.graph)
    }

    /// Check if a node exists.
    pub fn has_node(&self, term: &str) -> bool {
        self.node_index.contains_key(term)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges (one per retained triple).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node terms, in insertion order.
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// All triples, in insertion order.
    pub fn triples(&self) -> Vec<Triple> {
        self.graph
            .edge_references()
            .map(|e| self.edge_triple(e.source(), e.weight(), e.target()))
            .collect()
    }

    /// Number of outgoing edges of `term` (0 for unknown terms).
    pub fn out_degree(&self, term: &str) -> usize {
        self.node_index
            .get(term)
            .map(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Outgoing)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Get all triples where `term` appears as subject, in insertion order.
    pub fn triples_from(&self, term: &str) -> Vec<Triple> {
        self.directed(term, Direction::Outgoing)
    }

    /// Get all triples where `term` appears as object, in insertion order.
    pub fn triples_to(&self, term: &str) -> Vec<Triple> {
        self.directed(term, Direction::Incoming)
    }

    fn directed(&self, term: &str, direction: Direction) -> Vec<Triple> {
        let Some(&idx) = self.node_index.get(term) else {
            return vec![];
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        // petgraph walks adjacency lists newest-first
        edges.sort_by_key(|e| e.id().index());
        edges
            .into_iter()
            .map(|e| self.edge_triple(e.source(), e.weight(), e.target()))
            .collect()
    }

    fn edge_triple(&self, source: NodeIndex, predicate: &str, target: NodeIndex) -> Triple {
        Triple::new(
            self.graph[source].as_str(),
            predicate,
            self.graph[target].as_str(),
        )
    }

    pub(crate) fn index_of(&self, term: &str) -> Option<NodeIndex> {
        self.node_index.get(term).copied()
    }

    pub(crate) fn term(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub(crate) fn graph(&self) -> &DiGraph<String, String> {
        &self.graph
    }
}
