//! Structural projection of the statement graph.
//!
//! Leaf terms (literals, class names, label variables) carry no further path
//! structure and would only create shortcuts between entity nodes. The projection
//! keeps every node with outgoing edges plus the entity nodes themselves.

use crate::classify::EntitySet;

use super::StatementGraph;

/// Induced subgraph over nodes with out-degree > 0 or entity status.
pub fn project(graph: &StatementGraph, entities: &EntitySet) -> StatementGraph {
    let inner = graph.graph();
    let projected = inner.filter_map(
        |idx, term| {
            let keep = inner.neighbors_directed(idx, petgraph::Direction::Outgoing).next().is_some()
                || entities.contains(term);
            keep.then(|| term.clone())
        },
        |_, predicate| Some(predicate.clone()),
    );

    let projected = StatementGraph::from_graph(projected);
    tracing::debug!(
        kept = projected.node_count(),
        dropped = graph.node_count() - projected.node_count(),
        "projected statement graph"
    );
    projected
}
