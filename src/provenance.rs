//! Edge provenance: the original statements behind each abstracted edge.
//!
//! For every oriented edge the statements hanging off the internal nodes of the
//! path between its endpoints are retained, so the original OWL statements can be
//! rebuilt from a NETS edge. One of them is picked as the edge's label source: its
//! object is the ontology concept naming the relation (e.g. `obo:RO_0002436`),
//! whose human-readable label is bound by a placeholder pattern in the query.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::classify::EntitySet;
use crate::config::{LabelRule, NetsConfig, Vocabulary};
use crate::graph::traverse::{forward_chain, shortest_undirected_path};
use crate::graph::{StatementGraph, Triple, variable_name};
use crate::orient::OrientedEdge;

/// A placeholder pattern `concept rdfs:label ?variable` binding a concept's label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabelPattern {
    pub concept: String,
    pub predicate: String,
    pub variable: String,
}

impl LabelPattern {
    /// Label placeholder for an edge concept: `obo:RO_0002436` → `?obo_RO_0002436_Name`.
    pub fn for_concept(concept: &str, vocab: &Vocabulary) -> Self {
        let stem = concept.replace(':', "_");
        Self {
            concept: concept.to_string(),
            predicate: vocab.label_predicate.clone(),
            variable: format!("?{}{}", stem.trim_matches('?'), vocab.edge_label_suffix),
        }
    }

    pub fn to_triple(&self) -> Triple {
        Triple::new(
            self.concept.as_str(),
            self.predicate.as_str(),
            self.variable.as_str(),
        )
    }
}

/// Reconstruction data for one oriented edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeProvenance {
    pub edge: OrientedEdge,
    /// The statement whose object names the relation, if any rule matched.
    pub label_source: Option<Triple>,
    /// Placeholder binding the label of the label source's object.
    pub label: Option<LabelPattern>,
    /// Statements between the endpoints plus their forward chains, sorted.
    pub triples: Vec<Triple>,
}

impl EdgeProvenance {
    /// The ontology concept used to link the endpoints.
    pub fn ontology_id(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.concept.as_str())
    }

    /// `"subject, object"` in binding variable names.
    pub fn metadata_key(&self) -> String {
        format!(
            "{}, {}",
            variable_name(&self.edge.subject),
            variable_name(&self.edge.object)
        )
    }
}

/// Pick the label source among candidate statements.
///
/// The candidate whose object matches the lowest-priority rule wins; among equal
/// priorities the earliest candidate wins.
pub fn select_label_source<'a>(
    candidates: &'a [Triple],
    rules: &[LabelRule],
) -> Option<&'a Triple> {
    let mut best: Option<(u32, &Triple)> = None;
    for candidate in candidates {
        let priority = rules
            .iter()
            .filter(|rule| rule.matches(&candidate.object))
            .map(|rule| rule.priority)
            .min();
        if let Some(priority) = priority {
            if best.is_none_or(|(current, _)| priority < current) {
                best = Some((priority, candidate));
            }
        }
    }
    best.map(|(_, triple)| triple)
}

/// Collect provenance for one oriented edge.
///
/// Forward chains stop at entity nodes, so statements belonging to the edges
/// of neighbouring entities are never pulled in.
pub fn collect(
    graph: &StatementGraph,
    projected: &StatementGraph,
    entities: &EntitySet,
    edge: &OrientedEdge,
    config: &NetsConfig,
) -> EdgeProvenance {
    let path =
        shortest_undirected_path(projected, &edge.subject, &edge.object).unwrap_or_default();
    let internal = if path.len() > 2 {
        &path[1..path.len() - 1]
    } else {
        &[][..]
    };

    let metadata: Vec<Triple> = internal
        .iter()
        .flat_map(|node| graph.triples_from(node))
        .collect();

    let candidates: Vec<Triple> = metadata
        .iter()
        .filter(|t| !edge.contains(&t.object))
        .cloned()
        .collect();
    let label_source = select_label_source(&candidates, &config.label_rules).cloned();
    let label = label_source
        .as_ref()
        .map(|t| LabelPattern::for_concept(&t.object, &config.vocabulary));
    if label.is_none() {
        tracing::warn!(edge = %edge, "no label source for edge");
    }

    let mut triples: BTreeSet<Triple> = metadata.iter().cloned().collect();
    for statement in &metadata {
        triples.extend(forward_chain(graph, &statement.object, |term| {
            entities.contains(term)
        }));
    }

    EdgeProvenance {
        edge: edge.clone(),
        label_source,
        label,
        triples: triples.into_iter().collect(),
    }
}

/// Collect provenance for every oriented edge, preserving edge order.
pub fn collect_all(
    graph: &StatementGraph,
    projected: &StatementGraph,
    entities: &EntitySet,
    edges: &[OrientedEdge],
    config: &NetsConfig,
) -> Vec<EdgeProvenance> {
    let provenance: Vec<EdgeProvenance> = edges
        .iter()
        .map(|edge| collect(graph, projected, entities, edge, config))
        .collect();
    tracing::info!(
        edges = provenance.len(),
        labelled = provenance.iter().filter(|p| p.label.is_some()).count(),
        "collected edge provenance"
    );
    provenance
}
