//! Entity node classification.
//!
//! An entity node is a query term standing for a real-world entity, as opposed
//! to ontology plumbing (restrictions, classes, identifiers). Two signals are used:
//!
//! - the terminal node of a "denotes" marker chain (`?ice IAO_0000219 ?entity`),
//! - the subject of a label-style predicate (`rdfs:label`, `dcterms:title`),
//!   for endpoints that do not follow the marker convention.

use std::collections::BTreeSet;

use crate::config::Vocabulary;
use crate::error::ClassifyError;
use crate::graph::{StatementGraph, variable_name};

/// Deduplicated entity nodes in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySet(BTreeSet<String>);

impl EntitySet {
    pub fn contains(&self, node: &str) -> bool {
        self.0.contains(node)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entity node terms in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Binding variable names of the entity nodes (`?gene` → `gene`).
    pub fn variables(&self) -> BTreeSet<String> {
        self.iter().map(|n| variable_name(n).to_string()).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for EntitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Find the entity nodes of a statement graph.
///
/// For every marker edge the target is inspected: if it has an outbound marker
/// edge it is an intermediate link and skipped, otherwise it must have exactly
/// one inbound marker edge and is accepted. More than one inbound marker edge is
/// fatal since the entity's identifier could not be told apart.
pub fn classify(graph: &StatementGraph, vocab: &Vocabulary) -> Result<EntitySet, ClassifyError> {
    let mut entities = BTreeSet::new();

    for triple in graph.triples() {
        if vocab.is_marker(&triple.predicate) {
            let target = &triple.object;
            let has_outbound = graph
                .triples_from(target)
                .iter()
                .any(|t| vocab.is_marker(&t.predicate));
            if !has_outbound {
                let inbound: Vec<String> = graph
                    .triples_to(target)
                    .into_iter()
                    .filter(|t| vocab.is_marker(&t.predicate))
                    .map(|t| t.subject)
                    .collect();
                if inbound.len() != 1 {
                    return Err(ClassifyError::AmbiguousEntitySource {
                        node: target.clone(),
                        count: inbound.len(),
                        sources: inbound.join(", "),
                    });
                }
                entities.insert(target.clone());
            }
        }

        if vocab.is_label_predicate(&triple.predicate) {
            entities.insert(triple.subject.clone());
        }
    }

    tracing::info!(entities = entities.len(), "classified entity nodes");
    Ok(EntitySet(entities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Triple;

    fn graph(lines: &[&str]) -> StatementGraph {
        let triples: Vec<Triple> = lines.iter().map(|l| Triple::parse(l).unwrap()).collect();
        StatementGraph::from_triples(&triples).unwrap()
    }

    #[test]
    fn marker_target_is_entity() {
        let g = graph(&[
            "?gene_ice obo:IAO_0000219 ?gene",
            "?gene rdfs:subClassOf ?r",
            "?r owl:someValuesFrom ?protein",
            "?protein_ice obo:IAO_0000219 ?protein",
        ]);
        let entities = classify(&g, &Vocabulary::default()).unwrap();
        assert_eq!(entities.iter().collect::<Vec<_>>(), vec!["?gene", "?protein"]);
        assert_eq!(
            entities.variables().into_iter().collect::<Vec<_>>(),
            vec!["gene", "protein"]
        );
    }

    #[test]
    fn two_inbound_markers_are_ambiguous() {
        let g = graph(&["e1 IAO_0000219 r1", "r2 IAO_0000219 r1"]);
        match classify(&g, &Vocabulary::default()) {
            Err(ClassifyError::AmbiguousEntitySource { node, count, .. }) => {
                assert_eq!(node, "r1");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn intermediate_marker_node_skipped() {
        // a denotes b denotes c: only the end of the chain is an entity
        let g = graph(&["a IAO_0000219 b", "b IAO_0000219 c"]);
        let entities = classify(&g, &Vocabulary::default()).unwrap();
        assert_eq!(entities.iter().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn label_fallback() {
        let g = graph(&["e1 rdfs:label e1_Name"]);
        let entities = classify(&g, &Vocabulary::default()).unwrap();
        assert_eq!(entities, EntitySet::from_iter(["e1"]));
    }

    #[test]
    fn title_fallback_and_dedup() {
        let g = graph(&[
            "?doc dcterms:title ?t",
            "?doc rdfs:label ?l",
            "?doc cites ?other",
            "?other rdfs:label ?ol",
        ]);
        let entities = classify(&g, &Vocabulary::default()).unwrap();
        assert_eq!(entities.iter().collect::<Vec<_>>(), vec!["?doc", "?other"]);
    }

    #[test]
    fn classification_is_idempotent() {
        let g = graph(&[
            "?d_ice obo:IAO_0000219 ?d",
            "?d rdfs:subClassOf ?r",
            "?r owl:someValuesFrom ?p",
            "?p rdfs:label ?p_label",
        ]);
        let vocab = Vocabulary::default();
        let first = classify(&g, &vocab).unwrap();
        let second = classify(&g, &vocab).unwrap();
        assert_eq!(first, second);
    }
}
