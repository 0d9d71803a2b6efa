//! Per-entity metadata built from query result rows.
//!
//! Each entity variable gets a label variable (`?drug` → `?drug_name`, bound by a
//! `?drug rdfs:label ?drug_name` placeholder pattern) and an identifier term (the
//! subject of the marker statement denoting the entity, e.g. `?drug_ice`). For
//! every concrete value bound to the variable the labels and identifiers seen
//! across rows are collected in lockstep, so `labels[i]` always belongs to `ids[i]`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::bindings::{QueryResults, resolve, value};
use crate::config::Vocabulary;
use crate::error::RecordError;
use crate::graph::{StatementGraph, Triple, variable_name};
use crate::orient::OrientedEdge;

/// Label and identifier terms per entity variable, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatterns {
    /// `drug` → `?drug_name`.
    pub labels: BTreeMap<String, String>,
    /// `drug` → `?drug_ice`. Absent when no marker statement denotes the entity.
    pub ids: BTreeMap<String, String>,
}

impl NodePatterns {
    /// Derive patterns for the endpoints of the oriented edges.
    pub fn derive(graph: &StatementGraph, edges: &[OrientedEdge], vocab: &Vocabulary) -> Self {
        let mut patterns = Self::default();
        let endpoints: BTreeSet<&str> = edges
            .iter()
            .flat_map(|e| [e.subject.as_str(), e.object.as_str()])
            .collect();

        for term in endpoints {
            let name = variable_name(term).to_string();
            patterns
                .labels
                .insert(name.clone(), format!("?{name}{}", vocab.node_label_suffix));
            let id = graph
                .triples_to(term)
                .into_iter()
                .find(|t| vocab.is_marker(&t.predicate))
                .map(|t| t.subject);
            match id {
                Some(id) => {
                    patterns.ids.insert(name, id);
                }
                None => tracing::debug!(entity = term, "no identifier statement, value used as id"),
            }
        }
        patterns
    }

    /// Entity variable names, sorted.
    pub fn variables(&self) -> BTreeSet<String> {
        self.labels.keys().cloned().collect()
    }

    /// `?var rdfs:label ?var_name` for every entity variable.
    pub fn label_triples(&self, vocab: &Vocabulary) -> Vec<Triple> {
        self.labels
            .iter()
            .map(|(var, label)| {
                Triple::new(
                    format!("?{var}"),
                    vocab.label_predicate.as_str(),
                    label.as_str(),
                )
            })
            .collect()
    }
}

/// Labels and identifiers observed for one concrete entity value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub labels: Vec<String>,
    pub ids: Vec<String>,
}

impl EntityRecord {
    pub fn push(&mut self, label: impl Into<String>, id: impl Into<String>) {
        self.labels.push(label.into());
        self.ids.push(id.into());
    }

    /// Remove repeated (label, id) pairs, keeping first occurrences.
    ///
    /// The two lists are never deduplicated on their own: a label repeated with
    /// a different identifier is kept.
    pub fn dedup(&mut self) {
        let mut seen = BTreeSet::new();
        let (labels, ids): (Vec<String>, Vec<String>) = self
            .labels
            .drain(..)
            .zip(self.ids.drain(..))
            .filter(|pair| seen.insert(pair.clone()))
            .unzip();
        self.labels = labels;
        self.ids = ids;
    }

    /// The shortest label, first one on a tie.
    pub fn display_label(&self) -> Option<&str> {
        self.labels
            .iter()
            .min_by_key(|l| l.chars().count())
            .map(String::as_str)
    }
}

/// All entity records plus the value → variable type index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecords {
    /// variable → concrete value → record.
    pub by_variable: BTreeMap<String, BTreeMap<String, EntityRecord>>,
    /// concrete value → entity variables it was bound to.
    pub types: BTreeMap<String, BTreeSet<String>>,
}

impl EntityRecords {
    pub fn record(&self, variable: &str, value: &str) -> Option<&EntityRecord> {
        self.by_variable
            .get(variable_name(variable))
            .and_then(|records| records.get(value))
    }

    /// Entity type string of a value: its variable names, sorted, joined by `-`.
    pub fn entity_type(&self, value: &str) -> String {
        self.types
            .get(value)
            .map(|vars| vars.iter().map(String::as_str).collect::<Vec<_>>().join("-"))
            .unwrap_or_default()
    }
}

/// Build entity records for `variables` from the result rows.
///
/// Rows leaving a variable unbound are skipped for it; rows leaving its label
/// unbound still count the value but add no label. Every distinct bound value
/// must end up with a record.
pub fn build_records(
    results: &QueryResults,
    patterns: &NodePatterns,
    variables: &BTreeSet<String>,
) -> Result<EntityRecords, RecordError> {
    let mut records = EntityRecords::default();

    for var in variables {
        let label_term = patterns
            .labels
            .get(var)
            .ok_or_else(|| RecordError::MissingLabelPattern {
                variable: var.clone(),
            })?;
        let id_term = patterns.ids.get(var);

        let mut by_value: BTreeMap<String, EntityRecord> = BTreeMap::new();
        let mut bound: BTreeSet<&str> = BTreeSet::new();
        for row in results.rows() {
            let Some(entity) = value(row, var) else {
                continue;
            };
            bound.insert(entity);
            records
                .types
                .entry(entity.to_string())
                .or_default()
                .insert(var.clone());

            let Some(label) = resolve(row, label_term) else {
                continue;
            };
            let id = id_term
                .and_then(|term| resolve(row, term))
                .unwrap_or(entity);
            by_value.entry(entity.to_string()).or_default().push(label, id);
        }

        for record in by_value.values_mut() {
            record.dedup();
        }
        if by_value.len() != bound.len() {
            return Err(RecordError::KeyCountMismatch {
                variable: var.clone(),
                keys: by_value.len(),
                values: bound.len(),
            });
        }
        tracing::debug!(variable = %var, values = bound.len(), "built entity records");
        records.by_variable.insert(var.clone(), by_value);
    }

    tracing::info!(
        variables = records.by_variable.len(),
        values = records.types.len(),
        "built entity metadata"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> NodePatterns {
        let graph = StatementGraph::from_triples(&[
            Triple::new("?drug_ice", "obo:IAO_0000219", "?drug"),
            Triple::new("?drug", "rdfs:subClassOf", "?protein"),
        ])
        .unwrap();
        NodePatterns::derive(
            &graph,
            &[OrientedEdge::new("?drug", "?protein")],
            &Vocabulary::default(),
        )
    }

    fn vars(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn joint_dedup_keeps_pairs_aligned() {
        let mut record = EntityRecord::default();
        for (label, id) in [("A", "1"), ("A", "1"), ("B", "2")] {
            record.push(label, id);
        }
        record.dedup();
        assert_eq!(record.labels, vec!["A", "B"]);
        assert_eq!(record.ids, vec!["1", "2"]);
    }

    #[test]
    fn dedup_keeps_label_with_new_id() {
        let mut record = EntityRecord::default();
        record.push("A", "1");
        record.push("A", "2");
        record.push("A", "1");
        record.dedup();
        assert_eq!(record.labels, vec!["A", "A"]);
        assert_eq!(record.ids, vec!["1", "2"]);
    }

    #[test]
    fn display_label_prefers_shortest_then_first() {
        let record = EntityRecord {
            labels: vec!["tumor protein".into(), "TP53".into(), "P53A".into()],
            ids: vec!["1".into(), "2".into(), "3".into()],
        };
        assert_eq!(record.display_label(), Some("TP53"));
    }

    #[test]
    fn derives_label_and_id_terms() {
        let p = patterns();
        assert_eq!(p.labels["drug"], "?drug_name");
        assert_eq!(p.labels["protein"], "?protein_name");
        assert_eq!(p.ids["drug"], "?drug_ice");
        assert!(!p.ids.contains_key("protein"));
        assert_eq!(
            p.label_triples(&Vocabulary::default())[0],
            Triple::new("?drug", "rdfs:label", "?drug_name")
        );
    }

    #[test]
    fn builds_records_and_types() {
        let results = QueryResults::from_rows([
            vec![
                ("drug", "D1"),
                ("drug_name", "aspirin"),
                ("drug_ice", "DB001"),
                ("protein", "P1"),
                ("protein_name", "PTGS1"),
            ],
            vec![
                ("drug", "D1"),
                ("drug_name", "aspirin"),
                ("drug_ice", "DB001"),
                ("protein", "D1"),
                ("protein_name", "aspirin"),
            ],
        ]);
        let records = build_records(&results, &patterns(), &vars(&["drug", "protein"])).unwrap();

        let aspirin = records.record("?drug", "D1").unwrap();
        assert_eq!(aspirin.labels, vec!["aspirin"]);
        assert_eq!(aspirin.ids, vec!["DB001"]);
        // no identifier statement for proteins: the value is its own id
        assert_eq!(records.record("protein", "P1").unwrap().ids, vec!["P1"]);
        assert_eq!(records.entity_type("D1"), "drug-protein");
        assert_eq!(records.entity_type("P1"), "protein");
    }

    #[test]
    fn unlabelled_value_is_count_mismatch() {
        let results = QueryResults::from_rows([
            vec![("drug", "D1"), ("drug_name", "aspirin")],
            vec![("drug", "D2")],
        ]);
        let err = build_records(&results, &patterns(), &vars(&["drug"])).unwrap_err();
        match err {
            RecordError::KeyCountMismatch { variable, keys, values } => {
                assert_eq!(variable, "drug");
                assert_eq!(keys, 1);
                assert_eq!(values, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unbound_entity_rows_skipped() {
        let results = QueryResults::from_rows([
            vec![("drug", "D1"), ("drug_name", "aspirin")],
            vec![("protein", "P1")],
        ]);
        let records = build_records(&results, &patterns(), &vars(&["drug"])).unwrap();
        assert_eq!(records.by_variable["drug"].len(), 1);
    }

    #[test]
    fn unknown_variable_has_no_pattern() {
        let results = QueryResults::from_rows([vec![("gene", "G1")]]);
        let err = build_records(&results, &patterns(), &vars(&["gene"])).unwrap_err();
        assert!(matches!(err, RecordError::MissingLabelPattern { .. }));
    }
}
