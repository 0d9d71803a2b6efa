//! Query result rows in SPARQL 1.1 JSON results format.
//!
//! Only `results.bindings` is interpreted; `head` is accepted and ignored. Each
//! row maps a variable name (without `?`) to a bound value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::graph::variable_name;

/// A single bound value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundValue {
    pub value: String,
    /// `uri`, `literal`, `bnode`, when the endpoint reports it.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One result row: variable name → bound value.
pub type Binding = BTreeMap<String, BoundValue>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Parsed query results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<serde_json::Value>,
    pub results: ResultSet,
}

impl QueryResults {
    /// Build results from plain rows, mostly useful in tests and benches.
    pub fn from_rows<I, R, K, V>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let bindings = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(k, v)| {
                        (
                            k.into(),
                            BoundValue {
                                value: v.into(),
                                kind: None,
                            },
                        )
                    })
                    .collect()
            })
            .collect();
        Self {
            head: None,
            results: ResultSet { bindings },
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, RecordError> {
        serde_json::from_str(text).map_err(|e| RecordError::Parse {
            message: e.to_string(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        let text = std::fs::read_to_string(path).map_err(|e| RecordError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let results = Self::from_json_str(&text)?;
        tracing::info!(
            path = %path.display(),
            rows = results.rows().len(),
            "loaded query results"
        );
        Ok(results)
    }

    pub fn rows(&self) -> &[Binding] {
        &self.results.bindings
    }
}

/// Value bound to `term` in `row`. Accepts the term with or without `?`.
pub fn value<'r>(row: &'r Binding, term: &str) -> Option<&'r str> {
    row.get(variable_name(term)).map(|b| b.value.as_str())
}

/// Resolve a pattern term against a row: variables take their bound value,
/// constants stand for themselves. `None` when a variable is unbound.
pub fn resolve<'r>(row: &'r Binding, term: &'r str) -> Option<&'r str> {
    if term.starts_with('?') {
        value(row, term)
    } else {
        Some(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sparql_json() {
        let text = r#"{
            "head": {"vars": ["gene", "gene_name"]},
            "results": {"bindings": [
                {"gene": {"type": "uri", "value": "http://example.org/G1"},
                 "gene_name": {"type": "literal", "value": "TP53"}}
            ]}
        }"#;
        let results = QueryResults::from_json_str(text).unwrap();
        assert_eq!(results.rows().len(), 1);
        let row = &results.rows()[0];
        assert_eq!(value(row, "?gene"), Some("http://example.org/G1"));
        assert_eq!(value(row, "gene_name"), Some("TP53"));
        assert_eq!(row["gene"].kind.as_deref(), Some("uri"));
    }

    #[test]
    fn head_and_type_are_optional() {
        let results =
            QueryResults::from_json_str(r#"{"results": {"bindings": [{"x": {"value": "1"}}]}}"#)
                .unwrap();
        assert!(results.head.is_none());
        assert_eq!(results.rows()[0]["x"].kind, None);
    }

    #[test]
    fn missing_results_is_parse_error() {
        let err = QueryResults::from_json_str(r#"{"head": {}}"#).unwrap_err();
        assert!(matches!(err, RecordError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = QueryResults::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RecordError::Io { .. }));
    }

    #[test]
    fn constants_resolve_to_themselves() {
        let results = QueryResults::from_rows([[("r", "R1")]]);
        let row = &results.rows()[0];
        assert_eq!(resolve(row, "?r"), Some("R1"));
        assert_eq!(resolve(row, "owl:Restriction"), Some("owl:Restriction"));
        assert_eq!(resolve(row, "?unbound"), None);
    }
}
