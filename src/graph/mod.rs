//! Statement graph: the directed graph of a query's triple patterns.
//!
//! - **Triples** ([`Triple`]): parsed from whitespace-tokenized statement text
//! - **Statement graph** ([`StatementGraph`]): `petgraph` graph keyed by
//!   (subject, object) with the predicate on the edge
//! - **Traversal** ([`traverse`]): canonical BFS paths, distances and forward chains
//! - **Projection** ([`project`]): the structural subgraph used for pairing

pub mod index;
pub mod project;
pub mod traverse;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

pub use index::{GraphResult, StatementGraph};

/// A triple (subject, predicate, object) from the query.
///
/// Terms are kept verbatim: variables carry their leading `?`, prefixed names
/// their prefix, and literal objects may contain spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Parse one statement.
    ///
    /// Tokens beyond the third are rejoined with single spaces into the object,
    /// so `?d rdfs:label "Breast Cancer"` keeps its literal intact. Returns `None`
    /// when fewer than three tokens are present.
    pub fn parse(text: &str) -> Option<Self> {
        let mut tokens = text.split_whitespace();
        let subject = tokens.next()?;
        let predicate = tokens.next()?;
        let object: Vec<&str> = tokens.collect();
        if object.is_empty() {
            return None;
        }
        Some(Self::new(subject, predicate, object.join(" ")))
    }

    /// The triple as a `[subject, predicate, object]` row.
    pub fn to_row(&self) -> [String; 3] {
        [
            self.subject.clone(),
            self.predicate.clone(),
            self.object.clone(),
        ]
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

impl From<[String; 3]> for Triple {
    fn from([subject, predicate, object]: [String; 3]) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// Parse a block of statements, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_triples(text: &str) -> GraphResult<Vec<Triple>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            Triple::parse(line).ok_or_else(|| GraphError::MalformedTriple {
                line: i + 1,
                text: line.to_string(),
            })
        })
        .collect()
}

/// Strip the `?` sigil from a query term, yielding the bindings key.
pub fn variable_name(term: &str) -> &str {
    term.trim_matches('?')
}
