//! Edge direction from OWL restriction axioms.
//!
//! In a `SubClassOf(A, R some B)` axiom the restriction node points at `B`
//! (`?r owl:someValuesFrom ?b`) while `A` points at the restriction
//! (`?a rdfs:subClassOf ?r`). So the endpoint a restriction can reach by a
//! directed path is the object of the relation and the other endpoint is the subject.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Vocabulary;
use crate::graph::StatementGraph;
use crate::graph::traverse::{reaches, shortest_undirected_path};
use crate::pairs::CandidatePair;

/// A directed entity pair. `subject != object`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrientedEdge {
    pub subject: String,
    pub object: String,
}

impl OrientedEdge {
    pub fn new(subject: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            object: object.into(),
        }
    }

    pub fn contains(&self, term: &str) -> bool {
        self.subject == term || self.object == term
    }
}

impl fmt::Display for OrientedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.subject, self.object)
    }
}

/// Why a pair could not be oriented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityReason {
    /// No restriction node lies on the path between the endpoints.
    NoRestriction,
    /// The restriction nodes reach neither endpoint.
    ReachesNeither,
    /// The restriction nodes reach both endpoints.
    ReachesBoth,
    /// Restriction nodes point in opposite directions.
    Conflicting,
}

impl fmt::Display for AmbiguityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityReason::NoRestriction => write!(f, "no restriction on path"),
            AmbiguityReason::ReachesNeither => write!(f, "restriction reaches neither endpoint"),
            AmbiguityReason::ReachesBoth => write!(f, "restriction reaches both endpoints"),
            AmbiguityReason::Conflicting => write!(f, "restrictions disagree on direction"),
        }
    }
}

/// Outcome of orienting one candidate pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Oriented(OrientedEdge),
    Ambiguous {
        /// Both endpoints, sorted.
        endpoints: [String; 2],
        reason: AmbiguityReason,
    },
}

impl Orientation {
    pub fn oriented(&self) -> Option<&OrientedEdge> {
        match self {
            Orientation::Oriented(edge) => Some(edge),
            Orientation::Ambiguous { .. } => None,
        }
    }

    fn ambiguous(pair: &CandidatePair, reason: AmbiguityReason) -> Self {
        let mut endpoints = [pair.first.clone(), pair.second.clone()];
        endpoints.sort();
        Orientation::Ambiguous { endpoints, reason }
    }
}

/// Restriction nodes among the outgoing statements of the given path nodes.
fn restrictions_on_path(
    graph: &StatementGraph,
    path: &[String],
    vocab: &Vocabulary,
) -> BTreeSet<String> {
    path.iter()
        .flat_map(|node| graph.triples_from(node))
        .filter(|t| vocab.is_restriction_type(&t.predicate, &t.object))
        .map(|t| t.subject)
        .collect()
}

/// Orient one candidate pair.
///
/// `graph` is the full statement graph, `projected` the structural projection the
/// pair was found in. Each restriction node on the canonical path votes for the
/// endpoint it alone reaches; votes reaching neither or both endpoints abstain.
/// A single consistent vote orients the edge, anything else is ambiguous.
pub fn orient(
    graph: &StatementGraph,
    projected: &StatementGraph,
    pair: &CandidatePair,
    vocab: &Vocabulary,
) -> Orientation {
    let Some(path) = shortest_undirected_path(projected, &pair.first, &pair.second) else {
        return Orientation::ambiguous(pair, AmbiguityReason::NoRestriction);
    };

    let restrictions = restrictions_on_path(graph, &path, vocab);
    if restrictions.is_empty() {
        return Orientation::ambiguous(pair, AmbiguityReason::NoRestriction);
    }

    let mut verdicts: BTreeSet<OrientedEdge> = BTreeSet::new();
    let mut reaches_both = false;
    for restriction in &restrictions {
        let to_first = reaches(graph, restriction, &pair.first);
        let to_second = reaches(graph, restriction, &pair.second);
        match (to_first, to_second) {
            (true, false) => {
                verdicts.insert(OrientedEdge::new(pair.second.as_str(), pair.first.as_str()));
            }
            (false, true) => {
                verdicts.insert(OrientedEdge::new(pair.first.as_str(), pair.second.as_str()));
            }
            (true, true) => reaches_both = true,
            (false, false) => {}
        }
        tracing::debug!(
            restriction = %restriction,
            first = %pair.first,
            second = %pair.second,
            to_first,
            to_second,
            "restriction reachability"
        );
    }

    let mut verdicts = verdicts.into_iter();
    match (verdicts.next(), verdicts.next()) {
        (Some(edge), None) => Orientation::Oriented(edge),
        (Some(_), Some(_)) => Orientation::ambiguous(pair, AmbiguityReason::Conflicting),
        (None, _) if reaches_both => Orientation::ambiguous(pair, AmbiguityReason::ReachesBoth),
        (None, _) => Orientation::ambiguous(pair, AmbiguityReason::ReachesNeither),
    }
}

/// Orient every candidate pair, preserving pair order.
pub fn orient_all(
    graph: &StatementGraph,
    projected: &StatementGraph,
    pairs: &[CandidatePair],
    vocab: &Vocabulary,
) -> Vec<Orientation> {
    let orientations: Vec<Orientation> = pairs
        .iter()
        .map(|pair| orient(graph, projected, pair, vocab))
        .collect();

    for orientation in &orientations {
        if let Orientation::Ambiguous { endpoints, reason } = orientation {
            tracing::warn!(
                first = %endpoints[0],
                second = %endpoints[1],
                %reason,
                "edge direction left unresolved"
            );
        }
    }
    tracing::info!(
        oriented = orientations.iter().filter(|o| o.oriented().is_some()).count(),
        ambiguous = orientations.iter().filter(|o| o.oriented().is_none()).count(),
        "oriented entity pairs"
    );
    orientations
}
