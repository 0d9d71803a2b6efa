//! Engine facade: top-level API for the OWL-NETS pipeline.
//!
//! The engine runs in two phases. [`Engine::abstract_query`] works on the query
//! alone: it builds the statement graph, finds and orients entity edges and
//! derives the placeholder patterns whose bindings supply labels. Once the
//! augmented query has been run, [`Engine::populate`] turns the result rows into
//! the NETS graph and its interchange document.

use std::collections::BTreeSet;
use std::fmt;

use crate::assemble::{NetsGraph, assemble};
use crate::bindings::QueryResults;
use crate::classify::{EntitySet, classify};
use crate::config::NetsConfig;
use crate::error::NetsResult;
use crate::export::InterchangeDocument;
use crate::graph::project::project;
use crate::graph::{StatementGraph, Triple};
use crate::orient::{AmbiguityReason, OrientedEdge, Orientation, orient_all};
use crate::owl::{OwlGraph, owl_graph};
use crate::pairs::{CandidatePair, find_pairs};
use crate::provenance::{EdgeProvenance, collect_all};
use crate::records::{EntityRecords, NodePatterns, build_records};

/// The OWL-NETS engine. Holds configuration only; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: NetsConfig,
}

impl Engine {
    /// Create an engine, validating the configuration.
    pub fn new(config: NetsConfig) -> NetsResult<Self> {
        config.validate()?;
        tracing::debug!(
            marker = %config.vocabulary.denotes_marker,
            label_rules = config.label_rules.len(),
            "initializing OWL-NETS engine"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &NetsConfig {
        &self.config
    }

    /// Abstract a query's triple patterns into oriented entity edges.
    pub fn abstract_query(&self, triples: &[Triple]) -> NetsResult<Abstraction> {
        let vocab = &self.config.vocabulary;
        let graph = StatementGraph::from_triples(triples)?;
        let entities = classify(&graph, vocab)?;
        let projected = project(&graph, &entities);
        let pairs = find_pairs(&projected, &entities);
        let orientations = orient_all(&graph, &projected, &pairs, vocab);

        let edges: Vec<OrientedEdge> = orientations
            .iter()
            .filter_map(Orientation::oriented)
            .cloned()
            .collect();
        let provenance = collect_all(&graph, &projected, &entities, &edges, &self.config);
        let node_patterns = NodePatterns::derive(&graph, &edges, vocab);

        let mut placeholders: Vec<Triple> = node_patterns.label_triples(vocab);
        for label in provenance.iter().filter_map(|p| p.label.as_ref()) {
            let triple = label.to_triple();
            if !placeholders.contains(&triple) {
                placeholders.push(triple);
            }
        }

        Ok(Abstraction {
            triples: triples.to_vec(),
            graph,
            projected,
            entities,
            pairs,
            orientations,
            provenance,
            node_patterns,
            placeholders,
        })
    }

    /// Build entity records for the oriented edges' endpoints.
    pub fn records(
        &self,
        abstraction: &Abstraction,
        results: &QueryResults,
    ) -> NetsResult<EntityRecords> {
        let variables = abstraction.edge_variables();
        Ok(build_records(results, &abstraction.node_patterns, &variables)?)
    }

    /// Populate the NETS graph from the augmented query's results.
    pub fn populate(
        &self,
        abstraction: &Abstraction,
        results: &QueryResults,
    ) -> NetsResult<Population> {
        let records = self.records(abstraction, results)?;
        let graph = assemble(results, &abstraction.provenance, &records);
        let document = InterchangeDocument::from_graph(&graph, &abstraction.provenance);
        Ok(Population { graph, document })
    }

    /// Instance-level OWL graph of the original query patterns.
    pub fn owl_graph(&self, abstraction: &Abstraction, results: &QueryResults) -> OwlGraph {
        owl_graph(&abstraction.triples, results, &self.config.vocabulary)
    }
}

/// Everything derived from the query alone.
#[derive(Debug, Clone)]
pub struct Abstraction {
    pub triples: Vec<Triple>,
    pub graph: StatementGraph,
    pub projected: StatementGraph,
    pub entities: EntitySet,
    pub pairs: Vec<CandidatePair>,
    pub orientations: Vec<Orientation>,
    pub provenance: Vec<EdgeProvenance>,
    pub node_patterns: NodePatterns,
    /// Label placeholder patterns to add to the query, nodes first.
    pub placeholders: Vec<Triple>,
}

impl Abstraction {
    pub fn oriented_edges(&self) -> impl Iterator<Item = &OrientedEdge> {
        self.orientations.iter().filter_map(Orientation::oriented)
    }

    /// Pairs left unoriented, with the reason.
    pub fn ambiguous(&self) -> impl Iterator<Item = (&[String; 2], AmbiguityReason)> {
        self.orientations.iter().filter_map(|o| match o {
            Orientation::Ambiguous { endpoints, reason } => Some((endpoints, *reason)),
            Orientation::Oriented(_) => None,
        })
    }

    /// Variable names of all oriented edge endpoints.
    pub fn edge_variables(&self) -> BTreeSet<String> {
        self.node_patterns.variables()
    }

    /// The query patterns plus the label placeholders.
    pub fn query_patterns(&self) -> Vec<Triple> {
        let mut patterns = self.triples.clone();
        patterns.extend(self.placeholders.iter().cloned());
        patterns
    }

    pub fn info(&self) -> AbstractionInfo {
        AbstractionInfo {
            triple_count: self.triples.len(),
            node_count: self.graph.node_count(),
            projected_node_count: self.projected.node_count(),
            entity_count: self.entities.len(),
            pair_count: self.pairs.len(),
            oriented_count: self.oriented_edges().count(),
            ambiguous_count: self.ambiguous().count(),
            unlabelled_count: self.provenance.iter().filter(|p| p.label.is_none()).count(),
        }
    }
}

/// The populated NETS graph and its interchange form.
#[derive(Debug, Clone)]
pub struct Population {
    pub graph: NetsGraph,
    pub document: InterchangeDocument,
}

/// Summary counts of an abstraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractionInfo {
    pub triple_count: usize,
    pub node_count: usize,
    pub projected_node_count: usize,
    pub entity_count: usize,
    pub pair_count: usize,
    pub oriented_count: usize,
    pub ambiguous_count: usize,
    pub unlabelled_count: usize,
}

impl fmt::Display for AbstractionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OWL-NETS abstraction")?;
        writeln!(f, "  triples:          {}", self.triple_count)?;
        writeln!(f, "  nodes:            {}", self.node_count)?;
        writeln!(f, "  projected nodes:  {}", self.projected_node_count)?;
        writeln!(f, "  entities:         {}", self.entity_count)?;
        writeln!(f, "  pairs:            {}", self.pair_count)?;
        writeln!(f, "  oriented edges:   {}", self.oriented_count)?;
        writeln!(f, "  ambiguous pairs:  {}", self.ambiguous_count)?;
        writeln!(f, "  unlabelled edges: {}", self.unlabelled_count)?;
        Ok(())
    }
}
