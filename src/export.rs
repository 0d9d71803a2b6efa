//! Interchange document for NETS graphs.
//!
//! The document holds the network and, per edge type, the original statements
//! needed to turn a NETS edge back into its OWL representation:
//!
//! ```json
//! {
//!   "metadata": {"drug, protein": [["?r", "owl:onProperty", "obo:RO_0002436"]]},
//!   "network": {
//!     "nodes": [
//!       ["aspirin", {"labels": ["aspirin"], "id": ["DB001"], "bio": "D1", "type": "drug"}]
//!     ],
//!     "edges": [
//!       ["aspirin", "PTGS1", {"labels": "molecularly interacts with",
//!                             "id": "obo:RO_0002436", "edge": "drug-protein"}]
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assemble::{EdgeAttributes, NetsGraph, NodeAttributes};
use crate::error::ExportError;
use crate::provenance::EdgeProvenance;

/// Exported network: nodes and edges with their attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkExport {
    /// `[name, attributes]` in insertion order.
    pub nodes: Vec<(String, NodeAttributes)>,
    /// `[source, target, attributes]` in insertion order.
    pub edges: Vec<(String, String, EdgeAttributes)>,
}

/// The serialized NETS graph plus reconstruction metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeDocument {
    /// `"subjectVar, objectVar"` → provenance statements as `[s, p, o]` rows.
    pub metadata: BTreeMap<String, Vec<[String; 3]>>,
    pub network: NetworkExport,
}

impl InterchangeDocument {
    /// Build the document for a graph and the provenance of its edge types.
    pub fn from_graph(graph: &NetsGraph, provenance: &[EdgeProvenance]) -> Self {
        let metadata = provenance
            .iter()
            .map(|p| (p.metadata_key(), p.triples.iter().map(|t| t.to_row()).collect()))
            .collect();
        let network = NetworkExport {
            nodes: graph
                .nodes()
                .map(|(name, attrs)| (name.to_string(), attrs.clone()))
                .collect(),
            edges: graph
                .edges()
                .map(|(s, t, attrs)| (s.to_string(), t.to_string(), attrs.clone()))
                .collect(),
        };
        Self { metadata, network }
    }

    /// Rebuild the graph from the network section.
    pub fn to_graph(&self) -> NetsGraph {
        let mut graph = NetsGraph::new();
        for (name, attrs) in &self.network.nodes {
            graph.upsert_node(name, attrs.clone());
        }
        for (source, target, attrs) in &self.network.edges {
            graph.upsert_edge(source, target, attrs.clone());
        }
        graph
    }

    pub fn to_json_string(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self).map_err(|e| ExportError::Serialization {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self, ExportError> {
        serde_json::from_str(text).map_err(|e| ExportError::Serialization {
            message: e.to_string(),
        })
    }

    /// Write the document as JSON.
    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(
            path = %path.display(),
            nodes = self.network.nodes.len(),
            edges = self.network.edges.len(),
            "wrote NETS interchange file"
        );
        Ok(())
    }

    /// Load a previously written document.
    pub fn read_from(path: &Path) -> Result<Self, ExportError> {
        let text = std::fs::read_to_string(path).map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }
}

/// A Graphviz `label` attribute with quotes and backslashes escaped.
pub(crate) fn dot_label(text: &str) -> String {
    format!(
        "label = \"{}\"",
        text.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// Write rendered DOT text to `path`.
pub(crate) fn write_dot(path: &Path, dot: &str) -> Result<(), ExportError> {
    std::fs::write(path, dot).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), "wrote DOT rendering");
    Ok(())
}
