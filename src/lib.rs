// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # owl-nets
//!
//! Abstracts OWL-encoded ontology queries into entity networks (NETS). A query
//! over an ontology knowledge base is full of auxiliary structure: restriction
//! axioms, identifier nodes, class plumbing. OWL-NETS keeps the real entities,
//! connects nearest entities by directed edges whose direction and label come
//! from the restriction axioms between them, and records the original statements
//! of each edge so the abstraction can be reversed.
//!
//! ## Pipeline
//!
//! - **Statement graph** (`graph`): petgraph graph of the query's triple patterns
//! - **Entity classification** (`classify`): "denotes" marker targets and labelled subjects
//! - **Pairing** (`pairs`): nearest entity pairs in the structural projection
//! - **Orientation** (`orient`): edge direction from restriction reachability
//! - **Provenance** (`provenance`): label source and reconstruction statements per edge
//! - **Records** (`records`): labels and identifiers per bound entity value
//! - **Assembly** (`assemble`): the NETS graph, serialized by `export`
//!
//! ## Library usage
//!
//! ```no_run
//! use owl_nets::bindings::QueryResults;
//! use owl_nets::engine::Engine;
//! use owl_nets::graph::parse_triples;
//!
//! let engine = Engine::default();
//! let triples = parse_triples("?g_ice obo:IAO_0000219 ?g\n?g rdfs:subClassOf ?r\n").unwrap();
//! let abstraction = engine.abstract_query(&triples).unwrap();
//! let results = QueryResults::from_path("results.json".as_ref()).unwrap();
//! let population = engine.populate(&abstraction, &results).unwrap();
//! population.document.write_to("nets.json".as_ref()).unwrap();
//! ```

pub mod assemble;
pub mod bindings;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod graph;
pub mod orient;
pub mod owl;
pub mod pairs;
pub mod provenance;
pub mod records;
