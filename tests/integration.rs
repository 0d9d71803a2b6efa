//! End-to-end integration tests for the OWL-NETS engine.
//!
//! These tests run the full pipeline from triple text through abstraction,
//! population from query results and the interchange file round trip.

use std::path::Path;

use owl_nets::bindings::QueryResults;
use owl_nets::config::NetsConfig;
use owl_nets::engine::Engine;
use owl_nets::error::{ClassifyError, NetsError, RecordError};
use owl_nets::export::InterchangeDocument;
use owl_nets::graph::{Triple, parse_triples};
use owl_nets::orient::OrientedEdge;

const DRUG_QUERY: &str = "\
# drug targets
?drug_ice obo:IAO_0000219 ?drug
?drug rdfs:subClassOf ?restriction
?restriction rdf:type owl:Restriction
?restriction owl:onProperty obo:RO_0002436
?restriction owl:someValuesFrom ?protein
?protein_ice obo:IAO_0000219 ?protein
";

const DRUG_RESULTS: &str = r#"{
  "head": {"vars": ["drug", "drug_name", "drug_ice", "protein", "protein_name", "protein_ice"]},
  "results": {"bindings": [
    {"drug": {"type": "uri", "value": "D1"}, "drug_name": {"type": "literal", "value": "aspirin"},
     "drug_ice": {"type": "uri", "value": "DB001"}, "protein": {"type": "uri", "value": "P1"},
     "protein_name": {"type": "literal", "value": "PTGS1"},
     "protein_ice": {"type": "uri", "value": "UP1"},
     "restriction": {"type": "bnode", "value": "R1"},
     "obo_RO_0002436_Name": {"type": "literal", "value": "molecularly interacts with"}},
    {"drug": {"value": "D1"}, "drug_name": {"value": "acetylsalicylic acid"},
     "drug_ice": {"value": "DB001b"}, "protein": {"value": "P2"},
     "protein_name": {"value": "PTGS2"}, "protein_ice": {"value": "UP2"},
     "restriction": {"value": "R2"},
     "obo_RO_0002436_Name": {"value": "molecularly interacts with"}},
    {"drug": {"value": "D1"}, "drug_name": {"value": "aspirin"},
     "drug_ice": {"value": "DB001"}, "protein": {"value": "P2"},
     "protein_name": {"value": "PTGS2"}, "protein_ice": {"value": "UP2"},
     "restriction": {"value": "R2"},
     "obo_RO_0002436_Name": {"value": "molecularly interacts with"}}
  ]}
}"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn drug_target_network_end_to_end() {
    let engine = Engine::default();
    let abstraction = engine
        .abstract_query(&parse_triples(DRUG_QUERY).unwrap())
        .unwrap();

    assert_eq!(
        abstraction.entities.iter().collect::<Vec<_>>(),
        vec!["?drug", "?protein"]
    );
    assert_eq!(
        abstraction.oriented_edges().collect::<Vec<_>>(),
        vec![&OrientedEdge::new("?drug", "?protein")]
    );
    assert!(abstraction.placeholders.contains(&Triple::new(
        "obo:RO_0002436",
        "rdfs:label",
        "?obo_RO_0002436_Name"
    )));

    let results = QueryResults::from_json_str(DRUG_RESULTS).unwrap();
    let population = engine.populate(&abstraction, &results).unwrap();
    let graph = &population.graph;

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.component_count(), 1);

    let aspirin = graph.node("aspirin").unwrap();
    assert_eq!(aspirin.labels, vec!["aspirin", "acetylsalicylic acid"]);
    assert_eq!(aspirin.id, vec!["DB001", "DB001b"]);
    assert_eq!(aspirin.bio, "D1");
    assert_eq!(aspirin.entity_type, "drug");
    assert_eq!(graph.node("PTGS2").unwrap().id, vec!["UP2"]);

    for target in ["PTGS1", "PTGS2"] {
        let edge = graph.edge("aspirin", target).unwrap();
        assert_eq!(edge.labels.as_deref(), Some("molecularly interacts with"));
        assert_eq!(edge.id.as_deref(), Some("obo:RO_0002436"));
        assert_eq!(edge.edge, "drug-protein");
    }
    assert!(graph.edge("PTGS1", "aspirin").is_none());

    assert_eq!(
        population.document.metadata["drug, protein"],
        vec![
            ["?restriction", "owl:onProperty", "obo:RO_0002436"].map(String::from),
            ["?restriction", "owl:someValuesFrom", "?protein"].map(String::from),
            ["?restriction", "rdf:type", "owl:Restriction"].map(String::from),
        ]
    );
}

#[test]
fn interchange_file_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let triples_path = write(dir.path(), "query.txt", DRUG_QUERY);
    let results_path = write(dir.path(), "results.json", DRUG_RESULTS);
    let output = dir.path().join("nets.json");

    let engine = Engine::default();
    let text = std::fs::read_to_string(&triples_path).unwrap();
    let abstraction = engine.abstract_query(&parse_triples(&text).unwrap()).unwrap();
    let results = QueryResults::from_path(&results_path).unwrap();
    let population = engine.populate(&abstraction, &results).unwrap();
    population.document.write_to(&output).unwrap();

    let loaded = InterchangeDocument::read_from(&output).unwrap();
    assert_eq!(loaded, population.document);

    let graph = loaded.to_graph();
    assert_eq!(graph.node_count(), population.graph.node_count());
    for (name, attrs) in population.graph.nodes() {
        assert_eq!(graph.node(name), Some(attrs));
    }
    for (source, target, attrs) in population.graph.edges() {
        assert_eq!(graph.edge(source, target), Some(attrs));
    }
}

#[test]
fn owl_graph_keeps_restrictions() {
    let engine = Engine::default();
    let abstraction = engine
        .abstract_query(&parse_triples(DRUG_QUERY).unwrap())
        .unwrap();
    let results = QueryResults::from_json_str(DRUG_RESULTS).unwrap();
    let owl = engine.owl_graph(&abstraction, &results);

    assert_eq!(owl.node("R1").unwrap().node_type, "restriction");
    assert_eq!(owl.edge("R2", "P2").unwrap().predicate, "owl:someValuesFrom");
    assert_eq!(owl.edge("DB001b", "D1").unwrap().triple, "?drug_ice-obo:IAO_0000219-?drug");

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("owl.json");
    owl.to_document().write_to(&path).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["nodes"].as_array().unwrap().len(), owl.node_count());
}

#[test]
fn shared_identifier_is_fatal() {
    let triples = parse_triples("e1 IAO_0000219 r1\nr2 IAO_0000219 r1\n").unwrap();
    let err = Engine::default().abstract_query(&triples).unwrap_err();
    assert!(matches!(
        err,
        NetsError::Classify(ClassifyError::AmbiguousEntitySource { count: 2, .. })
    ));
}

#[test]
fn label_only_query_has_single_entity() {
    let triples = parse_triples("e1 rdfs:label e1_Name\n").unwrap();
    let abstraction = Engine::default().abstract_query(&triples).unwrap();
    assert_eq!(abstraction.entities.iter().collect::<Vec<_>>(), vec!["e1"]);
    assert_eq!(abstraction.oriented_edges().count(), 0);
}

#[test]
fn restriction_scenario_orients_e1_to_e2() {
    let triples = parse_triples(
        "r1 rdf:type owl:Restriction\nr1 onProperty p\nr1 someValuesFrom e2\ne1 p r1\n\
         e1 rdfs:label l1\ne2 rdfs:label l2\n",
    )
    .unwrap();
    let abstraction = Engine::default().abstract_query(&triples).unwrap();
    assert_eq!(
        abstraction.oriented_edges().collect::<Vec<_>>(),
        vec![&OrientedEdge::new("e1", "e2")]
    );
}

#[test]
fn unlabelled_value_fails_population() {
    let engine = Engine::default();
    let abstraction = engine
        .abstract_query(&parse_triples(DRUG_QUERY).unwrap())
        .unwrap();
    let results = QueryResults::from_rows([
        vec![
            ("drug", "D1"),
            ("drug_name", "aspirin"),
            ("protein", "P1"),
            ("protein_name", "PTGS1"),
        ],
        vec![("drug", "D2"), ("protein", "P1"), ("protein_name", "PTGS1")],
    ]);
    let err = engine.populate(&abstraction, &results).unwrap_err();
    assert!(matches!(
        err,
        NetsError::Record(RecordError::KeyCountMismatch { .. })
    ));
}

#[test]
fn config_file_changes_label_rules() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "nets.toml",
        r#"
        [[label_rules]]
        pattern = "owl:"
        matcher = "prefix"
        priority = 0
        "#,
    );
    let engine = Engine::new(NetsConfig::load(&path).unwrap()).unwrap();
    let abstraction = engine
        .abstract_query(&parse_triples(DRUG_QUERY).unwrap())
        .unwrap();
    assert_eq!(
        abstraction.provenance[0].ontology_id(),
        Some("owl:Restriction")
    );
}

/// `?e0 → ?e1 → … → ?e{n-1}`, each hop through its own restriction.
fn chain_query(n: usize) -> Vec<Triple> {
    let mut text = String::new();
    for i in 0..n {
        text.push_str(&format!("?e{i}_ice obo:IAO_0000219 ?e{i}\n"));
        if i + 1 < n {
            text.push_str(&format!("?e{i} rdfs:subClassOf ?r{i}\n"));
            text.push_str(&format!("?r{i} rdf:type owl:Restriction\n"));
            text.push_str(&format!("?r{i} owl:onProperty obo:RO_{i:07}\n"));
            text.push_str(&format!("?r{i} owl:someValuesFrom ?e{}\n", i + 1));
        }
    }
    parse_triples(&text).unwrap()
}

#[test]
fn chain_edges_never_loop() {
    for n in 2..=8 {
        let abstraction = Engine::default().abstract_query(&chain_query(n)).unwrap();
        let edges: Vec<&OrientedEdge> = abstraction.oriented_edges().collect();

        assert_eq!(edges.len(), n - 1, "chain of {n}");
        assert_eq!(abstraction.ambiguous().count(), 0);
        for edge in &edges {
            assert_ne!(edge.subject, edge.object, "self-loop in chain of {n}");
        }
        for i in 0..n - 1 {
            let expected = OrientedEdge::new(format!("?e{i}"), format!("?e{}", i + 1));
            assert!(edges.contains(&&expected), "missing {expected} in chain of {n}");
        }
    }
}

#[test]
fn chain_metadata_stays_on_its_edge() {
    let abstraction = Engine::default().abstract_query(&chain_query(4)).unwrap();
    assert_eq!(abstraction.provenance.len(), 3);

    for provenance in &abstraction.provenance {
        let i = provenance.edge.subject.trim_start_matches("?e");
        let own = format!("?r{i}");
        assert_eq!(provenance.triples.len(), 3, "{}", provenance.edge);
        assert!(
            provenance.triples.iter().all(|t| t.subject == own),
            "{} leaked {:?}",
            provenance.edge,
            provenance.triples
        );
        assert_eq!(provenance.ontology_id(), Some(format!("obo:RO_{i:0>7}").as_str()));
    }
}
