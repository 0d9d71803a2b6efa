//! BFS traversal over the statement graph.
//!
//! Every traversal expands neighbours in lexicographic order of their terms,
//! so that when several shortest paths exist the same one is always chosen.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::has_path_connecting;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::{StatementGraph, Triple};

/// Undirected neighbours of `idx`, deduplicated and sorted by term.
fn sorted_neighbors(graph: &StatementGraph, idx: NodeIndex) -> Vec<NodeIndex> {
    let mut neighbors: Vec<NodeIndex> = graph.graph().neighbors_undirected(idx).collect();
    neighbors.sort_by(|a, b| graph.term(*a).cmp(graph.term(*b)));
    neighbors.dedup();
    neighbors
}

/// Hop distances from `source` to every node reachable when edge direction
/// is ignored. The source itself is at distance 0.
pub fn undirected_distances<'g>(
    graph: &'g StatementGraph,
    source: &str,
) -> HashMap<&'g str, usize> {
    let mut distances = HashMap::new();
    let Some(start) = graph.index_of(source) else {
        return distances;
    };

    let mut queue = VecDeque::from([(start, 0usize)]);
    distances.insert(graph.term(start), 0);

    while let Some((node, depth)) = queue.pop_front() {
        for next in sorted_neighbors(graph, node) {
            let term = graph.term(next);
            if !distances.contains_key(term) {
                distances.insert(term, depth + 1);
                queue.push_back((next, depth + 1));
            }
        }
    }
    distances
}

/// Canonical shortest path between two terms, ignoring edge direction.
///
/// Returns the terms on the path including both endpoints, or `None` when
/// either term is missing or no path exists.
pub fn shortest_undirected_path(
    graph: &StatementGraph,
    from: &str,
    to: &str,
) -> Option<Vec<String>> {
    let start = graph.index_of(from)?;
    let goal = graph.index_of(to)?;

    let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        if node == goal {
            let mut path = vec![graph.term(goal).to_string()];
            let mut cursor = goal;
            while let Some(&prev) = parent.get(&cursor) {
                path.push(graph.term(prev).to_string());
                cursor = prev;
            }
            path.reverse();
            return Some(path);
        }
        for next in sorted_neighbors(graph, node) {
            if visited.insert(next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Whether a directed path leads from `from` to `to`.
pub fn reaches(graph: &StatementGraph, from: &str, to: &str) -> bool {
    match (graph.index_of(from), graph.index_of(to)) {
        (Some(a), Some(b)) => has_path_connecting(graph.graph(), a, b, None),
        _ => false,
    }
}

/// Every edge of the forward BFS tree rooted at `from`, not expanding past
/// boundary nodes.
///
/// Captures the chain of statements hanging off a term (subclass and extension
/// chains several hops deep) without revisiting shared nodes. An edge into a
/// boundary node is kept but the walk stops there; a boundary root yields nothing.
pub fn forward_chain(
    graph: &StatementGraph,
    from: &str,
    is_boundary: impl Fn(&str) -> bool,
) -> Vec<Triple> {
    let Some(start) = graph.index_of(from) else {
        return vec![];
    };
    if is_boundary(from) {
        return vec![];
    }

    let mut chain = Vec::new();
    let mut visited: HashSet<NodeIndex> = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        let mut edges: Vec<_> = graph
            .graph()
            .edges_directed(node, Direction::Outgoing)
            .collect();
        edges.sort_by(|a, b| graph.term(a.target()).cmp(graph.term(b.target())));
        for edge in edges {
            let target = edge.target();
            if visited.insert(target) {
                chain.push(Triple::new(
                    graph.term(node),
                    edge.weight().as_str(),
                    graph.term(target),
                ));
                if !is_boundary(graph.term(target)) {
                    queue.push_back(target);
                }
            }
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(lines: &[&str]) -> StatementGraph {
        let triples: Vec<Triple> = lines.iter().map(|l| Triple::parse(l).unwrap()).collect();
        StatementGraph::from_triples(&triples).unwrap()
    }

    #[test]
    fn distances_ignore_direction() {
        // a -> b <- c -> d
        let g = build(&["a p b", "c p b", "c p d"]);
        let d = undirected_distances(&g, "a");
        assert_eq!(d["a"], 0);
        assert_eq!(d["b"], 1);
        assert_eq!(d["c"], 2);
        assert_eq!(d["d"], 3);
        assert!(undirected_distances(&g, "zzz").is_empty());
    }

    #[test]
    fn path_prefers_lexicographic_branch() {
        // two routes from s to t of equal length: via m and via k
        let g = build(&["s p m", "m p t", "s q k", "k q t"]);
        let path = shortest_undirected_path(&g, "s", "t").unwrap();
        assert_eq!(path, vec!["s", "k", "t"]);
    }

    #[test]
    fn path_to_self_is_single_node() {
        let g = build(&["a p b"]);
        assert_eq!(shortest_undirected_path(&g, "a", "a").unwrap(), vec!["a"]);
        assert!(shortest_undirected_path(&g, "a", "nope").is_none());
    }

    #[test]
    fn reachability_is_directed() {
        let g = build(&["r p x", "y p r"]);
        assert!(reaches(&g, "r", "x"));
        assert!(!reaches(&g, "r", "y"));
        assert!(reaches(&g, "y", "x"));
    }

    #[test]
    fn forward_chain_walks_subclass_hops() {
        let g = build(&[
            "?r owl:someValuesFrom ccp:A",
            "ccp:A rdfs:subClassOf ccp:B",
            "ccp:B rdfs:subClassOf obo:C",
            "ccp:A rdfs:comment ccp:note",
        ]);
        let chain = forward_chain(&g, "ccp:A", |_| false);
        assert_eq!(
            chain,
            vec![
                Triple::new("ccp:A", "rdfs:subClassOf", "ccp:B"),
                Triple::new("ccp:A", "rdfs:comment", "ccp:note"),
                Triple::new("ccp:B", "rdfs:subClassOf", "obo:C"),
            ]
        );
        assert!(forward_chain(&g, "obo:C", |_| false).is_empty());
    }

    #[test]
    fn forward_chain_stops_at_boundary() {
        let g = build(&[
            "?p rdfs:subPropertyOf ?q",
            "?q rdfs:range ?e",
            "?e rdfs:subClassOf ?r",
            "?r owl:someValuesFrom ?f",
        ]);
        let chain = forward_chain(&g, "?p", |term| term == "?e");
        assert_eq!(
            chain,
            vec![
                Triple::new("?p", "rdfs:subPropertyOf", "?q"),
                Triple::new("?q", "rdfs:range", "?e"),
            ]
        );
        assert!(forward_chain(&g, "?e", |term| term == "?e").is_empty());
    }
}
