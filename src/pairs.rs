//! Nearest-neighbour pairing of entity nodes.
//!
//! Two entity nodes become a provisional NETS edge when no other entity node is
//! closer to the first one in the projected statement graph. Distances ignore
//! edge direction; direction is decided later by [`crate::orient`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::classify::EntitySet;
use crate::graph::StatementGraph;
use crate::graph::traverse::undirected_distances;

/// An unordered pair of nearest entity nodes.
///
/// `first` is the node whose neighbourhood produced the pair. The order
/// carries no relationship direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidatePair {
    pub first: String,
    pub second: String,
}

impl CandidatePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// Order-independent key: the two terms sorted.
    fn key(&self) -> (String, String) {
        if self.first <= self.second {
            (self.first.clone(), self.second.clone())
        } else {
            (self.second.clone(), self.first.clone())
        }
    }
}

/// Pair every entity node with its nearest entity nodes.
///
/// Runs one BFS per entity node. Entity nodes unreachable from each other are
/// never paired. A pair already recorded in either order is not added again.
pub fn find_pairs(projected: &StatementGraph, entities: &EntitySet) -> Vec<CandidatePair> {
    let mut seen: BTreeSet<(String, String)> = BTreeSet::new();
    let mut pairs = Vec::new();

    for source in entities.iter() {
        let distances = undirected_distances(projected, source);
        let nearest = entities
            .iter()
            .filter(|&target| target != source)
            .filter_map(|target| distances.get(target).copied())
            .filter(|&d| d > 0)
            .min();
        let Some(nearest) = nearest else {
            tracing::debug!(entity = source, "no reachable entity neighbour");
            continue;
        };

        for target in entities.iter() {
            if target == source || distances.get(target) != Some(&nearest) {
                continue;
            }
            let pair = CandidatePair::new(source, target);
            if seen.insert(pair.key()) {
                tracing::debug!(
                    first = source,
                    second = target,
                    distance = nearest,
                    "paired entities"
                );
                pairs.push(pair);
            }
        }
    }

    tracing::info!(pairs = pairs.len(), "found nearest entity pairs");
    pairs
}
