//! Reference shortest-path algorithms and heuristic checks.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::graph::Graph;
use crate::types::{EdgeId, NodeIx};

#[derive(Debug, PartialEq)]
struct Frontier {
    cost: f64,
    node: NodeIx,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn shortest_paths(graph: &Graph, origin: NodeIx, use_weights: bool, backwards: bool) -> HashMap<String, f64> {
    let mut dist: HashMap<NodeIx, f64> = graph
        .get_all_nodes()
        .map(|n| (n.ix(), f64::INFINITY))
        .collect();
    if !dist.contains_key(&origin) {
        return graph.get_all_nodes().map(|n| (n.id().to_string(), f64::INFINITY)).collect();
    }
    dist.insert(origin, 0.0);
    let mut heap = BinaryHeap::from([Frontier { cost: 0.0, node: origin }]);
    while let Some(Frontier { cost, node }) = heap.pop() {
        if cost > dist.get(&node).copied().unwrap_or(f64::INFINITY) {
            continue;
        }
        let steps: Vec<(NodeIx, f64)> = if backwards {
            graph
                .get_incoming_edges(node, false)
                .map(|e| (e.source_ix(), e.weight()))
                .collect()
        } else {
            graph
                .get_adjacent_edges(node, false)
                .map(|e| (e.target_ix(), e.weight()))
                .collect()
        };
        for (next, weight) in steps {
            let candidate = cost + if use_weights { weight } else { 1.0 };
            if candidate < dist.get(&next).copied().unwrap_or(f64::INFINITY) {
                dist.insert(next, candidate);
                heap.push(Frontier {
                    cost: candidate,
                    node: next,
                });
            }
        }
    }
    dist.into_iter()
        .filter_map(|(ix, d)| graph.node(ix).map(|n| (n.id().to_string(), d)))
        .collect()
}

/// Distance from `start` to every node, keyed by node id.
///
/// Unreachable nodes map to infinity. With `use_weights` false every step
/// costs 1.
pub fn dijkstra(graph: &Graph, start: NodeIx, use_weights: bool) -> HashMap<String, f64> {
    shortest_paths(graph, start, use_weights, false)
}

/// Weighted distance from every node to `goal`, following edges backwards.
pub fn distances_to(graph: &Graph, goal: NodeIx) -> HashMap<String, f64> {
    shortest_paths(graph, goal, true, true)
}

/// A node whose heuristic overestimates its distance to the goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Inadmissible {
    /// Node id.
    pub node: String,
    /// Its heuristic.
    pub heuristic: f64,
    /// True distance to the goal.
    pub distance: f64,
}

/// A traversable edge across which the heuristic drops by more than its weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Inconsistent {
    /// Signed id of the offending direction.
    pub edge: EdgeId,
    /// Heuristic at the source.
    pub source_heuristic: f64,
    /// Edge weight.
    pub weight: f64,
    /// Heuristic at the target.
    pub target_heuristic: f64,
}

/// Nodes whose heuristic exceeds their true distance to the graph's goal.
pub fn inadmissible_nodes(graph: &Graph) -> Vec<Inadmissible> {
    let Some(goal) = graph.end_ix() else {
        return Vec::new();
    };
    let distances = distances_to(graph, goal);
    graph
        .get_all_nodes()
        .filter_map(|n| {
            let heuristic = graph.heuristic(n.ix());
            let distance = distances.get(n.id()).copied().unwrap_or(f64::INFINITY);
            (heuristic > distance).then(|| Inadmissible {
                node: n.id().to_string(),
                heuristic,
                distance,
            })
        })
        .collect()
}

/// Edge directions violating `h(source) - w <= h(target)`.
pub fn inconsistent_edges(graph: &Graph) -> Vec<Inconsistent> {
    let mut out = Vec::new();
    for edge in graph.get_all_edges() {
        for view in [edge, edge.reverse()] {
            if !view.traversable() {
                continue;
            }
            let source_heuristic = graph.heuristic(view.source_ix());
            let target_heuristic = graph.heuristic(view.target_ix());
            let weight = view.weight();
            if source_heuristic - weight > target_heuristic {
                out.push(Inconsistent {
                    edge: view.id(),
                    source_heuristic,
                    weight,
                    target_heuristic,
                });
            }
        }
    }
    out
}

/// Whether no node's heuristic overestimates its distance to the goal.
pub fn heuristic_is_admissible(graph: &Graph) -> bool {
    inadmissible_nodes(graph).is_empty()
}
