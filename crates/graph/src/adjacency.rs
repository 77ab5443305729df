//! Incidence index for neighbour lookups.
//!
//! The index is a materialized view of the graph's edge map. Each node slot
//! maps to the signed ids of the edges touching it: a stored edge appears as
//! its positive id under its source and as its negated id (the reverse view)
//! under its target. Reading the list of a node therefore yields every edge
//! leaving it, including reverse views.

use std::collections::HashMap;

use crate::edge::Edge;
use crate::types::{EdgeId, NodeIx};

/// Node slot → outgoing signed edge ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyIndex {
    lists: HashMap<NodeIx, Vec<EdgeId>>,
}

impl AdjacencyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from stored edges.
    pub fn from_edges<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Self {
        let mut idx = Self::new();
        for edge in edges {
            idx.add_edge(edge);
        }
        idx
    }

    /// Register a stored edge and its reverse view.
    pub fn add_edge(&mut self, edge: &Edge) {
        self.lists.entry(edge.source).or_default().push(edge.id);
        self.lists.entry(edge.target).or_default().push(edge.id.reversed());
    }

    /// Forget a stored edge and its reverse view.
    pub fn remove_edge(&mut self, edge: &Edge) {
        let id = edge.id;
        if let Some(list) = self.lists.get_mut(&edge.source) {
            list.retain(|e| *e != id);
        }
        if let Some(list) = self.lists.get_mut(&edge.target) {
            list.retain(|e| *e != id.reversed());
        }
    }

    /// Drop the list of a node.
    pub fn remove_node(&mut self, ix: NodeIx) {
        self.lists.remove(&ix);
    }

    /// Signed ids leaving `ix`.
    pub fn entries(&self, ix: NodeIx) -> &[EdgeId] {
        self.lists.get(&ix).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of entries; twice the number of indexed edges.
    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    /// Whether nothing is indexed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
