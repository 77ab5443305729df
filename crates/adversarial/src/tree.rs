//! The game tree.
//!
//! The tree is an ordinary free-form [`Graph`] so renderers and the Property
//! Protocol see it like any other graph. Node ids are position ids, node data
//! holds `expanded` and `pathCount`, and every move is a directed edge whose
//! data holds its `action`.
//!
//! Positions and per-search state live beside the graph in slots that share
//! the graph's node indices. Nodes are never removed from a game tree, so the
//! two stay aligned.

use std::collections::HashSet;

use plyboard_core::{DataBag, PlyError, PlyResult, Queue, Value};
use plyboard_graph::{EdgeId, Graph, NodeIx};
use tracing::debug;

use crate::case::{Action, Move, Position};

/// Per-position state kept next to the tree node.
#[derive(Debug, Clone)]
pub struct TreeEntry<P> {
    /// Canonical instance for this position id.
    pub position: P,
    /// Moves found by expansion, `None` until expanded.
    pub moves: Option<Vec<Move>>,
    /// Moves achieving the utility, as chosen by the last algorithm run.
    pub best_moves: Vec<Move>,
    /// Value assigned by the last algorithm run.
    pub utility: Option<f64>,
}

impl<P> TreeEntry<P> {
    fn new(position: P) -> Self {
        Self {
            position,
            moves: None,
            best_moves: Vec::new(),
            utility: None,
        }
    }
}

/// Game tree rooted at one position.
#[derive(Debug, Clone)]
pub struct GameTree<P> {
    graph: Graph,
    entries: Vec<TreeEntry<P>>,
    root: NodeIx,
}

impl<P: Position> GameTree<P> {
    /// Tree holding only `root`.
    pub fn new(root: P) -> PlyResult<Self> {
        let mut tree = Self {
            graph: Graph::generic(),
            entries: Vec::new(),
            root: 0,
        };
        let (root, _) = tree.ensure_node(root)?;
        tree.root = root;
        Ok(tree)
    }

    /// Underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mutable graph, for presentation edits.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Root node.
    pub fn root(&self) -> NodeIx {
        self.root
    }

    /// Re-root the tree, creating the node when the position is new.
    pub fn set_root(&mut self, position: P) -> PlyResult<NodeIx> {
        let (ix, _) = self.ensure_node(position)?;
        self.root = ix;
        Ok(ix)
    }

    /// Number of positions in the tree.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree is empty. A constructed tree always holds its root.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Node of the position with this id.
    pub fn node_ix(&self, id: &str) -> Option<NodeIx> {
        self.graph.node_ix(id)
    }

    /// State kept for `ix`.
    pub fn entry(&self, ix: NodeIx) -> Option<&TreeEntry<P>> {
        self.entries.get(ix)
    }

    pub(crate) fn entry_mut(&mut self, ix: NodeIx) -> Option<&mut TreeEntry<P>> {
        self.entries.get_mut(ix)
    }

    /// Canonical position at `ix`.
    pub fn position(&self, ix: NodeIx) -> Option<&P> {
        self.entries.get(ix).map(|e| &e.position)
    }

    /// Utility from the last algorithm run.
    pub fn utility(&self, ix: NodeIx) -> Option<f64> {
        self.entries.get(ix).and_then(|e| e.utility)
    }

    /// Whether `ix` has been expanded.
    pub fn is_expanded(&self, ix: NodeIx) -> bool {
        self.graph
            .node(ix)
            .and_then(|n| n.data.get_bool("expanded"))
            .unwrap_or(false)
    }

    /// Leaf paths running through `ix`.
    pub fn path_count(&self, ix: NodeIx) -> u64 {
        self.graph
            .node(ix)
            .and_then(|n| n.data.get("pathCount"))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Find the node for `position` by id or add it.
    ///
    /// Returns the node and whether it was created. An existing node keeps
    /// its canonical position.
    pub fn ensure_node(&mut self, position: P) -> PlyResult<(NodeIx, bool)> {
        let id = position.id();
        if let Some(ix) = self.graph.node_ix(&id) {
            return Ok((ix, false));
        }
        let mut data = DataBag::new();
        data.set("expanded", false);
        data.set("pathCount", 1u64);
        let ix = self.graph.add_node(id.as_str(), data)?;
        if ix != self.entries.len() {
            return Err(PlyError::runtime(format!(
                "Game tree node {} for position \"{}\" is out of step with its state slots.",
                ix, id
            )));
        }
        self.entries.push(TreeEntry::new(position));
        Ok((ix, true))
    }

    /// Record a move edge from `from` to `to`.
    pub(crate) fn add_move_edge(&mut self, from: NodeIx, to: NodeIx, action: &Action) -> PlyResult<EdgeId> {
        let mut data = DataBag::new();
        data.set("action", action.clone().into_value());
        self.graph.add_edge(from, to, false, data)
    }

    /// Flag `ix` as expanded and cache its moves.
    pub(crate) fn mark_expanded(&mut self, ix: NodeIx, moves: Vec<Move>) {
        if let Some(node) = self.graph.node_mut(ix) {
            node.data.set("expanded", true);
        }
        if let Some(entry) = self.entries.get_mut(ix) {
            entry.moves = Some(moves);
        }
    }

    /// Moves read back from the outgoing edges of `ix`.
    pub fn moves_from_edges(&self, ix: NodeIx) -> Vec<Move> {
        self.graph
            .get_adjacent_edges(ix, false)
            .filter_map(|view| {
                let target = view.target()?;
                let action = view
                    .data()
                    .get("action")
                    .cloned()
                    .and_then(|v| DataBag::from_value(v).ok())
                    .unwrap_or_default();
                Some(Move {
                    position_id: target.id().to_string(),
                    node: target.ix(),
                    action,
                })
            })
            .collect()
    }

    /// Add `delta` to the path count of `ix` and of every ancestor, each once.
    ///
    /// Returns how many nodes were touched.
    pub(crate) fn add_path_count(&mut self, ix: NodeIx, delta: u64) -> usize {
        let mut queue: Queue<NodeIx> = Queue::new();
        let mut seen = HashSet::new();
        queue.enqueue(ix);
        seen.insert(ix);
        while let Ok(current) = queue.dequeue() {
            let count = self.path_count(current);
            if let Some(node) = self.graph.node_mut(current) {
                node.data.set("pathCount", count + delta);
            }
            let parents: Vec<NodeIx> = self
                .graph
                .get_incoming_edges(current, false)
                .map(|view| view.source_ix())
                .collect();
            for parent in parents {
                if seen.insert(parent) {
                    queue.enqueue(parent);
                }
            }
        }
        debug!(node = ix, delta, touched = seen.len(), "path counts updated");
        seen.len()
    }

    /// Forget every utility and best move.
    pub fn reset_utilities(&mut self) {
        for entry in &mut self.entries {
            entry.utility = None;
            entry.best_moves.clear();
        }
    }

    /// Follow the first best move from `from` until none is recorded.
    ///
    /// Stops before revisiting a position.
    pub fn best_move_chain(&self, from: NodeIx) -> Vec<Move> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = from;
        seen.insert(current);
        while let Some(next) = self.entries.get(current).and_then(|e| e.best_moves.first()) {
            if !seen.insert(next.node) {
                break;
            }
            chain.push(next.clone());
            current = next.node;
        }
        chain
    }

    /// Highlight the edges walked by `moves` starting at `from`, clearing
    /// any previous highlight.
    pub fn highlight_moves(&mut self, from: NodeIx, moves: &[Move]) {
        let all: Vec<EdgeId> = self.graph.get_all_edges().map(|e| e.id()).collect();
        for id in all {
            if let Some(edge) = self.graph.edge_mut(id) {
                edge.data.set("highlighted", false);
            }
        }
        let mut current = from;
        for mv in moves {
            let Some(id) = self.graph.get_edge(current, mv.node, false).map(|view| view.id()) else {
                break;
            };
            if let Some(edge) = self.graph.edge_mut(id) {
                edge.data.set("highlighted", true);
            }
            current = mv.node;
        }
    }
}
