//! The graph model.
//!
//! A [`Graph`] owns its nodes in an arena (`Vec<Option<Node>>`, slots never
//! reused) and its stored edges in an id-ordered map. Neighbour queries go
//! through an [`AdjacencyIndex`] that is rebuilt lazily:
//!
//! - structural edits only raise the lookup-dirty flag
//! - every adjacency read first calls [`Graph::ensure_lookup_clean`], which
//!   rebuilds the whole index from the edge map if the flag is set
//!
//! A separate render-dirty flag tells the host to redraw.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use plyboard_core::{DataBag, PlyError, PlyResult};
use tracing::debug;

use crate::adjacency::AdjacencyIndex;
use crate::edge::{Edge, EdgeView};
use crate::node::Node;
use crate::types::{DiagonalWeight, EdgeId, NodeIx, SearchOutcome};

/// Dimensions and diagonal mode of a grid graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Cost of template diagonals.
    pub diagonal: DiagonalWeight,
}

/// Free-form graph or rectangular lattice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// No implicit nodes or edges.
    Generic,
    /// Full `width × height` lattice wired by the 8-neighbourhood template.
    Grid(GridSpec),
}

/// Directed graph with bidirectional edges and derived reverse views.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) shape: Shape,
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) node_lookup: HashMap<String, NodeIx>,
    pub(crate) edges: BTreeMap<EdgeId, Edge>,
    pub(crate) adjacency: RefCell<AdjacencyIndex>,
    pub(crate) lookup_dirty: Cell<bool>,
    pub(crate) render_dirty: bool,
    pub(crate) start: Option<NodeIx>,
    pub(crate) end: Option<NodeIx>,
    pub(crate) outcome: SearchOutcome,
    pub(crate) edge_counter: i64,
    /// Newly created edges are bidirectional.
    pub default_bidirectional: bool,
    /// Host-side layout hint.
    pub physics_enabled: bool,
}

impl Default for Graph {
    fn default() -> Self {
        Self::generic()
    }
}

impl Graph {
    /// Create an empty free-form graph.
    pub fn generic() -> Self {
        Self {
            shape: Shape::Generic,
            nodes: Vec::new(),
            node_lookup: HashMap::new(),
            edges: BTreeMap::new(),
            adjacency: RefCell::new(AdjacencyIndex::new()),
            lookup_dirty: Cell::new(false),
            render_dirty: false,
            start: None,
            end: None,
            outcome: SearchOutcome::None,
            edge_counter: 1,
            default_bidirectional: false,
            physics_enabled: true,
        }
    }

    /// Shape of the graph.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Grid parameters, `None` for free-form graphs.
    pub fn grid_spec(&self) -> Option<GridSpec> {
        match self.shape {
            Shape::Grid(spec) => Some(spec),
            Shape::Generic => None,
        }
    }

    /// Whether this is a grid graph.
    pub fn is_grid(&self) -> bool {
        matches!(self.shape, Shape::Grid(_))
    }

    // =========================================================================
    // Dirty flags
    // =========================================================================

    /// Mark the adjacency index stale.
    pub fn mark_dirty_lookup(&self) {
        self.lookup_dirty.set(true);
    }

    /// Request a redraw.
    pub fn mark_dirty_render(&mut self) {
        self.render_dirty = true;
    }

    /// Mark both flags.
    pub fn mark_dirty_all(&mut self) {
        self.mark_dirty_lookup();
        self.mark_dirty_render();
    }

    /// Acknowledge a redraw.
    pub fn mark_clean_render(&mut self) {
        self.render_dirty = false;
    }

    /// Adjacency index is stale.
    pub fn is_dirty_lookup(&self) -> bool {
        self.lookup_dirty.get()
    }

    /// A redraw is pending.
    pub fn is_dirty_render(&self) -> bool {
        self.render_dirty
    }

    /// Rebuild the adjacency index from the edge map if it is stale.
    pub fn ensure_lookup_clean(&self) {
        if !self.lookup_dirty.get() {
            return;
        }
        let rebuilt = AdjacencyIndex::from_edges(self.edges.values());
        debug!(edges = self.edges.len(), "rebuilt adjacency index");
        *self.adjacency.borrow_mut() = rebuilt;
        self.lookup_dirty.set(false);
    }

    fn outgoing_ids(&self, ix: NodeIx) -> Vec<EdgeId> {
        self.ensure_lookup_clean();
        self.adjacency.borrow().entries(ix).to_vec()
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub(crate) fn insert_node(&mut self, id: String, x: usize, y: usize, data: DataBag) -> PlyResult<NodeIx> {
        if self.node_lookup.contains_key(&id) {
            return Err(PlyError::runtime(format!(
                "Node with id \"{}\" already exists in the graph.",
                id
            )));
        }
        let ix = self.nodes.len();
        self.node_lookup.insert(id.clone(), ix);
        self.nodes.push(Some(Node::new(ix, id, x, y, data)));
        self.mark_dirty_render();
        Ok(ix)
    }

    /// Add a node to a free-form graph.
    ///
    /// Grid nodes come from the lattice; grow the grid instead.
    pub fn add_node(&mut self, id: impl Into<String>, data: DataBag) -> PlyResult<NodeIx> {
        if self.is_grid() {
            return Err(PlyError::runtime(
                "Grid Graph nodes are created by the lattice, modify the grid size instead.",
            ));
        }
        self.insert_node(id.into(), 0, 0, data)
    }

    /// Drop a node and every edge touching it.
    pub(crate) fn drop_node(&mut self, ix: NodeIx) -> Option<Node> {
        let node = self.nodes.get_mut(ix)?.take()?;
        self.node_lookup.remove(&node.id);
        self.edges.retain(|_, e| e.source != ix && e.target != ix);
        self.adjacency.borrow_mut().remove_node(ix);
        if self.start == Some(ix) {
            self.start = None;
        }
        if self.end == Some(ix) {
            self.end = None;
        }
        self.mark_dirty_all();
        Some(node)
    }

    /// Remove a node from a free-form graph.
    ///
    /// Fails on grids and for the current start or goal. Returns `Ok(false)`
    /// when no such node exists.
    pub fn remove_node(&mut self, ix: NodeIx) -> PlyResult<bool> {
        if self.is_grid() {
            return Err(PlyError::runtime(
                "Grid Graph nodes may not be deleted, modify the grid size instead.",
            ));
        }
        if self.end == Some(ix) {
            return Err(PlyError::runtime(
                "Cannot delete the goal node of the graph. Set another node as the goal first.",
            ));
        }
        if self.start == Some(ix) {
            return Err(PlyError::runtime(
                "Cannot delete the start node of the graph. Set another node as the start first.",
            ));
        }
        Ok(self.drop_node(ix).is_some())
    }

    /// Node in slot `ix`.
    pub fn node(&self, ix: NodeIx) -> Option<&Node> {
        self.nodes.get(ix).and_then(Option::as_ref)
    }

    /// Mutable node in slot `ix`.
    ///
    /// Data edits can change traversability, so the render flag is raised.
    pub fn node_mut(&mut self, ix: NodeIx) -> Option<&mut Node> {
        self.render_dirty = true;
        self.nodes.get_mut(ix).and_then(Option::as_mut)
    }

    /// Slot of the node with `id`.
    pub fn node_ix(&self, id: &str) -> Option<NodeIx> {
        self.node_lookup.get(id).copied()
    }

    /// Node with `id`.
    pub fn get_node_by_id(&self, id: &str) -> Option<&Node> {
        self.node_ix(id).and_then(|ix| self.node(ix))
    }

    /// Slot of the node with `id`, or a runtime error.
    pub fn ensure_node_ix(&self, id: &str) -> PlyResult<NodeIx> {
        self.node_ix(id)
            .ok_or_else(|| PlyError::runtime(format!("Node {} does not exist in the graph.", id)))
    }

    /// Every live node in creation order.
    pub fn get_all_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.node_lookup.len()
    }

    /// Smallest unused numeric id not below the node count.
    pub fn next_node_identifier(&self) -> String {
        let mut candidate = self.node_count();
        while self.node_lookup.contains_key(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Hand out the next stored edge id.
    pub fn next_edge_identifier(&mut self) -> EdgeId {
        let id = EdgeId::stored_from_counter(self.edge_counter);
        self.edge_counter += 1;
        id
    }

    /// Add a stored edge; its reverse view comes with it.
    pub fn add_edge(&mut self, source: NodeIx, target: NodeIx, bidirectional: bool, data: DataBag) -> PlyResult<EdgeId> {
        for ix in [source, target] {
            if self.node(ix).is_none() {
                return Err(PlyError::runtime(format!("Node slot {} is empty.", ix)));
            }
        }
        let id = self.next_edge_identifier();
        self.edges.insert(id, Edge::new(id, source, target, bidirectional, data));
        self.mark_dirty_all();
        Ok(id)
    }

    /// Insert an edge and update a clean index in place.
    pub(crate) fn add_edge_indexed(&mut self, source: NodeIx, target: NodeIx, bidirectional: bool) -> EdgeId {
        let id = self.next_edge_identifier();
        let edge = Edge::new(id, source, target, bidirectional, DataBag::new());
        if !self.lookup_dirty.get() {
            self.adjacency.borrow_mut().add_edge(&edge);
        }
        self.edges.insert(id, edge);
        self.mark_dirty_render();
        id
    }

    /// Remove a stored edge, addressed by either of its ids.
    pub fn remove_edge(&mut self, id: EdgeId) -> PlyResult<Edge> {
        let edge = self
            .edges
            .remove(&id.stored())
            .ok_or_else(|| PlyError::runtime(format!("Edge {} does not exist in the graph.", id)))?;
        self.mark_dirty_all();
        Ok(edge)
    }

    /// Swap the endpoints of a stored edge.
    pub fn reorient_edge(&mut self, id: EdgeId) -> PlyResult<()> {
        let edge = self
            .edges
            .get_mut(&id.stored())
            .ok_or_else(|| PlyError::runtime(format!("Edge {} does not exist in the graph.", id)))?;
        std::mem::swap(&mut edge.source, &mut edge.target);
        self.mark_dirty_all();
        Ok(())
    }

    /// View for a signed id.
    pub fn get_edge_by_id(&self, id: EdgeId) -> Option<EdgeView<'_>> {
        self.edges
            .get(&id.stored())
            .map(|edge| EdgeView::new(self, edge, id.is_reverse()))
    }

    /// Stored edge for a signed id.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.render_dirty = true;
        self.edges.get_mut(&id.stored())
    }

    /// Every stored edge in id order; reverse views are excluded.
    pub fn get_all_edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.edges.values().map(move |edge| EdgeView::new(self, edge, false))
    }

    /// Number of stored edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every edge or view from `source` to `target`.
    ///
    /// The sequence is finite; call again to restart it.
    pub fn get_edges(
        &self,
        source: NodeIx,
        target: NodeIx,
        include_untraversable: bool,
    ) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.get_adjacent_edges(source, include_untraversable)
            .filter(move |view| view.target_ix() == target)
    }

    /// First edge or view from `source` to `target`.
    pub fn get_edge(&self, source: NodeIx, target: NodeIx, include_untraversable: bool) -> Option<EdgeView<'_>> {
        self.get_edges(source, target, include_untraversable).next()
    }

    /// Edges leaving `ix`, reverse views included.
    pub fn get_adjacent_edges(&self, ix: NodeIx, include_untraversable: bool) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.outgoing_ids(ix)
            .into_iter()
            .filter_map(move |id| self.get_edge_by_id(id))
            .filter(move |view| include_untraversable || view.traversable())
    }

    /// Edges arriving at `ix`, as views pointing into it.
    pub fn get_incoming_edges(&self, ix: NodeIx, include_untraversable: bool) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.outgoing_ids(ix)
            .into_iter()
            .filter_map(move |id| self.get_edge_by_id(id.reversed()))
            .filter(move |view| include_untraversable || view.traversable())
    }

    /// Nodes reachable in one traversable step.
    pub fn get_adjacent_nodes(&self, ix: NodeIx) -> impl Iterator<Item = &Node> + '_ {
        self.get_adjacent_edges(ix, false).filter_map(|view| view.target())
    }

    /// Nodes that reach `ix` in one traversable step.
    pub fn get_incoming_nodes(&self, ix: NodeIx) -> impl Iterator<Item = &Node> + '_ {
        self.get_incoming_edges(ix, false).filter_map(|view| view.source())
    }

    // =========================================================================
    // Start, goal and search outcome
    // =========================================================================

    /// Start node.
    pub fn start(&self) -> Option<&Node> {
        self.start.and_then(|ix| self.node(ix))
    }

    /// Goal node.
    pub fn end(&self) -> Option<&Node> {
        self.end.and_then(|ix| self.node(ix))
    }

    /// Start slot.
    pub fn start_ix(&self) -> Option<NodeIx> {
        self.start
    }

    /// Goal slot.
    pub fn end_ix(&self) -> Option<NodeIx> {
        self.end
    }

    fn check_slot(&self, ix: Option<NodeIx>) -> PlyResult<()> {
        match ix {
            Some(ix) if self.node(ix).is_none() => {
                Err(PlyError::runtime(format!("Node slot {} is empty.", ix)))
            }
            _ => Ok(()),
        }
    }

    /// Set or clear the start node.
    pub fn set_start(&mut self, ix: Option<NodeIx>) -> PlyResult<()> {
        self.check_slot(ix)?;
        self.start = ix;
        self.mark_dirty_render();
        Ok(())
    }

    /// Set or clear the goal node.
    pub fn set_end(&mut self, ix: Option<NodeIx>) -> PlyResult<()> {
        self.check_slot(ix)?;
        self.end = ix;
        self.mark_dirty_render();
        Ok(())
    }

    /// Terminal tag of the recorded search.
    pub fn outcome(&self) -> SearchOutcome {
        self.outcome
    }

    /// Tag the search as successful.
    pub fn complete(&mut self) {
        self.outcome = SearchOutcome::Success;
        self.mark_dirty_render();
    }

    /// Clear a success tag.
    pub fn uncomplete(&mut self) {
        self.outcome = SearchOutcome::None;
        self.mark_dirty_render();
    }

    /// Tag the search as failed.
    pub fn fail(&mut self) {
        self.outcome = SearchOutcome::Failure;
        self.mark_dirty_render();
    }

    /// Clear a failure tag.
    pub fn unfail(&mut self) {
        self.outcome = SearchOutcome::None;
        self.mark_dirty_render();
    }

    /// Set a node's step state.
    pub fn set_node_state(&mut self, ix: NodeIx, state: &str) -> PlyResult<()> {
        let node = self
            .node_mut(ix)
            .ok_or_else(|| PlyError::runtime(format!("Node slot {} is empty.", ix)))?;
        node.data.set("state", state);
        Ok(())
    }

    /// Clear everything a replay may have written.
    pub fn reset_step_data(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            node.data.set("state", "");
            node.data.set("highlighted", false);
        }
        for edge in self.edges.values_mut() {
            edge.data.set("highlighted", false);
        }
        self.outcome = SearchOutcome::None;
        self.mark_dirty_render();
    }

    // =========================================================================
    // Heuristic
    // =========================================================================

    /// Heuristic of a node.
    ///
    /// An explicit numeric `h` wins. On grids with a goal the estimate is the
    /// step count with diagonal moves at the grid's diagonal cost; otherwise 0.
    pub fn heuristic(&self, ix: NodeIx) -> f64 {
        let Some(node) = self.node(ix) else {
            return 0.0;
        };
        if let Some(h) = node.data.get_f64("h") {
            return h;
        }
        match (self.shape, self.end()) {
            (Shape::Grid(spec), Some(goal)) => {
                let dx = node.x.abs_diff(goal.x) as f64;
                let dy = node.y.abs_diff(goal.y) as f64;
                distance_with_diagonal_cost(dx, dy, spec.diagonal.effective_cost())
            }
            _ => 0.0,
        }
    }
}

/// Lattice distance where a diagonal step costs `diagonal_cost`.
///
/// At a cost of 2 or more moving orthogonally is never worse, so the result
/// is `dx + dy`; this also covers an infinite cost.
pub fn distance_with_diagonal_cost(dx: f64, dy: f64, diagonal_cost: f64) -> f64 {
    if diagonal_cost >= 2.0 {
        return dx + dy;
    }
    let m = dx.min(dy);
    (dx - m) + (dy - m) + m * diagonal_cost
}
