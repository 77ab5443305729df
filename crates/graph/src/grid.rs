//! Grid-specific operations on [`Graph`].
//!
//! A grid keeps a full `width × height` lattice of nodes with ids `"x_y"`.
//! Template edges join every node to its 8 neighbours: orthogonal ones at the
//! default weight, diagonal ones at the grid's diagonal weight (forbidden when
//! that weight is negative). Template edges are only ever added; blocking a
//! node changes the derived traversability of its edges instead.

use plyboard_core::{DataBag, PlyError, PlyResult};
use tracing::debug;

use crate::graph::{Graph, GridSpec, Shape};
use crate::node::Node;
use crate::types::{DiagonalWeight, NodeIx};

/// Offsets of the 8-neighbourhood template.
pub const ADJACENT_DELTAS: [(i64, i64); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// Relation between two lattice cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatticeStep {
    /// Horizontal or vertical neighbours.
    Orthogonal,
    /// Diagonal neighbours.
    Diagonal,
}

/// Id of the grid node at (x, y).
pub fn grid_node_id(x: usize, y: usize) -> String {
    format!("{}_{}", x, y)
}

impl Graph {
    /// Create a grid with every node traversable.
    pub fn grid(width: usize, height: usize, diagonal: DiagonalWeight) -> PlyResult<Self> {
        let mut graph = Graph::generic();
        graph.shape = Shape::Grid(GridSpec {
            width,
            height,
            diagonal,
        });
        for x in 0..width {
            for y in 0..height {
                graph.insert_node(grid_node_id(x, y), x, y, DataBag::new())?;
            }
        }
        graph.update_all_template_edges()?;
        Ok(graph)
    }

    fn require_grid(&self) -> PlyResult<GridSpec> {
        self.grid_spec()
            .ok_or_else(|| PlyError::runtime("Operation requires a grid graph."))
    }

    /// Node at (x, y).
    pub fn node_by_coords(&self, x: usize, y: usize) -> Option<&Node> {
        self.get_node_by_id(&grid_node_id(x, y))
    }

    /// Slot of the node at (x, y), or a runtime error.
    pub fn ensure_node_by_coords(&self, x: usize, y: usize) -> PlyResult<NodeIx> {
        self.node_ix(&grid_node_id(x, y)).ok_or_else(|| {
            PlyError::runtime(format!(
                "Error during node fetching. Attempted to read node {} in a graph with {} nodes.",
                grid_node_id(x, y),
                self.node_count()
            ))
        })
    }

    /// How two cells relate on the lattice, `None` if they are not neighbours.
    pub fn lattice_step(&self, a: NodeIx, b: NodeIx) -> Option<LatticeStep> {
        let (a, b) = (self.node(a)?, self.node(b)?);
        match (a.x.abs_diff(b.x), a.y.abs_diff(b.y)) {
            (1, 0) | (0, 1) => Some(LatticeStep::Orthogonal),
            (1, 1) => Some(LatticeStep::Diagonal),
            _ => None,
        }
    }

    /// Create the missing template edges around `ix`.
    ///
    /// Existing edges are kept; diagonal ones get the current diagonal weight.
    pub fn update_base_edges(&mut self, ix: NodeIx) -> PlyResult<()> {
        let spec = self.require_grid()?;
        let (x, y) = match self.node(ix) {
            Some(node) => (node.x as i64, node.y as i64),
            None => return Err(PlyError::runtime(format!("Node slot {} is empty.", ix))),
        };
        self.ensure_lookup_clean();
        for (dx, dy) in ADJACENT_DELTAS {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= spec.width as i64 || ny >= spec.height as i64 {
                continue;
            }
            let target = self.ensure_node_by_coords(nx as usize, ny as usize)?;
            let existing = self.get_edge(ix, target, true).map(|view| view.id());
            let id = match existing {
                Some(id) => id,
                None => self.add_edge_indexed(ix, target, true),
            };
            if dx != 0 && dy != 0 {
                let weight = spec.diagonal.value();
                if let Some(edge) = self.edges.get_mut(&id.stored()) {
                    edge.data.set("w", weight);
                    edge.data.set("forbidden", weight < 0.0);
                }
            }
        }
        Ok(())
    }

    /// Re-run [`Graph::update_base_edges`] for every node.
    pub fn update_all_template_edges(&mut self) -> PlyResult<()> {
        let slots: Vec<NodeIx> = self.get_all_nodes().map(Node::ix).collect();
        for ix in slots {
            self.update_base_edges(ix)?;
        }
        self.mark_dirty_render();
        Ok(())
    }

    /// Change the diagonal mode and re-weight template diagonals.
    pub fn set_diagonal(&mut self, diagonal: DiagonalWeight) -> PlyResult<()> {
        let spec = self.require_grid()?;
        self.shape = Shape::Grid(GridSpec { diagonal, ..spec });
        self.update_all_template_edges()
    }

    /// Resize the lattice.
    ///
    /// Fails without changes if the start or goal would be dropped. New cells
    /// are added, cells outside the new bounds are removed with their edges,
    /// and template edges are recomputed with a single index rebuild.
    pub fn set_dimensions(&mut self, width: usize, height: usize) -> PlyResult<()> {
        let spec = self.require_grid()?;
        let doomed: Vec<NodeIx> = self
            .get_all_nodes()
            .filter(|n| n.x >= width || n.y >= height)
            .map(Node::ix)
            .collect();
        if doomed
            .iter()
            .any(|ix| Some(*ix) == self.start || Some(*ix) == self.end)
        {
            return Err(PlyError::runtime(
                "Cannot remove start or end node when resizing the grid graph.",
            ));
        }
        for x in 0..width {
            for y in 0..height {
                if self.node_by_coords(x, y).is_none() {
                    self.insert_node(grid_node_id(x, y), x, y, DataBag::new())?;
                }
            }
        }
        for ix in doomed {
            self.drop_node(ix);
        }
        self.shape = Shape::Grid(GridSpec {
            width,
            height,
            ..spec
        });
        debug!(width, height, nodes = self.node_count(), "resized grid");
        self.update_all_template_edges()
    }
}
