//! Stored edges and their reverse views.

use std::fmt;

use plyboard_core::DataBag;

use crate::graph::Graph;
use crate::node::Node;
use crate::types::{EdgeId, NodeIx};

/// Weight of an edge given its data bag.
///
/// Reads `w`; a missing, zero, non-numeric or NaN value counts as 1.
pub fn weight_of(data: &DataBag) -> f64 {
    match data.get_f64("w") {
        Some(w) if w != 0.0 && !w.is_nan() => w,
        _ => 1.0,
    }
}

/// An edge as stored in the graph's edge map.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub(crate) id: EdgeId,
    pub(crate) source: NodeIx,
    pub(crate) target: NodeIx,
    /// Traversable in both directions.
    pub bidirectional: bool,
    /// Free-form data (`w`, `flipped`, `forbidden`, `label`, ...).
    pub data: DataBag,
    /// Presentation hints.
    pub style: DataBag,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, source: NodeIx, target: NodeIx, bidirectional: bool, data: DataBag) -> Self {
        Self {
            id,
            source,
            target,
            bidirectional,
            data,
            style: DataBag::new(),
        }
    }

    /// Positive id.
    pub fn id(&self) -> EdgeId {
        self.id
    }

    /// Source slot.
    pub fn source(&self) -> NodeIx {
        self.source
    }

    /// Target slot.
    pub fn target(&self) -> NodeIx {
        self.target
    }

    /// Weight from `w`, default 1.
    pub fn weight(&self) -> f64 {
        weight_of(&self.data)
    }

    /// Set `w`.
    pub fn set_weight(&mut self, weight: f64) {
        self.data.set("w", weight);
    }

    /// Data marks the edge as unusable in both directions.
    pub fn forbidden(&self) -> bool {
        self.data.is_truthy("forbidden")
    }

    /// Data marks a directed edge as pointing target to source.
    pub fn flipped(&self) -> bool {
        self.data.is_truthy("flipped")
    }
}

/// Read-through view of a stored edge in one direction.
///
/// Views are computed on demand and never stored. The forward view of an
/// edge has its positive id; the reverse view swaps endpoints and negates it.
#[derive(Clone, Copy)]
pub struct EdgeView<'g> {
    graph: &'g Graph,
    edge: &'g Edge,
    reversed: bool,
}

impl<'g> EdgeView<'g> {
    pub(crate) fn new(graph: &'g Graph, edge: &'g Edge, reversed: bool) -> Self {
        Self { graph, edge, reversed }
    }

    /// Signed id.
    pub fn id(&self) -> EdgeId {
        if self.reversed {
            self.edge.id.reversed()
        } else {
            self.edge.id
        }
    }

    /// True for the virtual reverse direction.
    pub fn is_reverse(&self) -> bool {
        self.reversed
    }

    /// The stored edge behind the view.
    pub fn stored(&self) -> &'g Edge {
        self.edge
    }

    /// The opposite view.
    pub fn reverse(&self) -> EdgeView<'g> {
        EdgeView::new(self.graph, self.edge, !self.reversed)
    }

    /// Source slot in this direction.
    pub fn source_ix(&self) -> NodeIx {
        if self.reversed {
            self.edge.target
        } else {
            self.edge.source
        }
    }

    /// Target slot in this direction.
    pub fn target_ix(&self) -> NodeIx {
        if self.reversed {
            self.edge.source
        } else {
            self.edge.target
        }
    }

    /// Source node.
    ///
    /// Edges never outlive their endpoints, so the lookup always succeeds on a
    /// consistent graph.
    pub fn source(&self) -> Option<&'g Node> {
        self.graph.node(self.source_ix())
    }

    /// Target node.
    pub fn target(&self) -> Option<&'g Node> {
        self.graph.node(self.target_ix())
    }

    /// Shared weight.
    pub fn weight(&self) -> f64 {
        self.edge.weight()
    }

    /// Shared bidirectional flag.
    pub fn bidirectional(&self) -> bool {
        self.edge.bidirectional
    }

    /// Shared data bag.
    pub fn data(&self) -> &'g DataBag {
        &self.edge.data
    }

    /// Shared style bag.
    pub fn style(&self) -> &'g DataBag {
        &self.edge.style
    }

    /// Whether this direction may be walked.
    ///
    /// Both endpoints must be traversable and the edge not forbidden. A
    /// directed edge is then walkable forward unless flipped, and in reverse
    /// only when flipped.
    pub fn traversable(&self) -> bool {
        let endpoints_ok = self.source().map_or(false, Node::traversable)
            && self.target().map_or(false, Node::traversable);
        if !endpoints_ok || self.edge.forbidden() {
            return false;
        }
        if self.edge.bidirectional {
            return true;
        }
        self.edge.flipped() == self.reversed
    }
}

impl fmt::Debug for EdgeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeView")
            .field("id", &self.id())
            .field("source", &self.source_ix())
            .field("target", &self.target_ix())
            .finish()
    }
}

impl PartialEq for EdgeView<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.graph, other.graph) && self.id() == other.id()
    }
}
