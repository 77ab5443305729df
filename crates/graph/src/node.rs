//! Graph nodes.

use plyboard_core::DataBag;

use crate::types::NodeIx;

/// Keys that only carry step-replay state and are never serialised.
pub const TRANSIENT_KEYS: [&str; 2] = ["state", "highlighted"];

/// A node owned by a [`crate::Graph`].
///
/// Coordinates are only meaningful on grids; free-form nodes sit at (0, 0).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) ix: NodeIx,
    pub(crate) id: String,
    pub(crate) x: usize,
    pub(crate) y: usize,
    /// Free-form data.
    pub data: DataBag,
    /// Presentation hints, kept apart from `data`.
    pub style: DataBag,
}

impl Node {
    pub(crate) fn new(ix: NodeIx, id: String, x: usize, y: usize, data: DataBag) -> Self {
        Self {
            ix,
            id,
            x,
            y,
            data,
            style: DataBag::new(),
        }
    }

    /// Arena slot.
    pub fn ix(&self) -> NodeIx {
        self.ix
    }

    /// Immutable id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Grid column.
    pub fn x(&self) -> usize {
        self.x
    }

    /// Grid row.
    pub fn y(&self) -> usize {
        self.y
    }

    /// False only when data explicitly sets `traversable` to false.
    pub fn traversable(&self) -> bool {
        self.data.get_bool("traversable") != Some(false)
    }

    /// `label` from data, falling back to the id.
    pub fn label(&self) -> &str {
        self.data.get_str("label").unwrap_or(&self.id)
    }

    /// Step state (`""`, `"visited"` or `"expanded"`).
    pub fn state(&self) -> &str {
        self.data.get_str("state").unwrap_or("")
    }

    /// Whether the node is highlighted by a step.
    pub fn highlighted(&self) -> bool {
        self.data.get_bool("highlighted").unwrap_or(false)
    }
}
