//! Identifier and tag types shared by the graph model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Arena slot of a node. Slots are never reused within one graph.
pub type NodeIx = usize;

/// Edge identifier.
///
/// Stored edges have positive ids handed out by a per-graph counter. The
/// reverse view of stored edge `n` has id `-n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(i64);

impl EdgeId {
    /// Wrap a raw id. Zero is not a valid edge id.
    pub fn new(raw: i64) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(EdgeId(raw))
        }
    }

    pub(crate) fn stored_from_counter(raw: i64) -> Self {
        EdgeId(raw)
    }

    /// Raw signed value.
    pub fn get(self) -> i64 {
        self.0
    }

    /// True for reverse views.
    pub fn is_reverse(self) -> bool {
        self.0 < 0
    }

    /// Id of the stored edge behind this id.
    pub fn stored(self) -> Self {
        EdgeId(self.0.abs())
    }

    /// Id of the opposite direction.
    pub fn reversed(self) -> Self {
        EdgeId(-self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Terminal tag of a recorded search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOutcome {
    /// Still running, or never run.
    #[default]
    None,
    /// The search reached the goal.
    Success,
    /// The search gave up.
    Failure,
}

/// Cost of a diagonal step on a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiagonalWeight {
    /// No diagonal movement; template diagonals are forbidden.
    Disabled,
    /// Diagonal costs the same as an orthogonal step.
    Chebyshev,
    /// Diagonal costs √2.
    Euclidean,
    /// Diagonal costs two orthogonal steps.
    Manhattan,
    /// Any other cost. Negative values disable diagonals.
    Custom(f64),
}

impl DiagonalWeight {
    /// Named modes with their numeric value, in notation order.
    pub const NAMED: [(&'static str, DiagonalWeight); 4] = [
        ("disabled", DiagonalWeight::Disabled),
        ("manhattan", DiagonalWeight::Manhattan),
        ("euclidean", DiagonalWeight::Euclidean),
        ("chebyshev", DiagonalWeight::Chebyshev),
    ];

    /// Numeric edge weight.
    pub fn value(self) -> f64 {
        match self {
            DiagonalWeight::Disabled => -1.0,
            DiagonalWeight::Chebyshev => 1.0,
            DiagonalWeight::Euclidean => std::f64::consts::SQRT_2,
            DiagonalWeight::Manhattan => 2.0,
            DiagonalWeight::Custom(v) => v,
        }
    }

    /// Build from a number, folding values equal to a named mode into it.
    pub fn from_value(value: f64) -> Self {
        Self::NAMED
            .iter()
            .find(|(_, mode)| mode.value() == value)
            .map(|(_, mode)| *mode)
            .unwrap_or(DiagonalWeight::Custom(value))
    }

    /// Parse a mode name (case-insensitive) or a number.
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.to_ascii_lowercase();
        if let Some((_, mode)) = Self::NAMED.iter().find(|(name, _)| *name == lowered) {
            return Some(*mode);
        }
        lowered.parse::<f64>().ok().filter(|v| !v.is_nan()).map(Self::from_value)
    }

    /// Name of the mode, if it is one of the named constants.
    pub fn name(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, mode)| mode.value() == self.value())
            .map(|(name, _)| *name)
    }

    /// Whether template diagonals may be traversed.
    pub fn is_enabled(self) -> bool {
        self.value() >= 0.0
    }

    /// Diagonal cost used by the grid heuristic; infinite when disabled.
    pub fn effective_cost(self) -> f64 {
        if self.is_enabled() {
            self.value()
        } else {
            f64::INFINITY
        }
    }
}

impl Default for DiagonalWeight {
    fn default() -> Self {
        DiagonalWeight::Disabled
    }
}

impl fmt::Display for DiagonalWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.value()),
        }
    }
}

/// Addresses an entity inside the current graph layer.
///
/// Commands hold targets instead of references so that they stay valid while
/// layers are pushed and popped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyTarget {
    /// The graph itself.
    Graph,
    /// A node by id.
    Node(String),
    /// An edge or reverse view by id.
    Edge(EdgeId),
}

impl fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyTarget::Graph => write!(f, "graph"),
            PropertyTarget::Node(id) => write!(f, "node {}", id),
            PropertyTarget::Edge(id) => write!(f, "edge {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_id_views() {
        let id = EdgeId::new(7).unwrap();
        assert!(!id.is_reverse());
        assert_eq!(id.reversed().get(), -7);
        assert!(id.reversed().is_reverse());
        assert_eq!(id.reversed().stored(), id);
        assert!(EdgeId::new(0).is_none());
    }

    #[test]
    fn diagonal_named_values_normalise() {
        assert_eq!(DiagonalWeight::from_value(2.0), DiagonalWeight::Manhattan);
        assert_eq!(DiagonalWeight::from_value(-1.0), DiagonalWeight::Disabled);
        assert_eq!(DiagonalWeight::from_value(1.5), DiagonalWeight::Custom(1.5));
        assert_eq!(DiagonalWeight::Custom(1.0).name(), Some("chebyshev"));
        assert_eq!(DiagonalWeight::Custom(1.5).to_string(), "1.5");
    }

    #[test]
    fn diagonal_parse() {
        assert_eq!(DiagonalWeight::parse("Euclidean"), Some(DiagonalWeight::Euclidean));
        assert_eq!(DiagonalWeight::parse("3"), Some(DiagonalWeight::Custom(3.0)));
        assert_eq!(DiagonalWeight::parse("-1"), Some(DiagonalWeight::Disabled));
        assert_eq!(DiagonalWeight::parse("sideways"), None);
    }

    #[test]
    fn disabled_diagonal_is_infinitely_expensive() {
        assert!(DiagonalWeight::Disabled.effective_cost().is_infinite());
        assert!(!DiagonalWeight::Custom(-0.5).is_enabled());
        assert_eq!(DiagonalWeight::Chebyshev.effective_cost(), 1.0);
    }
}
