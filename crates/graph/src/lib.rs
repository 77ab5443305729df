//! Graph model for plyboard
//!
//! - [`Graph`]: free-form or grid graph with reverse edge views and a lazily
//!   rebuilt adjacency index
//! - [`GraphContext`]: layered graph snapshots on one undo timeline
//! - [`commands`]: reversible graph edits
//! - [`solution`]: step recording for graph search solvers
//! - [`algorithms`]: reference shortest paths and heuristic checks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adjacency;
pub mod algorithms;
pub mod commands;
pub mod context;
pub mod edge;
pub mod graph;
pub mod grid;
pub mod node;
pub mod properties;
pub mod solution;
pub mod types;

pub use adjacency::AdjacencyIndex;
pub use algorithms::{dijkstra, distances_to, heuristic_is_admissible, inadmissible_nodes, inconsistent_edges};
pub use commands::{
    GraphCommand, GraphOutcomeCommand, LayerGraphCommand, MetaGraphCommand, NodeTraverseToggleCommand,
    PropertyChange, PropertyChangeCommand,
};
pub use context::GraphContext;
pub use edge::{weight_of, Edge, EdgeView};
pub use graph::{distance_with_diagonal_cost, Graph, GridSpec, Shape};
pub use grid::{grid_node_id, LatticeStep, ADJACENT_DELTAS};
pub use node::{Node, TRANSIENT_KEYS};
pub use properties::Entity;
pub use solution::{
    build_graph_search_solver, solution_steps, BreadthFirstSolver, GraphSearchSolver, SearchStep, StepRecorder,
    GRAPH_SOLVER_CHECKLIST,
};
pub use types::{DiagonalWeight, EdgeId, NodeIx, PropertyTarget, SearchOutcome};
