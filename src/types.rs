//! Public types for the plyboard facade.
//!
//! This module re-exports types from the member crates with one flat namespace.

// ============================================================================
// Core
// ============================================================================

// Errors
pub use plyboard_core::{BuildError, Fault, ParsingError, PlyError, PlyResult};

// Data bags
pub use plyboard_core::{DataBag, Map, Value};

// Property Protocol
pub use plyboard_core::{Inspectable, ItemProperty, PropertyType};

// Commands
pub use plyboard_core::{Command, CommandHandler};

// ============================================================================
// Graphs
// ============================================================================

pub use plyboard_graph::{DiagonalWeight, EdgeId, EdgeView, Graph, GraphContext, Node, NodeIx, Shape};

// Solving
pub use plyboard_graph::{GraphSearchSolver, SearchStep, StepRecorder};

// ============================================================================
// Notation
// ============================================================================

pub use plyboard_notation::{GraphNotation, RecorderNotation};

// ============================================================================
// Adversarial search
// ============================================================================

pub use plyboard_adversarial::{
    Action, AdversarialSolver, Budget, Case, DriverConfig, ExpansionEngine, Minimax, Move, Player, Position,
    SearchDriver, TickReport,
};
