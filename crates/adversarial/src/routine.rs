//! Resumable step sequences and the solver interface.
//!
//! A routine is a small state machine: each call to `step` does one unit of
//! work against the engine and reports it, or reports that it is done. The
//! driver pulls steps while budget and time allow, then keeps the routine so
//! the next tick continues where this one stopped.

use plyboard_core::{MethodSpec, PlyResult};
use plyboard_graph::NodeIx;

use crate::case::{Case, Expansion, Move};
use crate::engine::ExpansionEngine;

/// Methods a host-evaluated solver object must expose.
pub const SOLVER_CHECKLIST: &[MethodSpec] = &[
    MethodSpec::new("getPlaySequence", 1),
    MethodSpec::new("runExpansion", 1),
    MethodSpec::new("runAlgorithm", 1),
];

/// Outcome of pulling one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step<T> {
    /// One unit of work was done.
    Yield(T),
    /// Nothing is left to do.
    Done,
}

impl<T> Step<T> {
    /// Whether the routine has finished.
    pub fn is_done(&self) -> bool {
        matches!(self, Step::Done)
    }
}

/// One unit of algorithm work: a position received its utility.
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmStep {
    /// Evaluated node.
    pub node: NodeIx,
    /// Its position id.
    pub position_id: String,
    /// Value assigned.
    pub utility: f64,
}

/// Grows the tree, one expansion per step.
pub trait ExpansionRoutine<C: Case> {
    /// Pull the next expansion.
    fn step(&mut self, engine: &mut ExpansionEngine<C>) -> PlyResult<Step<Expansion>>;
}

/// Evaluates the tree, one position per step.
pub trait AlgorithmRoutine<C: Case> {
    /// Pull the next evaluation.
    fn step(&mut self, engine: &mut ExpansionEngine<C>) -> PlyResult<Step<AlgorithmStep>>;
}

/// A search strategy over the game tree.
pub trait AdversarialSolver<C: Case> {
    /// Fresh expansion routine starting at `root`.
    fn run_expansion(&self, root: NodeIx) -> Box<dyn ExpansionRoutine<C>>;

    /// Fresh algorithm routine starting at `root`.
    fn run_algorithm(&self, root: NodeIx) -> Box<dyn AlgorithmRoutine<C>>;

    /// Best line of play from `root` given what the tree knows now.
    fn play_sequence(&self, engine: &ExpansionEngine<C>, root: NodeIx) -> Vec<Move>;
}
