//! Reference minimax solver.
//!
//! Expansion is iterative deepening: depth-first passes limited to a depth
//! that starts at 4 and grows by one while a pass expands more positions
//! than the one before it. The algorithm routine evaluates the tree as it
//! stands, assigning each position its utility and the subset of moves that
//! achieve it.

use std::collections::HashSet;

use plyboard_core::{arity_in, Capabilities, PlyError, PlyResult};
use plyboard_graph::NodeIx;
use tracing::debug;

use crate::case::{Case, Expansion, Move, Player, Position};
use crate::engine::ExpansionEngine;
use crate::routine::{
    AdversarialSolver, AlgorithmRoutine, AlgorithmStep, ExpansionRoutine, Step, SOLVER_CHECKLIST,
};

/// Depth of the first iterative-deepening pass.
pub const INITIAL_DEPTH: usize = 4;

/// Minimax over the expanded tree, with iterative-deepening expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Minimax {
    initial_depth: usize,
}

impl Minimax {
    /// Solver starting at [`INITIAL_DEPTH`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the first pass at `depth` instead.
    pub fn initial_depth(mut self, depth: usize) -> Self {
        self.initial_depth = depth;
        self
    }
}

impl Default for Minimax {
    fn default() -> Self {
        Self {
            initial_depth: INITIAL_DEPTH,
        }
    }
}

impl Capabilities for Minimax {
    fn arity(&self, method: &str) -> Option<usize> {
        arity_in(SOLVER_CHECKLIST, method)
    }
}

impl<C: Case> AdversarialSolver<C> for Minimax {
    fn run_expansion(&self, root: NodeIx) -> Box<dyn ExpansionRoutine<C>> {
        Box::new(IterativeDeepening::new(root, self.initial_depth))
    }

    fn run_algorithm(&self, root: NodeIx) -> Box<dyn AlgorithmRoutine<C>> {
        Box::new(MinimaxSearch::new(root))
    }

    fn play_sequence(&self, engine: &ExpansionEngine<C>, root: NodeIx) -> Vec<Move> {
        engine.tree().best_move_chain(root)
    }
}

// =============================================================================
// Expansion
// =============================================================================

#[derive(Debug)]
struct DepthFrame {
    node: NodeIx,
    depth: usize,
    children: Option<Vec<NodeIx>>,
    next: usize,
}

impl DepthFrame {
    fn new(node: NodeIx, depth: usize) -> Self {
        Self {
            node,
            depth,
            children: None,
            next: 0,
        }
    }
}

/// Depth-limited passes with a growing limit.
#[derive(Debug)]
pub struct IterativeDeepening {
    root: NodeIx,
    max_depth: usize,
    found: usize,
    best_found: Option<usize>,
    stack: Vec<DepthFrame>,
    started: bool,
    finished: bool,
}

impl IterativeDeepening {
    /// Routine whose first pass stops at `max_depth`.
    pub fn new(root: NodeIx, max_depth: usize) -> Self {
        Self {
            root,
            max_depth,
            found: 0,
            best_found: None,
            stack: Vec::new(),
            started: false,
            finished: false,
        }
    }

    /// Depth limit of the current pass.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Start the next pass, or finish when the last one found nothing new.
    fn next_pass(&mut self) -> bool {
        if self.started {
            if self.best_found.map_or(false, |best| self.found <= best) {
                return false;
            }
            self.best_found = Some(self.found);
            self.found = 0;
            self.max_depth += 1;
            debug!(depth = self.max_depth, "deepening");
        }
        self.started = true;
        self.stack.push(DepthFrame::new(self.root, 0));
        true
    }
}

impl<C: Case> ExpansionRoutine<C> for IterativeDeepening {
    fn step(&mut self, engine: &mut ExpansionEngine<C>) -> PlyResult<Step<Expansion>> {
        loop {
            if self.finished {
                return Ok(Step::Done);
            }
            if self.stack.is_empty() && !self.next_pass() {
                self.finished = true;
                return Ok(Step::Done);
            }
            let Some(top) = self.stack.last_mut() else {
                continue;
            };
            match &top.children {
                None => {
                    let terminal = engine.tree().position(top.node).map_or(true, Position::is_terminal);
                    if terminal || top.depth >= self.max_depth {
                        self.stack.pop();
                        continue;
                    }
                    let expansion = engine.expand_node(top.node)?;
                    top.children = Some(expansion.moves.iter().map(|m| m.node).collect());
                    self.found += 1;
                    return Ok(Step::Yield(expansion));
                }
                Some(children) => {
                    if let Some(&child) = children.get(top.next) {
                        top.next += 1;
                        let depth = top.depth + 1;
                        self.stack.push(DepthFrame::new(child, depth));
                    } else {
                        self.stack.pop();
                    }
                }
            }
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

#[derive(Debug)]
struct EvalFrame {
    node: NodeIx,
    player: Player,
    moves: Vec<Move>,
    next: usize,
    best: Option<f64>,
    best_moves: Vec<Move>,
}

impl EvalFrame {
    fn absorb(&mut self, utility: f64, mv: Move) {
        let better = match (self.best, self.player) {
            (None, _) => true,
            (Some(best), Player::Max) => utility > best,
            (Some(best), Player::Min) => utility < best,
        };
        if better {
            self.best = Some(utility);
            self.best_moves = vec![mv];
        } else if self.best == Some(utility) {
            self.best_moves.push(mv);
        }
    }
}

/// Stepwise minimax over the current tree.
///
/// Each step settles one position. Positions reached again through a
/// transposition reuse the utility already settled in this run; a position
/// that leads back onto the current line counts as 0.
#[derive(Debug)]
pub struct MinimaxSearch {
    root: NodeIx,
    stack: Vec<EvalFrame>,
    on_stack: HashSet<NodeIx>,
    started: bool,
    finished: bool,
}

impl MinimaxSearch {
    /// Routine evaluating the tree below `root`.
    pub fn new(root: NodeIx) -> Self {
        Self {
            root,
            stack: Vec::new(),
            on_stack: HashSet::new(),
            started: false,
            finished: false,
        }
    }

    /// Settle a frontier position or open a frame for an inner one.
    fn visit<C: Case>(&mut self, engine: &mut ExpansionEngine<C>, ix: NodeIx) -> PlyResult<Option<AlgorithmStep>> {
        let entry = engine
            .tree()
            .entry(ix)
            .ok_or_else(|| PlyError::runtime(format!("Game tree has no node {}.", ix)))?;
        let position = &entry.position;
        let inner = match &entry.moves {
            Some(moves) if !position.is_terminal() && !moves.is_empty() => Some(moves.clone()),
            _ => None,
        };
        let Some(moves) = inner else {
            let utility = if position.is_terminal() {
                position.score()
            } else {
                position.heuristic().unwrap_or(0.0)
            };
            let position_id = position.id();
            if let Some(entry) = engine.tree_mut().entry_mut(ix) {
                entry.utility = Some(utility);
                entry.best_moves.clear();
            }
            return Ok(Some(AlgorithmStep {
                node: ix,
                position_id,
                utility,
            }));
        };
        let player = position
            .player()
            .ok_or_else(|| PlyError::script("Invalid player for minimax algorithm."))?;
        self.on_stack.insert(ix);
        self.stack.push(EvalFrame {
            node: ix,
            player,
            moves,
            next: 0,
            best: None,
            best_moves: Vec::new(),
        });
        Ok(None)
    }
}

impl<C: Case> AlgorithmRoutine<C> for MinimaxSearch {
    fn step(&mut self, engine: &mut ExpansionEngine<C>) -> PlyResult<Step<AlgorithmStep>> {
        loop {
            if self.finished {
                return Ok(Step::Done);
            }
            if !self.started {
                let settled = self.visit(engine, self.root)?;
                self.started = true;
                if let Some(step) = settled {
                    return Ok(Step::Yield(step));
                }
                continue;
            }
            let Some(top) = self.stack.last_mut() else {
                self.finished = true;
                return Ok(Step::Done);
            };
            if let Some(mv) = top.moves.get(top.next).cloned() {
                if let Some(utility) = engine.tree().utility(mv.node) {
                    top.absorb(utility, mv);
                    top.next += 1;
                    continue;
                }
                if self.on_stack.contains(&mv.node) {
                    top.absorb(0.0, mv);
                    top.next += 1;
                    continue;
                }
                if let Some(step) = self.visit(engine, mv.node)? {
                    return Ok(Step::Yield(step));
                }
                continue;
            }
            let Some(frame) = self.stack.pop() else {
                continue;
            };
            self.on_stack.remove(&frame.node);
            let utility = frame.best.unwrap_or(0.0);
            let tree = engine.tree_mut();
            let position_id = tree.position(frame.node).map(Position::id).unwrap_or_default();
            if let Some(entry) = tree.entry_mut(frame.node) {
                entry.utility = Some(utility);
                entry.best_moves = frame.best_moves;
            }
            return Ok(Step::Yield(AlgorithmStep {
                node: frame.node,
                position_id,
                utility,
            }));
        }
    }
}
