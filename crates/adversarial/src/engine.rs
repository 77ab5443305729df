//! Budget-limited expansion of the game tree.

use plyboard_core::{PlyError, PlyResult};
use plyboard_graph::NodeIx;
use tracing::debug;

use crate::budget::Budget;
use crate::case::{Case, Expansion, Move, Position};
use crate::tree::GameTree;

/// Owns the rules and the tree, and grows the tree one position at a time.
///
/// Expansion is idempotent: a position is expanded at most once, later
/// requests return the cached moves and cost nothing.
#[derive(Debug)]
pub struct ExpansionEngine<C: Case> {
    case: C,
    tree: GameTree<C::Position>,
    expansion_budget: Budget,
    algorithm_budget: Budget,
    topology_changed: bool,
}

impl<C: Case> ExpansionEngine<C> {
    /// Engine whose tree starts at the case's initial position.
    pub fn new(case: C) -> PlyResult<Self> {
        let root = case.initial_position()?;
        Ok(Self {
            case,
            tree: GameTree::new(root)?,
            expansion_budget: Budget::Unlimited,
            algorithm_budget: Budget::Unlimited,
            topology_changed: false,
        })
    }

    /// Game rules.
    pub fn case(&self) -> &C {
        &self.case
    }

    /// Game tree.
    pub fn tree(&self) -> &GameTree<C::Position> {
        &self.tree
    }

    /// Mutable game tree.
    pub fn tree_mut(&mut self) -> &mut GameTree<C::Position> {
        &mut self.tree
    }

    /// Remaining expansions.
    pub fn expansion_budget(&self) -> Budget {
        self.expansion_budget
    }

    /// Replace the expansion budget.
    pub fn set_expansion_budget(&mut self, budget: Budget) {
        self.expansion_budget = budget;
    }

    /// Remaining algorithm steps.
    pub fn algorithm_budget(&self) -> Budget {
        self.algorithm_budget
    }

    /// Replace the algorithm budget.
    pub fn set_algorithm_budget(&mut self, budget: Budget) {
        self.algorithm_budget = budget;
    }

    /// Spend one algorithm step, `false` when none is left.
    pub fn consume_algorithm_step(&mut self) -> bool {
        self.algorithm_budget.try_consume()
    }

    /// Whether the tree grew since the last call, clearing the flag.
    pub fn take_topology_changed(&mut self) -> bool {
        std::mem::take(&mut self.topology_changed)
    }

    /// Forget every utility and best move from earlier algorithm runs.
    pub fn reset_algorithm_state(&mut self) {
        self.tree.reset_utilities();
    }

    /// Expand `position`, adding it to the tree if it is not there yet.
    pub fn expand(&mut self, position: &C::Position) -> PlyResult<Expansion> {
        let ix = match self.tree.node_ix(&position.id()) {
            Some(ix) => ix,
            None => {
                let (ix, _) = self.tree.ensure_node(position.clone())?;
                self.topology_changed = true;
                ix
            }
        };
        self.expand_node(ix)
    }

    /// Expand the tree node `ix`.
    pub fn expand_node(&mut self, ix: NodeIx) -> PlyResult<Expansion> {
        let entry = self
            .tree
            .entry(ix)
            .ok_or_else(|| PlyError::runtime(format!("Game tree has no node {}.", ix)))?;
        let position = entry.position.clone();
        let position_id = position.id();
        if let Some(moves) = entry.moves.clone() {
            return Ok(Expansion { position_id, moves });
        }
        if self.tree.is_expanded(ix) {
            let moves = self.tree.moves_from_edges(ix);
            if let Some(entry) = self.tree.entry_mut(ix) {
                entry.moves = Some(moves.clone());
            }
            return Ok(Expansion { position_id, moves });
        }
        if !self.expansion_budget.try_consume() {
            debug!(position = %position_id, "expansion budget exhausted");
            return Ok(Expansion {
                position_id,
                moves: Vec::new(),
            });
        }

        let mut results = Vec::new();
        for action in self.case.actions(&position)? {
            let next = self.case.result(&position, &action)?;
            results.push((action, next));
        }

        let mut moves = Vec::with_capacity(results.len());
        for (action, next) in results {
            let (child, _) = self.tree.ensure_node(next)?;
            self.tree.add_move_edge(ix, child, &action)?;
            let position_id = self
                .tree
                .position(child)
                .map(Position::id)
                .unwrap_or_default();
            moves.push(Move {
                position_id,
                node: child,
                action,
            });
        }

        let delta = if position.is_terminal() {
            0
        } else {
            (moves.len() as u64).saturating_sub(1)
        };
        if delta > 0 {
            self.tree.add_path_count(ix, delta);
        }
        self.tree.mark_expanded(ix, moves.clone());
        self.topology_changed = true;
        debug!(position = %position_id, moves = moves.len(), "expanded");
        Ok(Expansion { position_id, moves })
    }
}
