//! Cooperative tick loop.
//!
//! The host calls [`SearchDriver::tick`] whenever it is ready for more work.
//! A tick pulls expansion steps, then algorithm steps, each loop bounded by
//! its per-tick budget and by the wall-clock slice, then refreshes the
//! highlighted best line. Routines survive between ticks, so raising a budget
//! later resumes where the last tick stopped. Growth of the tree always
//! discards the algorithm routine and its utilities.

use std::fmt;
use std::time::Instant;

use plyboard_core::PlyResult;
use plyboard_graph::NodeIx;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::build::AdversarialSetup;
use crate::case::{Case, Move, Position};
use crate::config::DriverConfig;
use crate::engine::ExpansionEngine;
use crate::routine::{AdversarialSolver, AlgorithmRoutine, ExpansionRoutine, Step};

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Progress.
    Info,
    /// A routine finished.
    Success,
    /// A step failed.
    Error,
}

/// A message for the user, produced during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notification {
    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Expansion steps pulled.
    pub expansions: usize,
    /// Algorithm steps pulled.
    pub algorithm_steps: usize,
    /// The tree grew during this tick.
    pub topology_changed: bool,
    /// The expansion routine reported it is done.
    pub expansion_done: bool,
    /// The algorithm routine reported it is done.
    pub algorithm_done: bool,
    /// Messages for the user.
    pub notifications: Vec<Notification>,
    /// Best line of play after the tick.
    pub play_sequence: Vec<Move>,
}

/// Outcome of one pull loop.
enum SliceEnd {
    Done,
    Budget,
    Timeout,
    Failed,
}

/// Owns the engine, the solver and the live routines.
pub struct SearchDriver<C: Case> {
    engine: ExpansionEngine<C>,
    solver: Box<dyn AdversarialSolver<C>>,
    config: DriverConfig,
    root: NodeIx,
    expansion: Option<Box<dyn ExpansionRoutine<C>>>,
    algorithm: Option<Box<dyn AlgorithmRoutine<C>>>,
    expansion_announced: bool,
}

impl<C: Case> SearchDriver<C> {
    /// Driver rooted at the engine's current root.
    pub fn new(engine: ExpansionEngine<C>, solver: Box<dyn AdversarialSolver<C>>, config: DriverConfig) -> Self {
        let root = engine.tree().root();
        Self {
            engine,
            solver,
            config,
            root,
            expansion: None,
            algorithm: None,
            expansion_announced: false,
        }
    }

    /// Driver for a validated setup.
    pub fn from_setup(setup: AdversarialSetup<C>, config: DriverConfig) -> Self {
        Self::new(setup.engine, setup.solver, config)
    }

    /// Engine, for inspection.
    pub fn engine(&self) -> &ExpansionEngine<C> {
        &self.engine
    }

    /// Current configuration.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Root the search is running from.
    pub fn root(&self) -> NodeIx {
        self.root
    }

    /// Whether an expansion routine is live.
    pub fn has_expansion_routine(&self) -> bool {
        self.expansion.is_some()
    }

    /// Whether an algorithm routine is live.
    pub fn has_algorithm_routine(&self) -> bool {
        self.algorithm.is_some()
    }

    /// Search from `position` instead.
    ///
    /// A different position discards both routines; the same one keeps them.
    pub fn set_root(&mut self, position: C::Position) -> PlyResult<()> {
        let ix = self.engine.tree_mut().set_root(position)?;
        if ix != self.root {
            info!(root = ix, "root changed, discarding routines");
            self.root = ix;
            self.expansion = None;
            self.algorithm = None;
            self.expansion_announced = false;
        }
        Ok(())
    }

    /// Run one slice of expansion and one slice of evaluation.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        self.engine.set_expansion_budget(self.config.max_expansions);
        self.engine.set_algorithm_budget(self.config.max_algorithm_steps);

        let end = self.expansion_slice(&mut report);
        match end {
            SliceEnd::Done => {
                report.expansion_done = true;
                if !self.expansion_announced {
                    self.expansion_announced = true;
                    info!("expansion complete");
                    report
                        .notifications
                        .push(Notification::new(NotificationLevel::Success, "Expansion complete"));
                }
            }
            SliceEnd::Timeout => {
                info!(expansions = report.expansions, "expansion timeout reached");
                report
                    .notifications
                    .push(Notification::new(NotificationLevel::Info, "Timeout reached"));
            }
            SliceEnd::Budget | SliceEnd::Failed => {}
        }

        if self.engine.take_topology_changed() {
            report.topology_changed = true;
            debug!("tree grew, restarting the algorithm");
            self.algorithm = None;
            self.engine.reset_algorithm_state();
        }

        match self.algorithm_slice(&mut report) {
            SliceEnd::Done => report.algorithm_done = true,
            SliceEnd::Timeout => {
                info!(steps = report.algorithm_steps, "algorithm timeout reached");
                report
                    .notifications
                    .push(Notification::new(NotificationLevel::Info, "Timeout reached"));
            }
            SliceEnd::Budget | SliceEnd::Failed => {}
        }

        let sequence = self.solver.play_sequence(&self.engine, self.root);
        self.engine.tree_mut().highlight_moves(self.root, &sequence);
        report.play_sequence = sequence;
        report
    }

    fn expansion_slice(&mut self, report: &mut TickReport) -> SliceEnd {
        let started = Instant::now();
        let timeout = self.config.tick_timeout();
        let solver = &self.solver;
        let root = self.root;
        let routine = self.expansion.get_or_insert_with(|| {
            info!(root, "starting expansion routine");
            solver.run_expansion(root)
        });
        loop {
            if self.engine.expansion_budget().is_exhausted() {
                return SliceEnd::Budget;
            }
            match routine.step(&mut self.engine) {
                Ok(Step::Done) => return SliceEnd::Done,
                Ok(Step::Yield(expansion)) => {
                    report.expansions += 1;
                    debug!(position = %expansion.position_id, moves = expansion.moves.len(), "expansion step");
                }
                Err(e) => {
                    warn!(error = %e, "expansion step failed");
                    report
                        .notifications
                        .push(Notification::new(NotificationLevel::Error, e.to_string()));
                    return SliceEnd::Failed;
                }
            }
            if started.elapsed() > timeout {
                return SliceEnd::Timeout;
            }
        }
    }

    fn algorithm_slice(&mut self, report: &mut TickReport) -> SliceEnd {
        let started = Instant::now();
        let timeout = self.config.tick_timeout();
        let solver = &self.solver;
        let root = self.root;
        let routine = self.algorithm.get_or_insert_with(|| {
            info!(root, "starting algorithm routine");
            solver.run_algorithm(root)
        });
        loop {
            if self.engine.algorithm_budget().is_exhausted() {
                return SliceEnd::Budget;
            }
            match routine.step(&mut self.engine) {
                Ok(Step::Done) => return SliceEnd::Done,
                Ok(Step::Yield(step)) => {
                    self.engine.consume_algorithm_step();
                    report.algorithm_steps += 1;
                    debug!(position = %step.position_id, utility = step.utility, "algorithm step");
                }
                Err(e) => {
                    warn!(error = %e, "algorithm step failed");
                    report
                        .notifications
                        .push(Notification::new(NotificationLevel::Error, e.to_string()));
                    return SliceEnd::Failed;
                }
            }
            if started.elapsed() > timeout {
                return SliceEnd::Timeout;
            }
        }
    }

    /// Position at the root.
    pub fn root_position(&self) -> Option<&C::Position> {
        self.engine.tree().position(self.root)
    }

    /// Id of the root position.
    pub fn root_id(&self) -> String {
        self.root_position().map(Position::id).unwrap_or_default()
    }
}
