//! Budget-limited adversarial game-tree search for plyboard
//!
//! - [`Case`] and [`Position`]: the rules of a two-player game
//! - [`ExpansionEngine`]: grows a [`GameTree`] one position at a time,
//!   bounded by a [`Budget`]
//! - [`ExpansionRoutine`] / [`AlgorithmRoutine`]: resumable step sequences
//!   supplied by an [`AdversarialSolver`]; [`Minimax`] is the reference one
//! - [`build_adversarial`]: checks host-evaluated rules and solvers
//! - [`SearchDriver`]: pulls steps cooperatively, a slice per tick

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod budget;
pub mod build;
pub mod case;
pub mod config;
pub mod driver;
pub mod engine;
pub mod minimax;
pub mod properties;
pub mod routine;
pub mod tree;

pub use budget::Budget;
pub use build::{build_adversarial, AdversarialSetup};
pub use case::{action_label, Action, Case, Expansion, Move, Player, Position, CASE_CHECKLIST, POSITION_CHECKLIST};
pub use config::{DriverConfig, DEFAULT_TICK_TIMEOUT_MS};
pub use driver::{Notification, NotificationLevel, SearchDriver, TickReport};
pub use engine::ExpansionEngine;
pub use minimax::{IterativeDeepening, Minimax, MinimaxSearch, INITIAL_DEPTH};
pub use properties::{PositionEntity, EXPAND_PROPERTY};
pub use routine::{AdversarialSolver, AlgorithmRoutine, AlgorithmStep, ExpansionRoutine, Step, SOLVER_CHECKLIST};
pub use tree::{GameTree, TreeEntry};
