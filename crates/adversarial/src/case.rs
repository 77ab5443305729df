//! Game rules as seen by the expansion engine.
//!
//! A [`Case`] describes a two-player game: where it starts, which actions are
//! legal in a position and what each action leads to. Positions are plain
//! values identified by [`Position::id`]; two positions with the same id are
//! the same node of the game tree, however they were reached.

use std::fmt;

use plyboard_core::{DataBag, MethodSpec, PlyResult};
use plyboard_graph::NodeIx;
use serde::{Deserialize, Serialize};

/// Methods a host-evaluated case object must expose.
pub const CASE_CHECKLIST: &[MethodSpec] = &[
    MethodSpec::new("getInitialPosition", 0),
    MethodSpec::new("getActions", 1),
    MethodSpec::new("getResult", 2),
];

/// Methods the initial position of a host-evaluated case must expose.
pub const POSITION_CHECKLIST: &[MethodSpec] = &[
    MethodSpec::new("isTerminal", 0),
    MethodSpec::new("getScore", 0),
    MethodSpec::new("render", 1),
    MethodSpec::new("getId", 0),
    MethodSpec::new("getPlayer", 0),
];

/// An action is a data bag; `name` and `label` are read when present.
pub type Action = DataBag;

/// Display name of an action: `label`, then `name`, then the compact JSON.
pub fn action_label(action: &Action) -> String {
    action
        .get_str("label")
        .or_else(|| action.get_str("name"))
        .map(str::to_string)
        .unwrap_or_else(|| action.to_json_string())
}

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Picks the highest utility.
    Max,
    /// Picks the lowest utility.
    Min,
}

impl Player {
    /// Map the usual `1` / `-1` encoding, anything else is not a player.
    pub fn from_sign(sign: i64) -> Option<Self> {
        match sign {
            1 => Some(Player::Max),
            -1 => Some(Player::Min),
            _ => None,
        }
    }

    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Player::Max => Player::Min,
            Player::Min => Player::Max,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Max => f.write_str("max"),
            Player::Min => f.write_str("min"),
        }
    }
}

/// A game position.
pub trait Position: Clone + fmt::Debug {
    /// Stable identity; equal ids are transpositions of each other.
    fn id(&self) -> String;

    /// No further moves are possible.
    fn is_terminal(&self) -> bool;

    /// Outcome from the maximizing side's point of view.
    ///
    /// Only meaningful for terminal positions.
    fn score(&self) -> f64;

    /// Side to move, `None` for positions no algorithm should search from.
    fn player(&self) -> Option<Player>;

    /// Estimate used when a search stops at an unexpanded position.
    fn heuristic(&self) -> Option<f64> {
        None
    }
}

/// Game rules.
pub trait Case {
    /// Position type produced by these rules.
    type Position: Position;

    /// Where every game starts.
    fn initial_position(&self) -> PlyResult<Self::Position>;

    /// Legal actions in `position`.
    fn actions(&self, position: &Self::Position) -> PlyResult<Vec<Action>>;

    /// Position reached by playing `action` in `position`.
    fn result(&self, position: &Self::Position, action: &Action) -> PlyResult<Self::Position>;
}

/// One legal move out of a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    /// Id of the resulting position.
    pub position_id: String,
    /// Tree node of the resulting position.
    pub node: NodeIx,
    /// Action that leads there.
    pub action: Action,
}

/// Result of expanding one position.
#[derive(Debug, Clone, PartialEq)]
pub struct Expansion {
    /// Id of the expanded position.
    pub position_id: String,
    /// Its moves; empty when the position is terminal or the budget ran out.
    pub moves: Vec<Move>,
}
