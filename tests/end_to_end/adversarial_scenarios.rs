//! A small take-away game searched through the driver.

use plyboard::plyboard_adversarial::{
    build_adversarial, ExpansionEngine, CASE_CHECKLIST, EXPAND_PROPERTY, POSITION_CHECKLIST,
};
use plyboard::plyboard_core::{arity_in, Capabilities};
use plyboard::types::{
    Action, Case, DriverConfig, Inspectable, Minimax, Player, PlyError, PlyResult, Position, SearchDriver,
};
use serde_json::json;

/// Take one or two stones; whoever takes the last stone wins.
#[derive(Debug, Clone)]
struct Pile {
    stones: u32,
    to_move: Player,
}

impl Position for Pile {
    fn id(&self) -> String {
        format!("{}:{}", self.stones, self.to_move)
    }
    fn is_terminal(&self) -> bool {
        self.stones == 0
    }
    fn score(&self) -> f64 {
        match self.to_move {
            Player::Min => 1.0,
            Player::Max => -1.0,
        }
    }
    fn player(&self) -> Option<Player> {
        Some(self.to_move)
    }
}

impl Capabilities for Pile {
    fn arity(&self, method: &str) -> Option<usize> {
        arity_in(POSITION_CHECKLIST, method)
    }
}

struct Nim {
    stones: u32,
}

impl Case for Nim {
    type Position = Pile;

    fn initial_position(&self) -> PlyResult<Pile> {
        Ok(Pile {
            stones: self.stones,
            to_move: Player::Max,
        })
    }

    fn actions(&self, position: &Pile) -> PlyResult<Vec<Action>> {
        Ok((1..=position.stones.min(2))
            .map(|take| {
                let mut action = Action::new();
                action.set("name", format!("take {}", take));
                action.set("take", take);
                action
            })
            .collect())
    }

    fn result(&self, position: &Pile, action: &Action) -> PlyResult<Pile> {
        let take = action
            .get_f64("take")
            .ok_or_else(|| PlyError::script("action without a count"))? as u32;
        Ok(Pile {
            stones: position.stones.saturating_sub(take),
            to_move: position.to_move.opponent(),
        })
    }
}

impl Capabilities for Nim {
    fn arity(&self, method: &str) -> Option<usize> {
        arity_in(CASE_CHECKLIST, method)
    }
}

fn nim_driver(stones: u32, config: DriverConfig) -> SearchDriver<Nim> {
    let setup = build_adversarial(|| Ok(Nim { stones }), || Ok(Minimax::new())).unwrap();
    SearchDriver::from_setup(setup, config)
}

#[test]
fn driver_finds_the_winning_line() {
    let config = DriverConfig::from_toml_str("tick_timeout_ms = 5000\nmax_expansions = 3\n").unwrap();
    let mut driver = nim_driver(4, config);

    let mut report = driver.tick();
    let mut ticks = 1;
    while !report.expansion_done {
        report = driver.tick();
        ticks += 1;
        assert!(ticks < 20, "search did not settle");
    }
    assert!(ticks > 1);
    assert!(report.algorithm_done);

    let line: Vec<&str> = report.play_sequence.iter().map(|m| m.position_id.as_str()).collect();
    assert_eq!(line, vec!["3:min", "2:max", "0:min"]);
    let tree = driver.engine().tree();
    assert_eq!(tree.utility(driver.root()), Some(1.0));
    assert_eq!(report.play_sequence[0].action.get_str("name"), Some("take 1"));
}

#[test]
fn transpositions_share_a_node() {
    let mut driver = nim_driver(4, DriverConfig::default());
    driver.tick();
    let tree = driver.engine().tree();
    // 3:min takes two and 2:min takes one
    let one_max = tree.node_ix("1:max").unwrap();
    assert_eq!(tree.graph().get_incoming_edges(one_max, false).count(), 2);
    assert_eq!(tree.graph().get_all_nodes().filter(|n| n.id() == "1:max").count(), 1);
}

#[test]
fn two_ply_expansion_counts_paths() {
    let mut engine = ExpansionEngine::new(Nim { stones: 2 }).unwrap();
    let root = engine.tree().root();
    let first = engine.expand_node(root).unwrap();
    assert_eq!(first.moves.len(), 2);
    assert_eq!(engine.tree().path_count(root), 2);

    // "1:min" has one move, "0:min" is terminal
    for mv in first.moves {
        engine.expand_node(mv.node).unwrap();
    }
    assert_eq!(engine.tree().path_count(root), 2);
}

#[test]
fn inspector_trigger_expands() {
    let mut engine = ExpansionEngine::new(Nim { stones: 3 }).unwrap();
    let root = engine.tree().root();
    let mut entity = engine.position_entity(root).unwrap();
    assert_eq!(entity.id(), json!("3:max"));
    assert!(entity.set_prop(EXPAND_PROPERTY, json!(true)).unwrap());
    assert_eq!(entity.get_prop("pathCount").unwrap(), json!(2));
    assert_eq!(engine.tree().len(), 3);
}
