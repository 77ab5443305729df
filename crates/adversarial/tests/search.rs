//! Engine, minimax and driver working together on small games.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use plyboard_adversarial::{
    build_adversarial, Action, AdversarialSolver, AlgorithmRoutine, Budget, Case, DriverConfig, ExpansionEngine,
    ExpansionRoutine, Minimax, Move, NotificationLevel, Player, Position, SearchDriver, CASE_CHECKLIST,
    POSITION_CHECKLIST,
};
use plyboard_core::{arity_in, Capabilities, Fault, MethodTable, PlyError, PlyResult};
use plyboard_graph::NodeIx;

// =============================================================================
// A game given as a table
// =============================================================================

#[derive(Debug, Clone)]
struct Spot {
    id: String,
    score: Option<f64>,
    to_move: Player,
}

impl Position for Spot {
    fn id(&self) -> String {
        self.id.clone()
    }
    fn is_terminal(&self) -> bool {
        self.score.is_some()
    }
    fn score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
    fn player(&self) -> Option<Player> {
        Some(self.to_move)
    }
}

impl Capabilities for Spot {
    fn arity(&self, method: &str) -> Option<usize> {
        arity_in(POSITION_CHECKLIST, method)
    }
}

#[derive(Debug, Clone, Default)]
struct Table {
    moves: HashMap<String, Vec<String>>,
    scores: HashMap<String, f64>,
    broken: Rc<Cell<bool>>,
}

impl Table {
    /// r -> a, b; a -> a1 (1), a2 (-1); b -> b1 (0), b2 (2). Max moves at r.
    fn two_ply() -> Self {
        let mut table = Table::default();
        table.link("r", &["a", "b"]);
        table.link("a", &["a1", "a2"]);
        table.link("b", &["b1", "b2"]);
        for (id, score) in [("a1", 1.0), ("a2", -1.0), ("b1", 0.0), ("b2", 2.0)] {
            table.scores.insert(id.to_string(), score);
        }
        table
    }

    fn link(&mut self, from: &str, to: &[&str]) {
        self.moves
            .insert(from.to_string(), to.iter().map(|s| s.to_string()).collect());
    }

    fn spot(&self, id: &str, to_move: Player) -> Spot {
        Spot {
            id: id.to_string(),
            score: self.scores.get(id).copied(),
            to_move,
        }
    }
}

impl Case for Table {
    type Position = Spot;

    fn initial_position(&self) -> PlyResult<Spot> {
        Ok(self.spot("r", Player::Max))
    }

    fn actions(&self, position: &Spot) -> PlyResult<Vec<Action>> {
        if self.broken.get() {
            return Err(PlyError::script("getActions exploded"));
        }
        let targets = self.moves.get(&position.id).cloned().unwrap_or_default();
        Ok(targets
            .into_iter()
            .map(|to| {
                let mut action = Action::new();
                action.set("name", to.clone());
                action.set("to", to);
                action
            })
            .collect())
    }

    fn result(&self, position: &Spot, action: &Action) -> PlyResult<Spot> {
        let to = action
            .get_str("to")
            .ok_or_else(|| PlyError::script("action without target"))?;
        Ok(self.spot(to, position.to_move.opponent()))
    }
}

impl Capabilities for Table {
    fn arity(&self, method: &str) -> Option<usize> {
        arity_in(CASE_CHECKLIST, method)
    }
}

fn ids(moves: &[Move]) -> Vec<&str> {
    moves.iter().map(|m| m.position_id.as_str()).collect()
}

fn driver(table: Table, config: DriverConfig) -> SearchDriver<Table> {
    let setup = build_adversarial(|| Ok(table), || Ok(Minimax::new())).unwrap();
    SearchDriver::from_setup(setup, config)
}

// =============================================================================
// Engine
// =============================================================================

#[test]
fn two_ply_path_counts() {
    let mut engine = ExpansionEngine::new(Table::two_ply()).unwrap();
    let root = engine.tree().root();
    let r = engine.tree().position(root).unwrap().clone();
    let expansion = engine.expand(&r).unwrap();
    assert_eq!(ids(&expansion.moves), vec!["a", "b"]);
    assert_eq!(engine.tree().path_count(root), 2);

    for mv in expansion.moves {
        engine.expand_node(mv.node).unwrap();
        assert_eq!(engine.tree().path_count(mv.node), 2);
    }
    assert_eq!(engine.tree().path_count(root), 4);
    assert_eq!(engine.tree().len(), 7);
    assert_eq!(engine.tree().graph().edge_count(), 6);
}

#[test]
fn transposed_child_counts_both_parents() {
    let mut table = Table::two_ply();
    table.link("a", &["a1", "t"]);
    table.link("b", &["t", "b2"]);
    table.link("t", &["t1", "t2", "t3"]);
    for id in ["t1", "t2", "t3"] {
        table.scores.insert(id.to_string(), 0.0);
    }
    let mut engine = ExpansionEngine::new(table).unwrap();
    let root = engine.tree().root();
    engine.expand_node(root).unwrap();
    let a = engine.tree().node_ix("a").unwrap();
    let b = engine.tree().node_ix("b").unwrap();
    engine.expand_node(a).unwrap();
    engine.expand_node(b).unwrap();
    let t = engine.tree().node_ix("t").unwrap();
    assert_eq!(engine.tree().graph().get_incoming_edges(t, false).count(), 2);

    let before = engine.tree().path_count(root);
    engine.expand_node(t).unwrap();
    assert_eq!(engine.tree().path_count(t), 3);
    assert_eq!(engine.tree().path_count(a), 4);
    assert_eq!(engine.tree().path_count(b), 4);
    assert_eq!(engine.tree().path_count(root), before + 2);
}

// =============================================================================
// Minimax routines
// =============================================================================

fn drain_expansion(engine: &mut ExpansionEngine<Table>, routine: &mut dyn ExpansionRoutine<Table>) -> usize {
    let mut steps = 0;
    while !routine.step(engine).unwrap().is_done() {
        steps += 1;
    }
    steps
}

fn drain_algorithm(engine: &mut ExpansionEngine<Table>, routine: &mut dyn AlgorithmRoutine<Table>) -> usize {
    let mut steps = 0;
    while !routine.step(engine).unwrap().is_done() {
        steps += 1;
    }
    steps
}

#[test]
fn minimax_picks_the_better_reply() {
    let mut engine = ExpansionEngine::new(Table::two_ply()).unwrap();
    let root = engine.tree().root();
    let solver = Minimax::new();

    let mut expansion = AdversarialSolver::<Table>::run_expansion(&solver, root);
    // one pass finds r, a, b; a deeper pass finds nothing new
    assert_eq!(drain_expansion(&mut engine, expansion.as_mut()), 6);
    assert_eq!(engine.tree().len(), 7);

    let mut algorithm = AdversarialSolver::<Table>::run_algorithm(&solver, root);
    assert_eq!(drain_algorithm(&mut engine, algorithm.as_mut()), 7);

    let tree = engine.tree();
    assert_eq!(tree.utility(root), Some(0.0));
    assert_eq!(tree.utility(tree.node_ix("a").unwrap()), Some(-1.0));
    assert_eq!(tree.utility(tree.node_ix("b").unwrap()), Some(0.0));
    assert_eq!(ids(&solver.play_sequence(&engine, root)), vec!["b", "b1"]);
}

#[test]
fn ties_keep_every_best_move() {
    let mut table = Table::two_ply();
    table.scores.insert("a2".to_string(), 0.0);
    let mut engine = ExpansionEngine::new(table).unwrap();
    let root = engine.tree().root();
    let solver = Minimax::new();
    let mut expansion = AdversarialSolver::<Table>::run_expansion(&solver, root);
    drain_expansion(&mut engine, expansion.as_mut());
    let mut algorithm = AdversarialSolver::<Table>::run_algorithm(&solver, root);
    drain_algorithm(&mut engine, algorithm.as_mut());

    let best = &engine.tree().entry(root).unwrap().best_moves;
    assert_eq!(ids(best), vec!["a", "b"]);
}

#[test]
fn shallow_depth_leaves_frontier() {
    let mut engine = ExpansionEngine::new(Table::two_ply()).unwrap();
    let root = engine.tree().root();
    let mut routine = AdversarialSolver::<Table>::run_expansion(&Minimax::new().initial_depth(1), root);
    // depth 1 expands only the root, depth 2 adds a and b, depth 3 adds nothing
    assert_eq!(drain_expansion(&mut engine, routine.as_mut()), 1 + 3 + 3);
    assert!(engine.tree().is_expanded(engine.tree().node_ix("b").unwrap()));
}

#[test]
fn unexpanded_positions_score_zero() {
    let mut engine = ExpansionEngine::new(Table::two_ply()).unwrap();
    let root = engine.tree().root();
    engine.expand_node(root).unwrap();
    let mut algorithm = AdversarialSolver::<Table>::run_algorithm(&Minimax::new(), root);
    assert_eq!(drain_algorithm(&mut engine, algorithm.as_mut()), 3);
    assert_eq!(engine.tree().utility(root), Some(0.0));
}

// =============================================================================
// Driver
// =============================================================================

#[test]
fn one_tick_solves_a_small_game() {
    let mut driver = driver(Table::two_ply(), DriverConfig::default());
    let report = driver.tick();
    assert!(report.expansion_done);
    assert!(report.algorithm_done);
    assert!(report.topology_changed);
    assert_eq!(report.algorithm_steps, 7);
    assert_eq!(ids(&report.play_sequence), vec!["b", "b1"]);
    assert!(report
        .notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Success && n.message == "Expansion complete"));

    let graph = driver.engine().tree().graph();
    let root = driver.root();
    let b = graph.node_ix("b").unwrap();
    let a = graph.node_ix("a").unwrap();
    assert!(graph.get_edge(root, b, false).unwrap().data().is_truthy("highlighted"));
    assert!(!graph.get_edge(root, a, false).unwrap().data().is_truthy("highlighted"));
}

#[test]
fn expansion_budget_resumes_across_ticks() {
    let config = DriverConfig::new().max_expansions(Budget::Limited(1));
    let mut driver = driver(Table::two_ply(), config);

    let first = driver.tick();
    assert_eq!(first.expansions, 1);
    assert!(!first.expansion_done);
    assert_eq!(driver.engine().tree().len(), 3);
    assert!(driver.has_expansion_routine());

    let second = driver.tick();
    assert_eq!(second.expansions, 1);
    assert_eq!(driver.engine().tree().len(), 5);

    driver.tick();
    assert_eq!(driver.engine().tree().len(), 7);
    let last = driver.tick();
    assert!(last.expansion_done);
    assert!(!last.topology_changed);
}

#[test]
fn zero_budget_pulls_nothing() {
    let config = DriverConfig::new()
        .max_expansions(Budget::Limited(0))
        .max_algorithm_steps(Budget::Limited(0));
    let mut driver = driver(Table::two_ply(), config);
    let report = driver.tick();
    assert_eq!(report.expansions, 0);
    assert_eq!(report.algorithm_steps, 0);
    assert_eq!(driver.engine().tree().len(), 1);
    assert!(report.play_sequence.is_empty());
}

#[test]
fn failing_step_keeps_the_routine() {
    let table = Table::two_ply();
    let broken = table.broken.clone();
    broken.set(true);
    let mut driver = driver(table, DriverConfig::default());

    let report = driver.tick();
    assert_eq!(report.expansions, 0);
    let error = report
        .notifications
        .iter()
        .find(|n| n.level == NotificationLevel::Error)
        .unwrap();
    assert!(error.message.contains("getActions exploded"));
    assert!(driver.has_expansion_routine());
    assert_eq!(driver.engine().tree().len(), 1);

    // the same step fails again while the rules stay broken
    let again = driver.tick();
    assert!(again.notifications.iter().any(|n| n.level == NotificationLevel::Error));

    broken.set(false);
    let fixed = driver.tick();
    assert!(fixed.expansion_done);
    assert_eq!(driver.engine().tree().len(), 7);
}

#[test]
fn tree_growth_restarts_the_algorithm() {
    let config = DriverConfig::new().max_expansions(Budget::Limited(1));
    let mut driver = driver(Table::two_ply(), config);
    let first = driver.tick();
    assert!(first.algorithm_done);
    let a = driver.engine().tree().node_ix("a").unwrap();
    assert_eq!(driver.engine().tree().utility(a), Some(0.0));

    // the finished routine from the first tick is not reused
    let report = driver.tick();
    assert!(report.topology_changed);
    assert!(report.algorithm_steps > 0);
    assert_eq!(driver.engine().tree().utility(a), Some(-1.0));
}

#[test]
fn expansion_complete_is_announced_once() {
    let mut driver = driver(Table::two_ply(), DriverConfig::default());
    let complete = |report: &plyboard_adversarial::TickReport| {
        report
            .notifications
            .iter()
            .filter(|n| n.message == "Expansion complete")
            .count()
    };
    let first = driver.tick();
    assert_eq!(complete(&first), 1);
    let second = driver.tick();
    assert!(second.expansion_done);
    assert_eq!(complete(&second), 0);
}

#[test]
fn finishing_pull_costs_no_algorithm_budget() {
    // evaluating the two-ply tree takes exactly seven steps
    let config = DriverConfig::new().max_algorithm_steps(Budget::Limited(8));
    let mut driver = driver(Table::two_ply(), config);
    let report = driver.tick();
    assert_eq!(report.algorithm_steps, 7);
    assert!(report.algorithm_done);
    assert_eq!(driver.engine().algorithm_budget(), Budget::Limited(1));
}

#[test]
fn new_root_rebuilds_routines() {
    let mut driver = driver(Table::two_ply(), DriverConfig::default());
    driver.tick();
    assert!(driver.has_expansion_routine());

    let table = Table::two_ply();
    driver.set_root(table.spot("r", Player::Max)).unwrap();
    assert!(driver.has_expansion_routine());

    driver.set_root(table.spot("a", Player::Min)).unwrap();
    assert!(!driver.has_expansion_routine());
    assert!(!driver.has_algorithm_routine());
    assert_eq!(driver.root_id(), "a");
    let report = driver.tick();
    assert_eq!(ids(&report.play_sequence), vec!["a2"]);
}

#[test]
fn endless_game_stops_on_timeout() {
    let mut table = Table::default();
    table.link("r", &["r"]);
    let config = DriverConfig::new().tick_timeout_ms(0);
    let mut driver = driver(table, config);
    let report = driver.tick();
    assert!(!report.expansion_done);
    assert!(report.expansions >= 1);
    assert!(report.notifications.iter().any(|n| n.message == "Timeout reached"));
}

// =============================================================================
// Build contract
// =============================================================================

/// Rules whose method table is supplied separately.
struct Described {
    table: Table,
    methods: MethodTable,
}

impl Case for Described {
    type Position = Spot;
    fn initial_position(&self) -> PlyResult<Spot> {
        self.table.initial_position()
    }
    fn actions(&self, position: &Spot) -> PlyResult<Vec<Action>> {
        self.table.actions(position)
    }
    fn result(&self, position: &Spot, action: &Action) -> PlyResult<Spot> {
        self.table.result(position, action)
    }
}

impl Capabilities for Described {
    fn arity(&self, method: &str) -> Option<usize> {
        self.methods.arity(method)
    }
}

/// Minimax exposing a partial method table.
struct Partial(MethodTable);

impl<C: Case> AdversarialSolver<C> for Partial {
    fn run_expansion(&self, root: NodeIx) -> Box<dyn ExpansionRoutine<C>> {
        AdversarialSolver::<C>::run_expansion(&Minimax::new(), root)
    }
    fn run_algorithm(&self, root: NodeIx) -> Box<dyn AlgorithmRoutine<C>> {
        AdversarialSolver::<C>::run_algorithm(&Minimax::new(), root)
    }
    fn play_sequence(&self, engine: &ExpansionEngine<C>, root: NodeIx) -> Vec<Move> {
        AdversarialSolver::<C>::play_sequence(&Minimax::new(), engine, root)
    }
}

impl Capabilities for Partial {
    fn arity(&self, method: &str) -> Option<usize> {
        self.0.arity(method)
    }
}

fn fault_of<T>(result: PlyResult<T>) -> (Fault, String) {
    match result {
        Err(PlyError::Build(e)) => (e.fault, e.message),
        Err(other) => panic!("unexpected error {}", other),
        Ok(_) => panic!("build should fail"),
    }
}

#[test]
fn case_with_wrong_arity_is_rejected() {
    let case = Described {
        table: Table::two_ply(),
        methods: MethodTable::from_checklist(CASE_CHECKLIST).with("getResult", 1),
    };
    let (fault, message) = fault_of(build_adversarial(|| Ok(case), || Ok(Minimax::new())));
    assert_eq!(fault, Fault::Case);
    assert!(message.starts_with("getResult method is not defined in the Case class"));
}

#[test]
fn failing_case_program_is_a_case_fault() {
    let (fault, message) = fault_of(build_adversarial::<Table, Minimax, _, _>(
        || Err(PlyError::script("Unexpected token")),
        || Ok(Minimax::new()),
    ));
    assert_eq!(fault, Fault::Case);
    assert_eq!(message, "Unexpected token");
}

#[test]
fn solver_missing_method_is_a_solver_fault() {
    let partial = Partial(MethodTable::new().with("getPlaySequence", 1).with("runExpansion", 1));
    let (fault, message) = fault_of(build_adversarial(|| Ok(Table::two_ply()), || Ok(partial)));
    assert_eq!(fault, Fault::Solver);
    assert!(message.contains("runAlgorithm"));
    assert!(message.contains("the Solution class"));
}
