//! Solver runs recorded as steps and replayed through a graph context.

use plyboard::plyboard_graph::{
    build_graph_search_solver, solution_steps, BreadthFirstSolver, NodeTraverseToggleCommand, PropertyTarget,
    SearchOutcome,
};
use plyboard::plyboard_notation::{parse_graph, to_notation};
use plyboard::types::{GraphContext, Inspectable, Value};

const CORRIDOR: &str = "GRID 3x1\n1 1 1\nSTART 0 0\nGOAL 2 0";

#[test]
fn breadth_first_replays_forward_and_back() {
    let graph = parse_graph(CORRIDOR).unwrap();
    let mut solver = build_graph_search_solver(BreadthFirstSolver::new()).unwrap();
    let steps = solution_steps(solver.as_mut(), &graph).unwrap();
    assert!(steps.last().unwrap().is_terminal);

    let mut ctx = GraphContext::new(Some(graph));
    let loaded = ctx.load_steps(steps).unwrap();
    assert!(loaded > 0);
    ctx.handler_mut().seek(loaded).unwrap();
    ctx.execute_to_current().unwrap();
    let solved = ctx.graph().unwrap();
    assert_eq!(solved.outcome(), SearchOutcome::Success);
    assert_eq!(solved.get_node_by_id("2_0").unwrap().state(), "expanded");

    ctx.handler_mut().seek(0).unwrap();
    let reverted = ctx.execute_to_current().unwrap();
    assert_eq!(reverted.len(), loaded);
    let fresh = ctx.graph().unwrap();
    assert_eq!(fresh.outcome(), SearchOutcome::None);
    assert!(fresh.get_all_nodes().all(|n| n.state().is_empty()));
}

#[test]
fn replay_state_never_reaches_the_notation() {
    let graph = parse_graph(CORRIDOR).unwrap();
    let before = to_notation(&graph);
    let mut solver = BreadthFirstSolver::new();
    let steps = solution_steps(&mut solver, &graph).unwrap();
    let mut ctx = GraphContext::new(Some(graph));
    let loaded = ctx.load_steps(steps).unwrap();
    ctx.handler_mut().seek(loaded).unwrap();
    ctx.execute_to_current().unwrap();
    assert_eq!(to_notation(ctx.graph().unwrap()), before);
}

#[test]
fn toggling_a_cell_is_undoable() {
    let graph = parse_graph(CORRIDOR).unwrap();
    let before = to_notation(&graph);
    let mut ctx = GraphContext::new(Some(graph));

    ctx.handler_mut()
        .add_command(NodeTraverseToggleCommand::new("1_0").into_command());
    ctx.execute_to_current().unwrap();
    let blocked = ctx.graph().unwrap();
    assert!(!blocked.get_node_by_id("1_0").unwrap().traversable());
    assert!(to_notation(blocked).contains("\n1 0 1\n"));

    ctx.handler_mut().queue_undo().unwrap();
    ctx.execute_to_current().unwrap();
    assert_eq!(to_notation(ctx.graph().unwrap()), before);
}

#[test]
fn grid_properties_resize_through_the_protocol() {
    let mut graph = parse_graph(CORRIDOR).unwrap();
    {
        let mut entity = graph.entity(PropertyTarget::Graph);
        assert!(entity.set_prop("width", Value::from(4)).unwrap());
        assert!(entity.set_prop("width", Value::from(0)).is_err());
        assert!(!entity.set_prop("colour", Value::from("red")).unwrap());
    }
    assert_eq!(graph.grid_spec().unwrap().width, 4);
    assert_eq!(graph.node_count(), 4);
    assert!(to_notation(&graph).starts_with("GRID 4x1\n"));
}
