//! Notation documents parsed, edited and written back.

use plyboard::plyboard_graph::grid_node_id;
use plyboard::plyboard_notation::{parse_graph, to_notation};
use plyboard::types::{DiagonalWeight, Graph, GraphNotation, PlyError};

#[test]
fn generic_pair_round_trips() {
    let graph = Graph::from_notation("GENERIC\nNODE A\nNODE B\nEDGE A B -b").unwrap();
    let a = graph.node_ix("A").unwrap();
    let b = graph.node_ix("B").unwrap();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert!(graph.get_edge(a, b, false).unwrap().traversable());
    assert!(graph.get_edge(b, a, false).unwrap().traversable());

    let again = Graph::from_notation(&graph.stringify()).unwrap();
    assert_eq!(again.node_count(), 2);
    assert_eq!(again.edge_count(), 1);
    assert!(again.get_all_edges().next().unwrap().bidirectional());
}

#[test]
fn two_cell_grid_heuristic() {
    let graph = parse_graph("GRID 2x1\n1 1\nSTART 0 0\nGOAL 1 0").unwrap();
    let start = graph.start_ix().unwrap();
    assert_eq!(graph.heuristic(start), 1.0);
    assert_eq!(graph.grid_spec().unwrap().diagonal, DiagonalWeight::Disabled);
}

#[test]
fn grid_edits_survive_serialization() {
    let mut graph = parse_graph("GRID 3x2\n1 1 1\n1 0 1\nDIAGONAL euclidean\nSTART 0 0\nGOAL 2 1").unwrap();
    let a = graph.node_ix(&grid_node_id(0, 0)).unwrap();
    let b = graph.node_ix(&grid_node_id(1, 0)).unwrap();
    let id = graph.get_edge(a, b, true).unwrap().id();
    graph.edge_mut(id).unwrap().data.set("w", 5);

    let text = to_notation(&graph);
    let parsed = parse_graph(&text).unwrap();
    let a = parsed.node_ix(&grid_node_id(0, 0)).unwrap();
    let b = parsed.node_ix(&grid_node_id(1, 0)).unwrap();
    assert_eq!(parsed.get_edge(a, b, true).unwrap().weight(), 5.0);
    assert_eq!(parsed.grid_spec(), graph.grid_spec());
    assert_eq!(parsed.end().map(|n| n.id()), graph.end().map(|n| n.id()));
}

#[test]
fn errors_point_at_the_source() {
    let text = "GENERIC\n\nNODE A\n# a comment line\nEDGE A Missing";
    match parse_graph(text) {
        Err(PlyError::Parsing(e)) => {
            assert_eq!(e.line, 5);
            assert_eq!(e.column, 8);
            assert!(e.to_string().starts_with("Parsing error at line 5, col 8"));
        }
        other => panic!("unexpected {:?}", other.map(|g| g.node_count())),
    }
}

#[test]
fn unknown_graph_type_lists_supported_ones() {
    let err = parse_graph("TREE\nNODE A").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("GRID"));
    assert!(message.contains("GENERIC"));
}
