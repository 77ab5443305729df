//! Property tests: parsing a serialized graph gives back the same graph.

use plyboard_core::{DataBag, Value};
use plyboard_graph::{DiagonalWeight, EdgeView, Graph, TRANSIENT_KEYS};
use plyboard_notation::{parse_graph, to_notation};
use proptest::prelude::*;

// =============================================================================
// Semantic snapshot
// =============================================================================

#[derive(Debug, PartialEq)]
struct Snapshot {
    grid: Option<(usize, usize, String)>,
    nodes: Vec<(String, bool, Value, Value)>,
    edges: Vec<(String, String, bool, String, bool, bool)>,
    start: Option<String>,
    goal: Option<String>,
}

fn comparable(data: &DataBag, skip: &[&str]) -> Value {
    let kept: plyboard_core::Map = data
        .iter()
        .filter(|(k, _)| !TRANSIENT_KEYS.contains(&k.as_str()) && !skip.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(kept)
}

fn edge_key(view: &EdgeView<'_>) -> (String, String, bool, String, bool, bool) {
    let source = view.source().map(|n| n.id().to_string()).unwrap_or_default();
    let target = view.target().map(|n| n.id().to_string()).unwrap_or_default();
    let forward = view.traversable();
    let backward = view.reverse().traversable();
    let weight = format!("{}", view.weight());
    if view.bidirectional() && target < source {
        (target, source, true, weight, backward, forward)
    } else {
        (source, target, view.bidirectional(), weight, forward, backward)
    }
}

fn snapshot(graph: &Graph) -> Snapshot {
    let skip: &[&str] = if graph.is_grid() { &["traversable"] } else { &[] };
    let mut nodes: Vec<_> = graph
        .get_all_nodes()
        .map(|n| {
            (
                n.id().to_string(),
                n.traversable(),
                comparable(&n.data, skip),
                Value::Object(n.style.clone().into_inner()),
            )
        })
        .collect();
    nodes.sort_by(|a, b| a.0.cmp(&b.0));
    let mut edges: Vec<_> = graph.get_all_edges().map(|e| edge_key(&e)).collect();
    edges.sort();
    Snapshot {
        grid: graph
            .grid_spec()
            .map(|spec| (spec.width, spec.height, spec.diagonal.to_string())),
        nodes,
        edges,
        start: graph.start().map(|n| n.id().to_string()),
        goal: graph.end().map(|n| n.id().to_string()),
    }
}

fn assert_round_trip(graph: &Graph) -> Result<(), TestCaseError> {
    let text = to_notation(graph);
    let parsed = parse_graph(&text).map_err(|e| TestCaseError::fail(format!("{}\n{}", e, text)))?;
    prop_assert_eq!(snapshot(graph), snapshot(&parsed), "notation:\n{}", text);
    Ok(())
}

fn pick<T: Copy>(items: &[T], seed: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[seed % items.len()])
    }
}

// =============================================================================
// Generic graphs
// =============================================================================

#[derive(Debug, Clone)]
struct EdgeSpec {
    source: usize,
    target: usize,
    bidirectional: bool,
    weight: Option<u8>,
    flipped: bool,
    color: Option<String>,
}

fn arb_edge() -> impl Strategy<Value = EdgeSpec> {
    (
        any::<usize>(),
        any::<usize>(),
        any::<bool>(),
        prop::option::of(1u8..9),
        any::<bool>(),
        prop::option::of("[a-z]{1,5}"),
    )
        .prop_map(|(source, target, bidirectional, weight, flipped, color)| EdgeSpec {
            source,
            target,
            bidirectional,
            weight,
            flipped,
            color,
        })
}

fn arb_generic() -> impl Strategy<Value = Graph> {
    (
        prop::collection::btree_set("[A-Za-z0-9 _\"#{-]{1,6}", 1..7),
        prop::collection::vec((prop::option::of("[a-z ]{0,6}"), any::<bool>(), prop::option::of(0u8..5)), 7),
        prop::collection::vec(arb_edge(), 0..10),
        prop::option::of(any::<usize>()),
        prop::option::of(any::<usize>()),
    )
        .prop_map(|(ids, node_data, edges, start, goal)| {
            let mut graph = Graph::generic();
            let mut slots = Vec::new();
            for (id, (label, blocked, h)) in ids.into_iter().zip(node_data) {
                let mut data = DataBag::new();
                if let Some(label) = label {
                    data.set("label", label);
                }
                if blocked {
                    data.set("traversable", false);
                }
                if let Some(h) = h {
                    data.set("h", h);
                }
                data.set("state", "visited");
                slots.push(graph.add_node(id, data).unwrap());
            }
            for spec in edges {
                let (source, target) = (pick(&slots, spec.source).unwrap(), pick(&slots, spec.target).unwrap());
                let mut data = DataBag::new();
                if let Some(w) = spec.weight {
                    data.set("w", w);
                }
                if spec.flipped {
                    data.set("flipped", true);
                }
                let id = graph.add_edge(source, target, spec.bidirectional, data).unwrap();
                if let Some(color) = spec.color {
                    graph.edge_mut(id).unwrap().style.set("color", color);
                }
            }
            graph.set_start(start.and_then(|s| pick(&slots, s))).unwrap();
            graph.set_end(goal.and_then(|s| pick(&slots, s))).unwrap();
            graph
        })
}

// =============================================================================
// Grid graphs
// =============================================================================

#[derive(Debug, Clone)]
struct EdgeTweak {
    seed: usize,
    weight: Option<u8>,
    bidirectional: bool,
    flipped: bool,
    reorient: bool,
}

fn arb_tweak() -> impl Strategy<Value = EdgeTweak> {
    (any::<usize>(), prop::option::of(1u8..5), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(seed, weight, bidirectional, flipped, reorient)| EdgeTweak {
            seed,
            weight,
            bidirectional,
            flipped,
            reorient,
        },
    )
}

fn arb_diagonal() -> impl Strategy<Value = DiagonalWeight> {
    prop_oneof![
        Just(DiagonalWeight::Disabled),
        Just(DiagonalWeight::Chebyshev),
        Just(DiagonalWeight::Euclidean),
        Just(DiagonalWeight::Manhattan),
        Just(DiagonalWeight::Custom(3.0)),
    ]
}

fn arb_grid() -> impl Strategy<Value = Graph> {
    (
        1usize..5,
        1usize..5,
        prop::collection::vec(any::<bool>(), 16),
        arb_diagonal(),
        prop::collection::vec(arb_tweak(), 0..6),
        prop::collection::vec((any::<usize>(), 0u8..9), 0..3),
        any::<usize>(),
        any::<usize>(),
    )
        .prop_map(|(w, h, open, diagonal, tweaks, hints, start, goal)| {
            let mut graph = Graph::grid(w, h, DiagonalWeight::Disabled).unwrap();
            graph.set_diagonal(diagonal).unwrap();
            let slots: Vec<_> = graph.get_all_nodes().map(|n| n.ix()).collect();
            for (i, ix) in slots.iter().enumerate() {
                if !open[i % open.len()] {
                    graph.node_mut(*ix).unwrap().data.set("traversable", false);
                }
            }
            for (seed, value) in hints {
                let ix = pick(&slots, seed).unwrap();
                graph.node_mut(ix).unwrap().data.set("h", value);
            }
            let edges: Vec<_> = graph.get_all_edges().map(|e| e.id()).collect();
            for tweak in tweaks {
                let Some(id) = pick(&edges, tweak.seed) else {
                    continue;
                };
                if tweak.reorient {
                    graph.reorient_edge(id).unwrap();
                }
                let edge = graph.edge_mut(id).unwrap();
                if let Some(weight) = tweak.weight {
                    edge.data.set("w", weight);
                }
                if tweak.flipped {
                    edge.data.set("flipped", true);
                }
                edge.bidirectional = tweak.bidirectional;
            }
            graph.set_start(pick(&slots, start)).unwrap();
            graph.set_end(pick(&slots, goal)).unwrap();
            graph
        })
}

proptest! {
    #[test]
    fn generic_graphs_survive_notation(graph in arb_generic()) {
        assert_round_trip(&graph)?;
    }

    #[test]
    fn grid_graphs_survive_notation(graph in arb_grid()) {
        assert_round_trip(&graph)?;
    }
}

#[test]
fn replay_state_is_not_written() {
    let mut graph = Graph::generic();
    let mut data = DataBag::new();
    data.set("state", "expanded");
    data.set("highlighted", true);
    graph.add_node("A", data).unwrap();
    assert_eq!(to_notation(&graph), "GENERIC\nNODE A\n\n");
}

#[test]
fn control_characters_in_ids_survive_notation() {
    let mut graph = Graph::generic();
    let a = graph.add_node("line\nbreak", DataBag::new()).unwrap();
    graph.add_node("tab\there", DataBag::new()).unwrap();
    graph.add_node("cr\r", DataBag::new()).unwrap();
    graph.set_start(Some(a)).unwrap();
    let text = to_notation(&graph);
    assert!(text.contains("NODE \"line\\nbreak\""), "{}", text);
    let parsed = parse_graph(&text).unwrap();
    assert_eq!(snapshot(&graph), snapshot(&parsed));
}
