//! GENERIC notation.
//!
//! ```text
//! GENERIC
//! NODE A {"label": "Start"}
//! NODE B
//! EDGE A B -b {"w": 3}
//! START A
//! GOAL B
//! ```

use plyboard_core::{DataBag, ParsingError, PlyResult};
use plyboard_graph::{Graph, NodeIx};
use tracing::warn;

use crate::lexer::{format_arg, parse_statement, Statement};
use crate::payload::{format_payload, serializable_data};
use crate::preprocess::SourceLine;

fn node_arg(graph: &Graph, stmt: &Statement, i: usize, phase: &str) -> PlyResult<NodeIx> {
    let arg = stmt.arg(i);
    graph.node_ix(&arg.value).ok_or_else(|| {
        ParsingError::new(
            format!("Invalid node ID in {}, received \"{}\"", phase, arg.value),
            stmt.line,
            arg.column,
        )
        .into()
    })
}

/// Build a free-form graph from the lines following the header.
///
/// A repeated `NODE` deep-merges its payload into the existing node.
pub fn parse_generic(lines: &[SourceLine<'_>]) -> PlyResult<Graph> {
    let mut graph = Graph::generic();
    for line in lines {
        let Some(stmt) = parse_statement(line)? else {
            continue;
        };
        match stmt.command.as_str() {
            "NODE" => {
                stmt.expect_args(1, "node setup")?;
                let id = &stmt.arg(0).value;
                match graph.node_ix(id) {
                    Some(ix) => {
                        if let Some(node) = graph.node_mut(ix) {
                            node.data.merge_in_place(&stmt.data)?;
                            node.style.merge_in_place(&stmt.style)?;
                        }
                    }
                    None => {
                        let ix = graph.add_node(id.clone(), stmt.data.clone())?;
                        if let Some(node) = graph.node_mut(ix) {
                            node.style = stmt.style.clone();
                        }
                    }
                }
            }
            "EDGE" => {
                stmt.expect_args(2, "edge setup")?;
                let source = node_arg(&graph, &stmt, 0, "edge setup")?;
                let target = node_arg(&graph, &stmt, 1, "edge setup")?;
                let bidirectional = stmt.has_flag("-b", "--bidirectional");
                let id = graph.add_edge(source, target, bidirectional, stmt.data.clone())?;
                if let Some(edge) = graph.edge_mut(id) {
                    edge.style = stmt.style.clone();
                }
            }
            "START" => {
                stmt.expect_args(1, "start node indication")?;
                let ix = node_arg(&graph, &stmt, 0, "start node indication")?;
                graph.set_start(Some(ix))?;
            }
            "GOAL" => {
                stmt.expect_args(1, "goal node indication")?;
                let ix = node_arg(&graph, &stmt, 0, "goal node indication")?;
                graph.set_end(Some(ix))?;
            }
            other => warn!(line = stmt.line, command = other, "ignoring unknown GENERIC command"),
        }
    }
    Ok(graph)
}

fn id_of(graph: &Graph, ix: NodeIx) -> String {
    graph
        .node(ix)
        .map(|n| format_arg(n.id()))
        .unwrap_or_default()
}

/// Write a free-form graph as GENERIC notation.
pub fn generic_to_notation(graph: &Graph) -> String {
    let mut lines = vec!["GENERIC".to_string()];
    for node in graph.get_all_nodes() {
        let payload = format_payload(serializable_data(&node.data, &[]), &node.style);
        lines.push(join_line(&["NODE", &format_arg(node.id())], payload));
    }
    lines.push(String::new());
    for edge in graph.get_all_edges() {
        let data: DataBag = serializable_data(edge.data(), &[]);
        let payload = format_payload(data, edge.style());
        let source = id_of(graph, edge.source_ix());
        let target = id_of(graph, edge.target_ix());
        let mut words = vec!["EDGE", source.as_str(), target.as_str()];
        if edge.bidirectional() {
            words.push("-b");
        }
        lines.push(join_line(&words, payload));
    }
    lines.push(String::new());
    if let Some(start) = graph.start() {
        lines.push(format!("START {}", format_arg(start.id())));
    }
    if let Some(goal) = graph.end() {
        lines.push(format!("GOAL {}", format_arg(goal.id())));
    }
    lines.join("\n")
}

pub(crate) fn join_line(words: &[&str], payload: Option<String>) -> String {
    let mut line = words.join(" ");
    if let Some(payload) = payload {
        line.push(' ');
        line.push_str(&payload);
    }
    line
}
