//! GRID notation.
//!
//! ```text
//! GRID 3x2
//! 1 1 0
//! 1 1 1
//! DIAGONAL euclidean
//! NODE 2 1 {"h": 0}
//! EDGE 0 0 1 0 {"w": 5}
//! START 0 0
//! GOAL 2 1
//! ```
//!
//! The matrix rows give each cell's traversability, top row first. Commands
//! then adjust the lattice; `EDGE` only edits an existing template edge.

use plyboard_core::{DataBag, ParsingError, PlyResult, Value};
use plyboard_graph::{grid_node_id, weight_of, DiagonalWeight, EdgeView, Graph, LatticeStep, NodeIx};
use tracing::warn;

use crate::generic::join_line;
use crate::lexer::{parse_statement, tokens_with_columns, Statement};
use crate::payload::{format_payload, serializable_data};
use crate::preprocess::SourceLine;

fn coords_arg(graph: &Graph, stmt: &Statement, first: usize, phase: &str) -> PlyResult<NodeIx> {
    let mut coords = [0usize; 2];
    for (slot, arg) in coords.iter_mut().zip(&stmt.args[first..first + 2]) {
        *slot = arg.value.parse::<usize>().map_err(|_| {
            ParsingError::new(
                format!("Invalid coordinate in {}, received \"{}\"", phase, arg.value),
                stmt.line,
                arg.column,
            )
            .with_example(format!("{} 0 0", stmt.command))
        })?;
    }
    let [x, y] = coords;
    graph.node_by_coords(x, y).map(|n| n.ix()).ok_or_else(|| {
        let (width, height) = graph
            .grid_spec()
            .map_or((0, 0), |spec| (spec.width, spec.height));
        ParsingError::new(
            format!(
                "Invalid node coordinates in {}, received ({},{}), but graph is ({}x{})",
                phase, x, y, width, height
            ),
            stmt.line,
            stmt.arg(first).column,
        )
        .into()
    })
}

fn parse_rows(graph: &mut Graph, header_line: usize, width: usize, height: usize, rows: &[SourceLine<'_>]) -> PlyResult<()> {
    if rows.len() < height {
        let line = rows.last().map_or(header_line, |l| l.number) + 1;
        return Err(ParsingError::new(
            format!(
                "Invalid grid, expected {} rows of traversability values, got {}",
                height,
                rows.len()
            ),
            line,
            0,
        )
        .with_example(vec!["1"; width].join(" "))
        .into());
    }
    for (y, row) in rows.iter().take(height).enumerate() {
        let tokens = tokens_with_columns(row.text);
        let mut values = Vec::with_capacity(tokens.len());
        for (column, token) in &tokens {
            let value = token.parse::<i64>().map_err(|_| {
                ParsingError::new(
                    format!("Invalid traversability value, received \"{}\" ({})", token, row.text),
                    row.number,
                    *column,
                )
                .with_example("1")
            })?;
            values.push(value);
        }
        if values.len() != width {
            return Err(ParsingError::new(
                format!(
                    "Invalid grid row, expected {} numeric values, got {} ({})",
                    width,
                    values.len(),
                    row.text
                ),
                row.number,
                0,
            )
            .with_example(vec!["1"; width].join(" "))
            .into());
        }
        for (x, value) in values.into_iter().enumerate() {
            let ix = graph.ensure_node_by_coords(x, y)?;
            if let Some(node) = graph.node_mut(ix) {
                node.data.set("traversable", value > 0);
            }
        }
    }
    Ok(())
}

/// Build a grid graph from the header dimensions and the lines after it.
pub fn parse_grid(header_line: usize, width: usize, height: usize, lines: &[SourceLine<'_>]) -> PlyResult<Graph> {
    let mut graph = Graph::grid(width, height, DiagonalWeight::Disabled)?;
    parse_rows(&mut graph, header_line, width, height, lines)?;

    for line in lines.iter().skip(height) {
        let Some(stmt) = parse_statement(line)? else {
            continue;
        };
        match stmt.command.as_str() {
            "NODE" => {
                stmt.expect_args(2, "node setup")?;
                let ix = coords_arg(&graph, &stmt, 0, "node setup")?;
                if let Some(node) = graph.node_mut(ix) {
                    let matrix_value = node.data.get("traversable").cloned();
                    let mut data = stmt.data.clone();
                    if let (Some(value), false) = (matrix_value, data.contains_key("traversable")) {
                        data.set("traversable", value);
                    }
                    node.data = data;
                    node.style = stmt.style.clone();
                }
            }
            "DIAGONAL" => {
                stmt.expect_args(1, "diagonal setting")?;
                let arg = stmt.arg(0);
                let mode = DiagonalWeight::parse(&arg.value).ok_or_else(|| {
                    let names: Vec<&str> = DiagonalWeight::NAMED.iter().map(|(name, _)| *name).collect();
                    ParsingError::new(
                        format!(
                            "Invalid diagonal weight mode, expected one of {} or a number, got {}",
                            names.join(", "),
                            arg.value
                        ),
                        stmt.line,
                        arg.column,
                    )
                    .with_example("DIAGONAL euclidean")
                })?;
                graph.set_diagonal(mode)?;
            }
            "EDGE" => {
                stmt.expect_args(4, "edge setup")?;
                let source = coords_arg(&graph, &stmt, 0, "edge setup")?;
                let target = coords_arg(&graph, &stmt, 2, "edge setup")?;
                let id = graph.get_edge(source, target, true).map(|view| view.id()).ok_or_else(|| {
                    let name = |ix| graph.node(ix).map_or_else(String::new, |n| n.id().to_string());
                    ParsingError::new(
                        format!(
                            "No edge exists between the two given nodes ({} and {})",
                            name(source),
                            name(target)
                        ),
                        stmt.line,
                        stmt.arg(0).column,
                    )
                })?;
                if id.is_reverse() {
                    graph.reorient_edge(id)?;
                }
                if let Some(edge) = graph.edge_mut(id) {
                    for (key, value) in stmt.data.iter() {
                        edge.data.insert(key.clone(), value.clone());
                    }
                    for (key, value) in stmt.style.iter() {
                        edge.style.insert(key.clone(), value.clone());
                    }
                    edge.bidirectional = stmt.has_flag("-b", "--bidirectional");
                }
            }
            "START" => {
                stmt.expect_args(2, "start node indication")?;
                let ix = coords_arg(&graph, &stmt, 0, "start node indication")?;
                graph.set_start(Some(ix))?;
            }
            "GOAL" => {
                stmt.expect_args(2, "goal node indication")?;
                let ix = coords_arg(&graph, &stmt, 0, "goal node indication")?;
                graph.set_end(Some(ix))?;
            }
            other => warn!(line = stmt.line, command = other, "ignoring unknown GRID command"),
        }
    }
    Ok(graph)
}

/// Keys a template edge carries without being told: `(w, forbidden)`.
fn implied_edge_data(step: LatticeStep, diagonal: DiagonalWeight) -> (f64, bool) {
    match step {
        LatticeStep::Orthogonal => (1.0, false),
        LatticeStep::Diagonal => (diagonal.value(), diagonal.value() < 0.0),
    }
}

fn edge_payload(edge: &EdgeView<'_>, step: LatticeStep, diagonal: DiagonalWeight) -> DataBag {
    let (implied_weight, implied_forbidden) = implied_edge_data(step, diagonal);
    let data = edge.data();
    let mut skip = Vec::new();
    let weight_implied = match step {
        LatticeStep::Diagonal => data.get_f64("w") == Some(implied_weight),
        LatticeStep::Orthogonal => weight_of(data) == implied_weight,
    };
    if weight_implied {
        skip.push("w");
    }
    let forbidden_implied = match data.get("forbidden") {
        Some(Value::Bool(b)) => *b == implied_forbidden,
        None => !implied_forbidden,
        Some(_) => false,
    };
    if forbidden_implied {
        skip.push("forbidden");
    }
    serializable_data(data, &skip)
}

/// Write a grid graph as GRID notation.
///
/// Template edges whose data, style and bidirectionality are all implied by
/// the lattice are left out.
pub fn grid_to_notation(graph: &Graph) -> String {
    let Some(spec) = graph.grid_spec() else {
        return String::new();
    };
    let mut lines = vec![format!("GRID {}x{}", spec.width, spec.height)];
    for y in 0..spec.height {
        let row: Vec<String> = (0..spec.width)
            .map(|x| match graph.node_by_coords(x, y) {
                Some(node) if node.traversable() => "1".to_string(),
                Some(_) => "0".to_string(),
                None => format!("?{}", grid_node_id(x, y)),
            })
            .collect();
        lines.push(row.join(" "));
    }
    lines.push(format!("DIAGONAL {}", spec.diagonal));
    if let Some(start) = graph.start() {
        lines.push(format!("START {} {}", start.x(), start.y()));
    }
    if let Some(goal) = graph.end() {
        lines.push(format!("GOAL {} {}", goal.x(), goal.y()));
    }

    for node in graph.get_all_nodes() {
        let payload = format_payload(serializable_data(&node.data, &["traversable"]), &node.style);
        if payload.is_some() {
            let (x, y) = (node.x().to_string(), node.y().to_string());
            lines.push(join_line(&["NODE", &x, &y], payload));
        }
    }

    for edge in graph.get_all_edges() {
        let (source, target) = match (edge.source(), edge.target()) {
            (Some(s), Some(t)) => (s, t),
            _ => continue,
        };
        let Some(step) = graph.lattice_step(source.ix(), target.ix()) else {
            warn!(edge = %edge.id(), "skipping non-lattice edge in GRID notation");
            continue;
        };
        let payload = format_payload(edge_payload(&edge, step, spec.diagonal), edge.style());
        if payload.is_none() && edge.bidirectional() {
            continue;
        }
        let coords = [source.x(), source.y(), target.x(), target.y()].map(|c| c.to_string());
        let mut words = vec!["EDGE", &coords[0], &coords[1], &coords[2], &coords[3]];
        if edge.bidirectional() {
            words.push("-b");
        }
        lines.push(join_line(&words, payload));
    }
    lines.join("\n")
}
