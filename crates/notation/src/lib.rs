//! Text notation for plyboard graphs
//!
//! Two line-oriented grammars, picked by the first line:
//! - `GENERIC`: free-form nodes and edges, see [`generic`]
//! - `GRID WxH`: a traversability matrix plus lattice tweaks, see [`grid`]
//!
//! Parsing and serialization are semantic inverses: `parse(serialize(g))`
//! has the same nodes, edges, weights, traversability, start and goal as `g`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generic;
pub mod grid;
pub mod lexer;
mod payload;
pub mod preprocess;

use plyboard_core::{ParsingError, PlyResult, Value};
use plyboard_graph::{Graph, Shape, StepRecorder};

pub use generic::{generic_to_notation, parse_generic};
pub use grid::{grid_to_notation, parse_grid};
pub use lexer::{format_arg, parse_statement, Arg, Statement, COMMAND_EXAMPLE};
pub use preprocess::{parse_header, preprocess, Header, SourceLine, GRAPH_TYPE_NAMES};

/// Parse a notation document into a graph.
pub fn parse_graph(text: &str) -> PlyResult<Graph> {
    let lines = preprocess(text);
    let Some((header, body)) = lines.split_first() else {
        return Err(ParsingError::new(
            "The graph expression must have at least 1 line indicating the graph type",
            1,
            0,
        )
        .with_example("GENERIC")
        .into());
    };
    match parse_header(header)? {
        Header::Generic => parse_generic(body),
        Header::Grid { width, height } => parse_grid(header.number, width, height, body),
    }
}

/// Serialize a graph in the grammar matching its shape.
pub fn to_notation(graph: &Graph) -> String {
    match graph.shape() {
        Shape::Generic => generic_to_notation(graph),
        Shape::Grid(_) => grid_to_notation(graph),
    }
}

/// Notation entry points on [`Graph`].
pub trait GraphNotation: Sized {
    /// Parse a notation document.
    fn from_notation(text: &str) -> PlyResult<Self>;

    /// Serialize to notation.
    fn stringify(&self) -> String;
}

impl GraphNotation for Graph {
    fn from_notation(text: &str) -> PlyResult<Self> {
        parse_graph(text)
    }

    fn stringify(&self) -> String {
        to_notation(self)
    }
}

/// Lets a solver switch the replay to a graph written in notation.
pub trait RecorderNotation {
    /// Parse `text`, record a layer push for it and return a working copy.
    fn create_from_notation(&mut self, text: &str, debug_value: Value) -> PlyResult<Graph>;
}

impl RecorderNotation for StepRecorder<'_> {
    fn create_from_notation(&mut self, text: &str, debug_value: Value) -> PlyResult<Graph> {
        let graph = parse_graph(text)?;
        Ok(self.create(graph, debug_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plyboard_core::PlyError;
    use plyboard_graph::GraphContext;

    #[test]
    fn empty_document() {
        match parse_graph("  \n\n ") {
            Err(PlyError::Parsing(e)) => assert_eq!(e.line, 1),
            other => panic!("unexpected {:?}", other.map(|g| g.node_count())),
        }
    }

    #[test]
    fn dispatch_on_header() {
        assert!(!Graph::from_notation("GENERIC\nNODE A").unwrap().is_grid());
        assert!(Graph::from_notation("GRID 1x1\n1").unwrap().is_grid());
    }

    #[test]
    fn recorder_creates_layer_from_text() {
        let base = Graph::from_notation("GENERIC\nNODE A").unwrap();
        let mut recorder = StepRecorder::new(&base);
        let copy = recorder
            .create_from_notation("GENERIC\nNODE X\nNODE Y", Value::Null)
            .unwrap();
        assert_eq!(copy.node_count(), 2);
        let steps = recorder.into_steps();
        assert_eq!(steps.len(), 1);

        let mut ctx = GraphContext::new(Some(base));
        ctx.load_steps(steps).unwrap();
        ctx.handler_mut().queue_redo().unwrap();
        ctx.execute_to_current().unwrap();
        assert!(ctx.graph().unwrap().get_node_by_id("X").is_some());
    }

    #[test]
    fn bad_text_is_not_recorded() {
        let base = Graph::generic();
        let mut recorder = StepRecorder::new(&base);
        assert!(recorder.create_from_notation("TREE", Value::Null).is_err());
        assert!(recorder.steps().is_empty());
    }
}
