//! Layered graph snapshots sharing one undo timeline.

use std::mem;

use plyboard_core::{CommandHandler, PlyError, PlyResult, TriggeredCommand};

use crate::graph::Graph;
use crate::solution::SearchStep;

/// Stack of graph layers plus the command log that edits them.
///
/// The top layer is the current graph. Commands run against the whole
/// context so they can edit the current layer or push and pop layers.
#[derive(Debug, Default)]
pub struct GraphContext {
    layers: Vec<Graph>,
    handler: CommandHandler<GraphContext>,
}

impl GraphContext {
    /// Create a context, optionally with a first layer.
    pub fn new(graph: Option<Graph>) -> Self {
        let mut ctx = Self::default();
        if let Some(graph) = graph {
            ctx.push(graph);
        }
        ctx
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether there is no layer.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Current layer.
    pub fn graph(&self) -> Option<&Graph> {
        self.layers.last()
    }

    /// Current layer, mutably.
    pub fn graph_mut(&mut self) -> Option<&mut Graph> {
        self.layers.last_mut()
    }

    /// Current layer or an error.
    pub fn require_graph_mut(&mut self) -> PlyResult<&mut Graph> {
        self.layers
            .last_mut()
            .ok_or_else(|| PlyError::runtime("No graph layer is active."))
    }

    /// Push a new current layer.
    pub fn push(&mut self, graph: Graph) {
        self.layers.push(graph);
    }

    /// Pop the current layer.
    pub fn pop(&mut self) -> Option<Graph> {
        self.layers.pop()
    }

    /// Replace the current layer, pushing when there is none.
    pub fn update(&mut self, graph: Graph) {
        match self.layers.last_mut() {
            Some(top) => *top = graph,
            None => self.layers.push(graph),
        }
    }

    /// The command log.
    pub fn handler(&self) -> &CommandHandler<GraphContext> {
        &self.handler
    }

    /// The command log, mutably.
    pub fn handler_mut(&mut self) -> &mut CommandHandler<GraphContext> {
        &mut self.handler
    }

    /// Bring the layers to the log's logical position.
    ///
    /// The log is detached while its commands run so that they receive the
    /// context mutably.
    pub fn execute_to_current(&mut self) -> PlyResult<Vec<TriggeredCommand>> {
        let mut handler = mem::take(&mut self.handler);
        let result = handler.execute_to_current(self);
        self.handler = handler;
        result
    }

    /// Queue every recorded command for replay.
    ///
    /// Steps without a command are skipped. The logical cursor is rewound to
    /// the start so the host can single-step forward.
    pub fn load_steps(&mut self, steps: Vec<SearchStep>) -> PlyResult<usize> {
        let mut loaded = 0;
        for step in steps {
            if let Some(command) = step.command {
                self.handler.add_command(command);
                loaded += 1;
            }
        }
        let applied = self.handler.executed();
        self.handler.seek(applied)?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::LayerGraphCommand;
    use plyboard_core::Triggered;

    #[test]
    fn update_pushes_when_empty() {
        let mut ctx = GraphContext::new(None);
        assert!(ctx.graph().is_none());
        ctx.update(Graph::generic());
        assert_eq!(ctx.len(), 1);
        ctx.update(Graph::generic());
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn layer_command_pushes_and_pops() {
        let mut ctx = GraphContext::new(Some(Graph::generic()));
        let mut sub = Graph::generic();
        sub.add_node("inner", Default::default()).unwrap();
        ctx.handler_mut().add_command(LayerGraphCommand::new(sub).into_command());

        let touched = ctx.execute_to_current().unwrap();
        assert_eq!(touched.len(), 1);
        assert_eq!(ctx.len(), 2);
        assert!(ctx.graph().unwrap().get_node_by_id("inner").is_some());

        ctx.handler_mut().queue_undo().unwrap();
        let touched = ctx.execute_to_current().unwrap();
        assert_eq!(touched[0].direction, Triggered::Reverted);
        assert_eq!(ctx.len(), 1);

        ctx.handler_mut().queue_redo().unwrap();
        ctx.execute_to_current().unwrap();
        assert!(ctx.graph().unwrap().get_node_by_id("inner").is_some());
    }
}
