//! Reversible commands over a [`GraphContext`].

use plyboard_core::{Command, PlyError, PlyResult, Reversible, Value};

use crate::context::GraphContext;
use crate::graph::Graph;
use crate::types::{PropertyTarget, SearchOutcome};

type GraphFn = Box<dyn FnMut(&mut Graph) -> PlyResult<()>>;
type ContextFn = Box<dyn FnMut(&mut GraphContext) -> PlyResult<()>>;

/// Closure pair applied to the current layer.
pub struct GraphCommand {
    name: String,
    forward: GraphFn,
    backward: GraphFn,
}

impl GraphCommand {
    /// Pair a forward and a backward edit of the current layer.
    pub fn new<D, U>(name: impl Into<String>, forward: D, backward: U) -> Self
    where
        D: FnMut(&mut Graph) -> PlyResult<()> + 'static,
        U: FnMut(&mut Graph) -> PlyResult<()> + 'static,
    {
        Self {
            name: name.into(),
            forward: Box::new(forward),
            backward: Box::new(backward),
        }
    }

    /// Wrap as a loggable command.
    pub fn into_command(self) -> Command<GraphContext> {
        let name = self.name.clone();
        Command::new(name, self)
    }
}

impl Reversible<GraphContext> for GraphCommand {
    fn apply(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        (self.forward)(ctx.require_graph_mut()?)
    }

    fn revert(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        (self.backward)(ctx.require_graph_mut()?)
    }
}

/// Closure pair applied to the whole context.
pub struct MetaGraphCommand {
    name: String,
    forward: ContextFn,
    backward: ContextFn,
}

impl MetaGraphCommand {
    /// Pair a forward and a backward edit of the context.
    pub fn new<D, U>(name: impl Into<String>, forward: D, backward: U) -> Self
    where
        D: FnMut(&mut GraphContext) -> PlyResult<()> + 'static,
        U: FnMut(&mut GraphContext) -> PlyResult<()> + 'static,
    {
        Self {
            name: name.into(),
            forward: Box::new(forward),
            backward: Box::new(backward),
        }
    }

    /// Wrap as a loggable command.
    pub fn into_command(self) -> Command<GraphContext> {
        let name = self.name.clone();
        Command::new(name, self)
    }
}

impl Reversible<GraphContext> for MetaGraphCommand {
    fn apply(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        (self.forward)(ctx)
    }

    fn revert(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        (self.backward)(ctx)
    }
}

/// Enter a derived graph; leaving it again on undo.
///
/// The layer moves into the context on execute and back into the command on
/// revert, so redo pushes the very same graph.
pub struct LayerGraphCommand {
    layer: Option<Graph>,
}

impl LayerGraphCommand {
    /// Command that pushes `graph`.
    pub fn new(graph: Graph) -> Self {
        Self { layer: Some(graph) }
    }

    /// Wrap as a loggable command.
    pub fn into_command(self) -> Command<GraphContext> {
        Command::new("Set Graph", self)
    }
}

impl Reversible<GraphContext> for LayerGraphCommand {
    fn apply(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let layer = self
            .layer
            .take()
            .ok_or_else(|| PlyError::command("Layer already pushed."))?;
        ctx.push(layer);
        Ok(())
    }

    fn revert(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let layer = ctx
            .pop()
            .ok_or_else(|| PlyError::command("No layer to pop."))?;
        self.layer = Some(layer);
        Ok(())
    }
}

/// Tag the current layer's search outcome.
pub struct GraphOutcomeCommand {
    outcome: SearchOutcome,
}

impl GraphOutcomeCommand {
    /// Mark the search successful.
    pub fn success() -> Command<GraphContext> {
        Command::new("Mark Graph Successful", Self { outcome: SearchOutcome::Success })
    }

    /// Mark the search failed.
    pub fn failure() -> Command<GraphContext> {
        Command::new("Mark Graph Failed", Self { outcome: SearchOutcome::Failure })
    }
}

impl Reversible<GraphContext> for GraphOutcomeCommand {
    fn apply(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let graph = ctx.require_graph_mut()?;
        match self.outcome {
            SearchOutcome::Success => graph.complete(),
            SearchOutcome::Failure => graph.fail(),
            SearchOutcome::None => {}
        }
        Ok(())
    }

    fn revert(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let graph = ctx.require_graph_mut()?;
        match self.outcome {
            SearchOutcome::Success => graph.uncomplete(),
            SearchOutcome::Failure => graph.unfail(),
            SearchOutcome::None => {}
        }
        Ok(())
    }
}

/// Flip a node between traversable and blocked.
///
/// On grids the node's template edges are refreshed afterwards.
pub struct NodeTraverseToggleCommand {
    node: String,
    previous: Option<Option<Value>>,
}

impl NodeTraverseToggleCommand {
    /// Toggle the node with `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            node: id.into(),
            previous: None,
        }
    }

    /// Wrap as a loggable command.
    pub fn into_command(self) -> Command<GraphContext> {
        Command::new("Toggle Traverse", self)
    }

    fn refresh(graph: &mut Graph, ix: usize) -> PlyResult<()> {
        if graph.is_grid() {
            graph.update_base_edges(ix)?;
        }
        Ok(())
    }
}

impl Reversible<GraphContext> for NodeTraverseToggleCommand {
    fn apply(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let graph = ctx.require_graph_mut()?;
        let ix = graph.ensure_node_ix(&self.node)?;
        if let Some(node) = graph.node_mut(ix) {
            let blocked = !node.traversable();
            self.previous = Some(node.data.insert("traversable".into(), Value::from(blocked)));
        }
        Self::refresh(graph, ix)
    }

    fn revert(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let graph = ctx.require_graph_mut()?;
        let ix = graph.ensure_node_ix(&self.node)?;
        if let (Some(node), Some(previous)) = (graph.node_mut(ix), self.previous.take()) {
            match previous {
                Some(value) => {
                    node.data.insert("traversable".into(), value);
                }
                None => {
                    node.data.remove("traversable");
                }
            }
        }
        Self::refresh(graph, ix)
    }
}

/// One property update with the value it replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    /// Entity in the current layer.
    pub target: PropertyTarget,
    /// Property name.
    pub property: String,
    /// Value restored on revert.
    pub old_value: Value,
    /// Value written on execute.
    pub new_value: Value,
}

/// Batch of property updates applied through the Property Protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChangeCommand {
    changes: Vec<PropertyChange>,
}

impl PropertyChangeCommand {
    /// Command applying `changes` in order.
    pub fn new(changes: Vec<PropertyChange>) -> Self {
        Self { changes }
    }

    /// The recorded changes.
    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }

    /// Wrap as a loggable command.
    pub fn into_command(self) -> Command<GraphContext> {
        Command::new("Change Property", self)
    }
}

impl Reversible<GraphContext> for PropertyChangeCommand {
    fn apply(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let graph = ctx.require_graph_mut()?;
        for change in &self.changes {
            graph.set_target_prop(&change.target, &change.property, change.new_value.clone())?;
        }
        Ok(())
    }

    fn revert(&mut self, ctx: &mut GraphContext) -> PlyResult<()> {
        let graph = ctx.require_graph_mut()?;
        for change in self.changes.iter().rev() {
            graph.set_target_prop(&change.target, &change.property, change.old_value.clone())?;
        }
        Ok(())
    }
}
