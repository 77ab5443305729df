//! Step recording for graph search solvers.
//!
//! A solver describes its reasoning through a [`StepRecorder`]. Every call
//! produces a [`SearchStep`] carrying a debug value and, usually, a command
//! that the host later replays against a [`crate::GraphContext`].

use std::collections::{HashMap, VecDeque};
use std::fmt;

use plyboard_core::{arity_in, validate, BuildError, Capabilities, Command, Fault, MethodSpec, PlyError, PlyResult, Value};

use crate::commands::{GraphOutcomeCommand, LayerGraphCommand, PropertyChange, PropertyChangeCommand};
use crate::context::GraphContext;
use crate::graph::Graph;
use crate::types::{NodeIx, PropertyTarget};

/// Methods a host-evaluated graph solver must expose.
pub const GRAPH_SOLVER_CHECKLIST: &[MethodSpec] = &[MethodSpec::new("constructor", 1), MethodSpec::new("solve", 2)];

/// One recorded solving step.
pub struct SearchStep {
    /// Free-form value shown to the user for this step.
    pub debug_value: Value,
    /// Edit replayed for this step, if any.
    pub command: Option<Command<GraphContext>>,
    /// The step ends the solve.
    pub is_terminal: bool,
}

impl fmt::Debug for SearchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchStep")
            .field("debug_value", &self.debug_value)
            .field("command", &self.command.as_ref().map(Command::name))
            .field("is_terminal", &self.is_terminal)
            .finish()
    }
}

/// Collects the steps of one solve.
pub struct StepRecorder<'g> {
    base: &'g Graph,
    created: Vec<Graph>,
    steps: Vec<SearchStep>,
    pending: HashMap<(PropertyTarget, String), Value>,
}

impl<'g> StepRecorder<'g> {
    /// Start recording against `graph`.
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            base: graph,
            created: Vec::new(),
            steps: Vec::new(),
            pending: HashMap::new(),
        }
    }

    /// Graph the recorded commands will run against.
    pub fn graph(&self) -> &Graph {
        self.created.last().unwrap_or(self.base)
    }

    /// Steps recorded so far.
    pub fn steps(&self) -> &[SearchStep] {
        &self.steps
    }

    /// Take the recorded steps.
    pub fn into_steps(self) -> Vec<SearchStep> {
        self.steps
    }

    fn push(&mut self, debug_value: Value, command: Option<Command<GraphContext>>, is_terminal: bool) {
        self.steps.push(SearchStep {
            debug_value,
            command,
            is_terminal,
        });
    }

    /// Record a terminal failure. Returns `false` for convenience.
    pub fn failure(&mut self, debug_value: Value) -> bool {
        self.push(debug_value, Some(GraphOutcomeCommand::failure()), true);
        false
    }

    /// Record a terminal success. Returns `true` for convenience.
    pub fn success(&mut self, debug_value: Value) -> bool {
        self.push(debug_value, Some(GraphOutcomeCommand::success()), true);
        true
    }

    fn node_target(&self, ix: NodeIx) -> PlyResult<PropertyTarget> {
        self.graph()
            .node(ix)
            .map(|n| PropertyTarget::Node(n.id().to_string()))
            .ok_or_else(|| PlyError::runtime(format!("Node slot {} is empty.", ix)))
    }

    /// Mark a node visited.
    pub fn visit(&mut self, ix: NodeIx, debug_value: Value) -> PlyResult<()> {
        let target = self.node_target(ix)?;
        self.alter(vec![(target, "state".into(), Value::from("visited"))], debug_value)
    }

    /// Mark a node expanded.
    pub fn expand(&mut self, ix: NodeIx, debug_value: Value) -> PlyResult<()> {
        let target = self.node_target(ix)?;
        self.alter(vec![(target, "state".into(), Value::from("expanded"))], debug_value)
    }

    /// Highlight nodes or edges.
    pub fn highlight(&mut self, targets: Vec<PropertyTarget>, debug_value: Value) -> PlyResult<()> {
        let changes = targets
            .into_iter()
            .map(|t| (t, "highlighted".to_string(), Value::from(true)))
            .collect();
        self.alter(changes, debug_value)
    }

    /// Remove highlights.
    pub fn unhighlight(&mut self, targets: Vec<PropertyTarget>, debug_value: Value) -> PlyResult<()> {
        let changes = targets
            .into_iter()
            .map(|t| (t, "highlighted".to_string(), Value::from(false)))
            .collect();
        self.alter(changes, debug_value)
    }

    /// Record a batch of property updates.
    ///
    /// Nothing runs while recording, so the old value of a property that an
    /// earlier step already queued is that queued value rather than the
    /// graph's current one.
    pub fn alter(&mut self, changes: Vec<(PropertyTarget, String, Value)>, debug_value: Value) -> PlyResult<()> {
        let mut recorded = Vec::with_capacity(changes.len());
        for (target, property, new_value) in changes {
            let key = (target.clone(), property.clone());
            let old_value = match self.pending.get(&key) {
                Some(queued) => queued.clone(),
                None => self.graph().get_target_prop(&target, &property)?,
            };
            recorded.push(PropertyChange {
                target,
                property,
                old_value,
                new_value,
            });
        }
        for change in &recorded {
            self.pending.insert(
                (change.target.clone(), change.property.clone()),
                change.new_value.clone(),
            );
        }
        self.push(debug_value, Some(PropertyChangeCommand::new(recorded).into_command()), false);
        Ok(())
    }

    /// Record a step that only carries a debug value.
    pub fn log(&mut self, debug_value: Value) {
        self.push(debug_value, None, false);
    }

    /// Switch the replay to a derived graph.
    ///
    /// Later alterations read their old values from this graph. A copy is
    /// returned for the solver to work with.
    pub fn create(&mut self, graph: Graph, debug_value: Value) -> Graph {
        let copy = graph.clone();
        self.created.push(graph.clone());
        self.pending.clear();
        self.push(debug_value, Some(LayerGraphCommand::new(graph).into_command()), false);
        copy
    }
}

/// A graph search algorithm that narrates itself through a recorder.
pub trait GraphSearchSolver {
    /// Search from `start` to `goal`, returning whether the goal was reached.
    fn solve(&mut self, graph: &Graph, recorder: &mut StepRecorder<'_>, start: NodeIx, goal: NodeIx) -> PlyResult<bool>;
}

/// Run `solver` on `graph` between its start and goal and return the steps.
///
/// Fails when the graph lacks a start or goal, when nothing was recorded, and
/// when the last step is not terminal.
pub fn solution_steps(solver: &mut dyn GraphSearchSolver, graph: &Graph) -> PlyResult<Vec<SearchStep>> {
    let start = graph
        .start_ix()
        .ok_or_else(|| PlyError::runtime("The graph has no start node."))?;
    let goal = graph
        .end_ix()
        .ok_or_else(|| PlyError::runtime("The graph has no goal node."))?;
    let mut recorder = StepRecorder::new(graph);
    solver.solve(graph, &mut recorder, start, goal)?;
    let steps = recorder.into_steps();
    match steps.last() {
        None => Err(PlyError::script(
            "No steps were recorded. Did you invoke failure or success?",
        )),
        Some(last) if !last.is_terminal => Err(PlyError::script(
            "Last step is not a terminal step. Ensure you finish solving by returning a success or failure.",
        )),
        Some(_) => Ok(steps),
    }
}

/// Check a host-evaluated solver against [`GRAPH_SOLVER_CHECKLIST`].
pub fn build_graph_search_solver<S>(candidate: S) -> PlyResult<Box<dyn GraphSearchSolver>>
where
    S: GraphSearchSolver + Capabilities + 'static,
{
    validate(GRAPH_SOLVER_CHECKLIST, &candidate, "the Solver class")
        .map_err(|message| BuildError::new(Fault::Solver, message))?;
    Ok(Box::new(candidate))
}

/// Breadth-first search narrating visits and expansions.
#[derive(Debug, Default)]
pub struct BreadthFirstSolver {
    visited: Vec<NodeIx>,
}

impl BreadthFirstSolver {
    /// Create a solver.
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(graph: &Graph, slots: impl IntoIterator<Item = NodeIx>) -> String {
        slots
            .into_iter()
            .filter_map(|ix| graph.node(ix).map(|n| n.id().to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl GraphSearchSolver for BreadthFirstSolver {
    fn solve(&mut self, graph: &Graph, recorder: &mut StepRecorder<'_>, start: NodeIx, goal: NodeIx) -> PlyResult<bool> {
        self.visited = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let neighbours: Vec<NodeIx> = graph.get_adjacent_nodes(current).map(|n| n.ix()).collect();
            let message = format!(
                "Expanding node {} with neighbors {}",
                Self::ids(graph, [current]),
                Self::ids(graph, neighbours.iter().copied())
            );
            recorder.expand(current, Value::from(message))?;
            if current == goal {
                return Ok(recorder.success(Value::Null));
            }
            for adj in neighbours {
                if self.visited.contains(&adj) {
                    continue;
                }
                let message = format!(
                    "Visiting node {}, list of nodes to visit: [{}]",
                    Self::ids(graph, [adj]),
                    Self::ids(graph, queue.iter().copied())
                );
                recorder.visit(adj, Value::from(message))?;
                self.visited.push(adj);
                queue.push_back(adj);
            }
        }
        Ok(recorder.failure(Value::Null))
    }
}

impl Capabilities for BreadthFirstSolver {
    fn arity(&self, method: &str) -> Option<usize> {
        arity_in(GRAPH_SOLVER_CHECKLIST, method)
    }
}
