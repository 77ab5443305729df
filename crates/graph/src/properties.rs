//! Property Protocol bindings for graphs, nodes and edges.
//!
//! Nodes and edges need their owning graph to answer questions such as
//! "is this the start node", so they are inspected through [`Entity`], a
//! handle pairing a graph with a [`PropertyTarget`].

use plyboard_core::{check_property_update, Inspectable, ItemProperty, PlyError, PlyResult, PropertyType, Value};

use crate::graph::Graph;
use crate::types::{DiagonalWeight, EdgeId, NodeIx, PropertyTarget};

fn positive_integer(value: &Value) -> bool {
    value.as_f64().map_or(false, |v| v > 0.0 && v.fract() == 0.0)
}

fn as_str(value: &Value) -> PlyResult<&str> {
    value
        .as_str()
        .ok_or_else(|| PlyError::property(format!("Expected a string, got {}", value)))
}

fn as_bool(value: &Value) -> PlyResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| PlyError::property(format!("Expected a boolean, got {}", value)))
}

fn as_f64(value: &Value) -> PlyResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| PlyError::property(format!("Expected a number, got {}", value)))
}

impl Graph {
    fn node_id_value(&self, ix: Option<NodeIx>) -> Value {
        ix.and_then(|ix| self.node(ix))
            .map_or(Value::Null, |n| Value::from(n.id()))
    }

    /// Graph-level property descriptors.
    pub fn graph_properties(&self) -> Vec<ItemProperty> {
        let mut props = vec![
            ItemProperty::new("start", PropertyType::String, self.node_id_value(self.start_ix())),
            ItemProperty::new("end", PropertyType::String, self.node_id_value(self.end_ix())),
            ItemProperty::new("physics_enabled", PropertyType::Boolean, self.physics_enabled),
            ItemProperty::new("default_bidirectional", PropertyType::Boolean, self.default_bidirectional)
                .description("Whether to make newly created edges bidirectional by default"),
        ];
        if let Some(spec) = self.grid_spec() {
            props.push(ItemProperty::new("width", PropertyType::Number, spec.width).check(positive_integer));
            props.push(ItemProperty::new("height", PropertyType::Number, spec.height).check(positive_integer));
            props.push(ItemProperty::new(
                "diagonal_weights",
                PropertyType::Number,
                spec.diagonal.value(),
            ));
        }
        props
    }

    fn node_properties(&self, ix: NodeIx) -> PlyResult<Vec<ItemProperty>> {
        let node = self.node(ix).ok_or_else(|| PlyError::runtime(format!("Node slot {} is empty.", ix)))?;
        let mut props = vec![
            ItemProperty::new("id", PropertyType::String, node.id()).fixed(),
            ItemProperty::new("label", PropertyType::String, node.label()),
            ItemProperty::new("is_start", PropertyType::Boolean, self.start_ix() == Some(ix)).trigger(),
            ItemProperty::new("is_goal", PropertyType::Boolean, self.end_ix() == Some(ix)).trigger(),
            ItemProperty::new("h", PropertyType::Number, self.heuristic(ix)),
            ItemProperty::new("traversable", PropertyType::Boolean, node.traversable()),
            ItemProperty::new("highlighted", PropertyType::Boolean, node.highlighted()),
            ItemProperty::new("state", PropertyType::String, node.state())
                .options(["", "visited", "expanded"])
                .hidden(),
        ];
        if self.is_grid() {
            props.push(ItemProperty::new("x", PropertyType::Number, node.x()).fixed());
            props.push(ItemProperty::new("y", PropertyType::Number, node.y()).fixed());
        }
        Ok(props)
    }

    fn edge_properties(&self, id: EdgeId) -> PlyResult<Vec<ItemProperty>> {
        let view = self
            .get_edge_by_id(id)
            .ok_or_else(|| PlyError::runtime(format!("Edge {} does not exist in the graph.", id)))?;
        let endpoint = |n: Option<&crate::node::Node>| n.map_or(Value::Null, |n| Value::from(n.id()));
        Ok(vec![
            ItemProperty::new("id", PropertyType::Number, view.id().get()).fixed(),
            ItemProperty::new("source", PropertyType::String, endpoint(view.source())).fixed(),
            ItemProperty::new("target", PropertyType::String, endpoint(view.target())).fixed(),
            ItemProperty::new("weight", PropertyType::Number, view.weight()),
            ItemProperty::new("bidirectional", PropertyType::Boolean, view.bidirectional()),
            ItemProperty::new("flipped", PropertyType::Boolean, view.stored().flipped()),
            ItemProperty::new("highlighted", PropertyType::Boolean, view.data().is_truthy("highlighted")),
            ItemProperty::new("forbidden", PropertyType::Boolean, view.stored().forbidden()),
        ])
    }

    /// Property descriptors of any entity in this graph.
    pub fn properties_of(&self, target: &PropertyTarget) -> PlyResult<Vec<ItemProperty>> {
        match target {
            PropertyTarget::Graph => Ok(self.graph_properties()),
            PropertyTarget::Node(id) => self.node_properties(self.ensure_node_ix(id)?),
            PropertyTarget::Edge(id) => self.edge_properties(*id),
        }
    }

    /// Read a property of any entity in this graph.
    pub fn get_target_prop(&self, target: &PropertyTarget, name: &str) -> PlyResult<Value> {
        let found = self
            .properties_of(target)?
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.value);
        found.ok_or_else(|| match target {
            PropertyTarget::Node(_) => {
                PlyError::not_implemented(format!("Property {} for GraphNode", name))
            }
            PropertyTarget::Edge(_) => {
                PlyError::not_implemented(format!("Property {} for GraphEdge", name))
            }
            PropertyTarget::Graph => {
                PlyError::not_implemented(format!("Property {} for Graph", name))
            }
        })
    }

    /// Validate then apply a property update on any entity in this graph.
    ///
    /// Returns `Ok(false)` when the entity has no property called `name`.
    pub fn set_target_prop(&mut self, target: &PropertyTarget, name: &str, value: Value) -> PlyResult<bool> {
        let props = self.properties_of(target)?;
        if check_property_update(&props, name, &value)?.is_none() {
            return Ok(false);
        }
        let applied = match target {
            PropertyTarget::Graph => self.apply_graph_prop(name, &value)?,
            PropertyTarget::Node(id) => {
                let ix = self.ensure_node_ix(id)?;
                self.apply_node_prop(ix, name, value)?
            }
            PropertyTarget::Edge(id) => self.apply_edge_prop(*id, name, &value)?,
        };
        if applied {
            self.mark_dirty_render();
        }
        Ok(applied)
    }

    fn apply_graph_prop(&mut self, name: &str, value: &Value) -> PlyResult<bool> {
        match name {
            "start" => {
                let ix = self.ensure_node_ix(as_str(value)?)?;
                self.set_start(Some(ix))?;
            }
            "end" => {
                let ix = self.ensure_node_ix(as_str(value)?)?;
                self.set_end(Some(ix))?;
            }
            "physics_enabled" => self.physics_enabled = as_bool(value)?,
            "default_bidirectional" => self.default_bidirectional = as_bool(value)?,
            "width" | "height" => {
                let spec = self
                    .grid_spec()
                    .ok_or_else(|| PlyError::runtime("Operation requires a grid graph."))?;
                let n = as_f64(value)? as usize;
                if name == "width" {
                    self.set_dimensions(n, spec.height)?;
                } else {
                    self.set_dimensions(spec.width, n)?;
                }
            }
            "diagonal_weights" => self.set_diagonal(DiagonalWeight::from_value(as_f64(value)?))?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn apply_node_prop(&mut self, ix: NodeIx, name: &str, value: Value) -> PlyResult<bool> {
        match name {
            "is_start" => self.set_start(Some(ix))?,
            "is_goal" => self.set_end(Some(ix))?,
            "label" | "h" | "traversable" | "highlighted" | "state" => {
                let node = self
                    .node_mut(ix)
                    .ok_or_else(|| PlyError::runtime(format!("Node slot {} is empty.", ix)))?;
                node.data.set(name, value);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn apply_edge_prop(&mut self, id: EdgeId, name: &str, value: &Value) -> PlyResult<bool> {
        let edge = self
            .edge_mut(id)
            .ok_or_else(|| PlyError::runtime(format!("Edge {} does not exist in the graph.", id)))?;
        match name {
            "weight" => edge.set_weight(as_f64(value)?),
            "bidirectional" => edge.bidirectional = as_bool(value)?,
            "flipped" | "highlighted" | "forbidden" => {
                edge.data.set(name, value.clone());
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Inspector handle for an entity of this graph.
    pub fn entity(&mut self, target: PropertyTarget) -> Entity<'_> {
        Entity { graph: self, target }
    }
}

impl Inspectable for Graph {
    fn id(&self) -> Value {
        Value::from(0)
    }

    fn properties(&self) -> Vec<ItemProperty> {
        self.graph_properties()
    }

    fn get_prop(&self, name: &str) -> PlyResult<Value> {
        self.get_target_prop(&PropertyTarget::Graph, name)
    }

    fn set_prop(&mut self, name: &str, value: Value) -> PlyResult<bool> {
        self.set_target_prop(&PropertyTarget::Graph, name, value)
    }
}

/// A node or edge (or the graph) seen through the Property Protocol.
pub struct Entity<'g> {
    graph: &'g mut Graph,
    target: PropertyTarget,
}

impl Entity<'_> {
    /// Address of the entity.
    pub fn target(&self) -> &PropertyTarget {
        &self.target
    }
}

impl Inspectable for Entity<'_> {
    fn id(&self) -> Value {
        match &self.target {
            PropertyTarget::Graph => Value::from(0),
            PropertyTarget::Node(id) => Value::from(id.as_str()),
            PropertyTarget::Edge(id) => Value::from(id.get()),
        }
    }

    fn properties(&self) -> Vec<ItemProperty> {
        self.graph.properties_of(&self.target).unwrap_or_default()
    }

    fn get_prop(&self, name: &str) -> PlyResult<Value> {
        self.graph.get_target_prop(&self.target, name)
    }

    fn set_prop(&mut self, name: &str, value: Value) -> PlyResult<bool> {
        self.graph.set_target_prop(&self.target, name, value)
    }
}
