//! Property Protocol view of one game-tree position.

use plyboard_core::{check_property_update, Inspectable, ItemProperty, PlyError, PlyResult, PropertyType, Value};
use plyboard_graph::NodeIx;

use crate::case::{Case, Position};
use crate::engine::ExpansionEngine;

/// Trigger property that expands the inspected position.
pub const EXPAND_PROPERTY: &str = "__expand";

/// Inspector handle for the position at one tree node.
pub struct PositionEntity<'e, C: Case> {
    engine: &'e mut ExpansionEngine<C>,
    node: NodeIx,
}

impl<C: Case> ExpansionEngine<C> {
    /// Inspect the position at `node`.
    pub fn position_entity(&mut self, node: NodeIx) -> PlyResult<PositionEntity<'_, C>> {
        if self.tree().entry(node).is_none() {
            return Err(PlyError::runtime(format!("Game tree has no node {}.", node)));
        }
        Ok(PositionEntity { engine: self, node })
    }
}

impl<C: Case> PositionEntity<'_, C> {
    /// Inspected node.
    pub fn node(&self) -> NodeIx {
        self.node
    }
}

impl<C: Case> Inspectable for PositionEntity<'_, C> {
    fn id(&self) -> Value {
        let tree = self.engine.tree();
        tree.position(self.node)
            .map_or(Value::Null, |p| Value::from(p.id()))
    }

    fn properties(&self) -> Vec<ItemProperty> {
        let tree = self.engine.tree();
        let Some(entry) = tree.entry(self.node) else {
            return Vec::new();
        };
        let position = &entry.position;
        let player = position
            .player()
            .map_or(Value::Null, |p| Value::from(p.to_string()));
        let mut props = vec![
            ItemProperty::new("id", PropertyType::String, position.id()).fixed(),
            ItemProperty::new("player", PropertyType::Any, player).fixed(),
            ItemProperty::new("isTerminal", PropertyType::Boolean, position.is_terminal())
                .fixed()
                .display("Terminal?"),
        ];
        if position.is_terminal() {
            props.push(ItemProperty::new("score", PropertyType::Number, position.score()).fixed());
        }
        props.push(
            ItemProperty::new("utility", PropertyType::Any, entry.utility.map_or(Value::Null, Value::from)).fixed(),
        );
        props.push(ItemProperty::new("pathCount", PropertyType::Number, tree.path_count(self.node)).fixed());
        props.push(
            ItemProperty::new(EXPAND_PROPERTY, PropertyType::Boolean, tree.is_expanded(self.node))
                .trigger()
                .display("Expand"),
        );
        props
    }

    fn set_prop(&mut self, name: &str, value: Value) -> PlyResult<bool> {
        let props = self.properties();
        if check_property_update(&props, name, &value)?.is_none() {
            return Ok(false);
        }
        match name {
            EXPAND_PROPERTY => {
                self.engine.expand_node(self.node)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
