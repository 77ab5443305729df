//! Property Protocol: the reflection surface used by generic inspectors.
//!
//! Every inspectable entity exposes an id, a list of [`ItemProperty`]
//! descriptors, and `get_prop` / `set_prop`. Updates go through
//! [`check_property_update`] before anything is applied.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlyError, PlyResult};
use crate::value::{is_truthy, Value};

/// Type tag of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// Anything, including objects and null.
    Any,
}

impl PropertyType {
    /// Whether `value` carries this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PropertyType::String => value.is_string(),
            PropertyType::Number => value.is_number(),
            PropertyType::Boolean => value.is_boolean(),
            PropertyType::Any => true,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::String => "string",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Any => "any",
        };
        write!(f, "{}", name)
    }
}

/// Custom value predicate.
pub type ValueCheck = fn(&Value) -> bool;

/// Descriptor of a single property.
#[derive(Debug, Clone)]
pub struct ItemProperty {
    /// Property name.
    pub name: String,
    /// Type tag.
    pub kind: PropertyType,
    /// Current value.
    pub value: Value,
    /// Read-only.
    pub fixed: bool,
    /// One-way boolean action; can only be set to true.
    pub trigger: bool,
    /// Closed set of accepted values.
    pub options: Option<Vec<Value>>,
    /// Not shown by inspectors.
    pub hidden: bool,
    /// Applied as soon as it is edited rather than on an explicit apply.
    pub dynamic: bool,
    /// Presentation name.
    pub display: Option<String>,
    /// Presentation help text.
    pub description: Option<String>,
    /// Extra validation.
    pub check: Option<ValueCheck>,
}

impl ItemProperty {
    /// Create a plain, mutable property.
    pub fn new(name: impl Into<String>, kind: PropertyType, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            value: value.into(),
            fixed: false,
            trigger: false,
            options: None,
            hidden: false,
            dynamic: false,
            display: None,
            description: None,
            check: None,
        }
    }

    /// Mark read-only.
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Mark as a one-way trigger.
    pub fn trigger(mut self) -> Self {
        self.trigger = true;
        self
    }

    /// Restrict to a closed set of values.
    pub fn options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Hide from inspectors.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Apply on edit.
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    /// Set the presentation name.
    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Set the help text.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a custom predicate.
    pub fn check(mut self, check: ValueCheck) -> Self {
        self.check = Some(check);
        self
    }

    /// A trigger that has already fired can no longer be used.
    pub fn is_disabled(&self) -> bool {
        self.fixed || (self.trigger && is_truthy(&self.value))
    }
}

/// Run the shared validation for a single update.
///
/// Returns `Ok(None)` when no property named `name` exists, so the caller can
/// report "not handled"; returns the matching descriptor when the update is
/// acceptable; fails with [`PlyError::Property`] otherwise.
pub fn check_property_update<'p>(
    properties: &'p [ItemProperty],
    name: &str,
    value: &Value,
) -> PlyResult<Option<&'p ItemProperty>> {
    let Some(prop) = properties.iter().find(|p| p.name == name) else {
        return Ok(None);
    };
    if prop.fixed {
        return Err(PlyError::property(format!(
            "Property {} is fixed and cannot be changed.",
            name
        )));
    }
    if let Some(options) = &prop.options {
        if !options.iter().any(|o| o == value) {
            let listed: Vec<String> = options.iter().map(|o| o.to_string()).collect();
            return Err(PlyError::property(format!(
                "Property {} must be one of {}",
                name,
                listed.join(", ")
            )));
        }
    }
    if prop.trigger && !is_truthy(value) {
        return Err(PlyError::property(format!(
            "Property {} must be set to true to trigger an action.",
            name
        )));
    }
    if !prop.kind.accepts(value) {
        return Err(PlyError::property(format!(
            "Property {} must be of type {}",
            name, prop.kind
        )));
    }
    if let Some(check) = prop.check {
        if !check(value) {
            return Err(PlyError::property(format!(
                "Property {} failed a custom check.",
                name
            )));
        }
    }
    Ok(Some(prop))
}

/// Validate a batch of updates, collecting every rejection.
pub fn can_set_props(properties: &[ItemProperty], values: &[(&str, Value)]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    for (name, value) in values {
        match check_property_update(properties, name, value) {
            Ok(Some(_)) => {}
            Ok(None) => errors.push(format!(
                "Property {} is not a valid property for this component.",
                name
            )),
            Err(e) => errors.push(e.to_string()),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The Property Protocol.
pub trait Inspectable {
    /// Identity shown by inspectors.
    fn id(&self) -> Value;

    /// Current property descriptors.
    fn properties(&self) -> Vec<ItemProperty>;

    /// Read a property by name.
    fn get_prop(&self, name: &str) -> PlyResult<Value> {
        self.properties()
            .into_iter()
            .find(|p| p.name == name)
            .map(|p| p.value)
            .ok_or_else(|| PlyError::property(format!("Property not found: {}", name)))
    }

    /// Validate then apply an update.
    ///
    /// `Ok(false)` means the name is not handled by this entity; a recognised
    /// but rejected update is an error.
    fn set_prop(&mut self, name: &str, value: Value) -> PlyResult<bool>;
}
