//! Data bags attached to nodes, edges, actions and positions.
//!
//! This module defines:
//! - [`Value`]: the JSON-like tagged union (re-export of `serde_json::Value`)
//! - [`DataBag`]: an ordered string-keyed map of values with typed accessors
//! - [`merge_in_place`] / [`merge`]: deep merge used by repeated NODE commands

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use crate::error::{PlyError, PlyResult};

pub use serde_json::Value;

/// Ordered map backing a [`DataBag`].
pub type Map = serde_json::Map<String, Value>;

/// Maximum object nesting a merge will descend into.
pub const MAX_MERGE_DEPTH: usize = 128;

/// String-keyed bag of JSON-like values.
///
/// Newtype around an insertion-ordered `serde_json::Map` providing:
/// - direct map access via Deref/DerefMut
/// - typed accessors that treat a missing or mistyped key as absent
/// - deep merge
///
/// # Examples
///
/// ```
/// use plyboard_core::DataBag;
///
/// let mut bag: DataBag = r#"{"w": 3, "label": "a"}"#.parse().unwrap();
/// assert_eq!(bag.get_f64("w"), Some(3.0));
/// assert_eq!(bag.get_str("label"), Some("a"));
/// bag.set("forbidden", true);
/// assert_eq!(bag.get_bool("forbidden"), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataBag(Map);

impl DataBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        DataBag(Map::new())
    }

    /// Create from a map.
    pub fn from_map(map: Map) -> Self {
        DataBag(map)
    }

    /// Create from a value, which must be an object.
    pub fn from_value(value: Value) -> PlyResult<Self> {
        match value {
            Value::Object(map) => Ok(DataBag(map)),
            other => Err(PlyError::runtime(format!(
                "expected a data object, found {}",
                other
            ))),
        }
    }

    /// Get the underlying map.
    pub fn into_inner(self) -> Map {
        self.0
    }

    /// Convert into an object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Insert a value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Boolean stored under `key`, if it is a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Number stored under `key`, if it is a number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// String stored under `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// True when `key` holds a JSON-truthy value.
    pub fn is_truthy(&self, key: &str) -> bool {
        self.0.get(key).map_or(false, is_truthy)
    }

    /// Split the `style` sub-object out of this bag.
    ///
    /// Returns the remaining data and the style. A non-object `style` value
    /// is left in the data.
    pub fn split_style(self) -> (DataBag, DataBag) {
        if !matches!(self.0.get("style"), Some(Value::Object(_))) {
            return (self, DataBag::new());
        }
        let mut data = Map::new();
        let mut style = Map::new();
        for (key, value) in self.0 {
            match value {
                Value::Object(inner) if key == "style" => style = inner,
                other => {
                    data.insert(key, other);
                }
            }
        }
        (DataBag(data), DataBag(style))
    }

    /// Deep-merge `other` into this bag.
    pub fn merge_in_place(&mut self, other: &DataBag) -> PlyResult<()> {
        merge_in_place(&mut self.0, &other.0)
    }

    /// Serialize to compact JSON.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl FromStr for DataBag {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str::<Map>(s).map(DataBag)
    }
}

impl Deref for DataBag {
    type Target = Map;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DataBag {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for DataBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

impl From<Map> for DataBag {
    fn from(map: Map) -> Self {
        DataBag(map)
    }
}

impl From<DataBag> for Value {
    fn from(bag: DataBag) -> Self {
        bag.into_value()
    }
}

/// JavaScript-style truthiness, used where notation payloads are loosely typed.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deep-merge `source` into `target`.
///
/// For every key of `source`: when both sides hold objects the merge recurses,
/// otherwise the source value overwrites the target value. Owned values cannot
/// form cycles; structures nested deeper than [`MAX_MERGE_DEPTH`] are refused
/// and leave `target` partially merged.
pub fn merge_in_place(target: &mut Map, source: &Map) -> PlyResult<()> {
    merge_at_depth(target, source, 0)
}

fn merge_at_depth(target: &mut Map, source: &Map, depth: usize) -> PlyResult<()> {
    if depth >= MAX_MERGE_DEPTH {
        return Err(PlyError::merge(
            "Found recursive structure while executing merge.",
        ));
    }
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge_at_depth(existing, nested, depth + 1)?;
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
    Ok(())
}

/// Merge two maps into a fresh one; `b` wins on conflicts.
pub fn merge(a: &Map, b: &Map) -> PlyResult<Map> {
    let mut result = Map::new();
    merge_in_place(&mut result, a)?;
    merge_in_place(&mut result, b)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    // =========================================================================
    // Merge
    // =========================================================================

    #[test]
    fn merge_overwrites_scalars() {
        let merged = merge(&map(json!({"a": 1})), &map(json!({"a": 2}))).unwrap();
        assert_eq!(Value::Object(merged), json!({"a": 2}));
    }

    #[test]
    fn merge_unions_keys() {
        let merged = merge(&map(json!({"a": 1})), &map(json!({"b": 2}))).unwrap();
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn merge_recurses_into_objects() {
        let merged = merge(
            &map(json!({"a": {"a": 1, "b": 2}})),
            &map(json!({"a": {"a": 3}})),
        )
        .unwrap();
        assert_eq!(Value::Object(merged), json!({"a": {"a": 3, "b": 2}}));
    }

    #[test]
    fn merge_object_over_scalar_replaces() {
        let merged = merge(&map(json!({"a": 1})), &map(json!({"a": {"x": 1}}))).unwrap();
        assert_eq!(Value::Object(merged), json!({"a": {"x": 1}}));
    }

    #[test]
    fn merge_refuses_runaway_nesting() {
        let mut deep = json!(1);
        for _ in 0..(MAX_MERGE_DEPTH + 2) {
            deep = json!({ "a": deep });
        }
        let mut target = map(deep.clone());
        let result = merge_in_place(&mut target, &map(deep));
        assert!(matches!(result, Err(PlyError::Merge(_))));
    }

    // =========================================================================
    // DataBag
    // =========================================================================

    #[test]
    fn split_style_extracts_object() {
        let bag: DataBag = r#"{"w": 2, "style": {"color": "red"}}"#.parse().unwrap();
        let (data, style) = bag.split_style();
        assert_eq!(data.get_f64("w"), Some(2.0));
        assert!(data.get("style").is_none());
        assert_eq!(style.get_str("color"), Some("red"));
    }

    #[test]
    fn split_style_without_style_is_empty() {
        let bag: DataBag = r#"{"label": "x"}"#.parse().unwrap();
        let (data, style) = bag.split_style();
        assert_eq!(data.len(), 1);
        assert!(style.is_empty());
    }

    #[test]
    fn typed_accessors_ignore_wrong_types() {
        let bag: DataBag = r#"{"w": "heavy", "traversable": 0}"#.parse().unwrap();
        assert_eq!(bag.get_f64("w"), None);
        assert_eq!(bag.get_bool("traversable"), None);
        assert!(!bag.is_truthy("traversable"));
    }

    #[test]
    fn keys_keep_insertion_order() {
        let bag: DataBag = r#"{"z": 1, "a": 2, "m": 3}"#.parse().unwrap();
        let keys: Vec<&String> = bag.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(bag.to_json_string(), r#"{"z":1,"a":2,"m":3}"#);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(DataBag::from_value(json!([1, 2])).is_err());
        assert!(DataBag::from_value(json!({"a": 1})).is_ok());
    }

    #[test]
    fn truthiness_matches_loose_semantics() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!({})));
    }

    // =========================================================================
    // Merge properties
    // =========================================================================

    use proptest::prelude::*;

    fn flat_map() -> impl Strategy<Value = Map> {
        prop::collection::btree_map("[a-d]", any::<i32>(), 0..5)
            .prop_map(|m| m.into_iter().map(|(k, v)| (k, Value::from(v))).collect::<Map>())
    }

    proptest! {
        #[test]
        fn merge_keeps_every_key_and_right_wins(a in flat_map(), b in flat_map()) {
            let merged = merge(&a, &b).unwrap();
            for (key, value) in &b {
                prop_assert_eq!(merged.get(key), Some(value));
            }
            for (key, value) in &a {
                if !b.contains_key(key) {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
            prop_assert!(merged.keys().all(|k| a.contains_key(k) || b.contains_key(k)));
        }

        #[test]
        fn merging_twice_changes_nothing(a in flat_map(), b in flat_map()) {
            let once = merge(&a, &b).unwrap();
            let twice = merge(&once, &b).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
