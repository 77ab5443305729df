//! Inline data objects written after a command.

use plyboard_core::{DataBag, Map, Value};
use plyboard_graph::TRANSIENT_KEYS;

/// Copy of `data` without replay state and without `skip`.
pub(crate) fn serializable_data(data: &DataBag, skip: &[&str]) -> DataBag {
    data.iter()
        .filter(|(key, _)| !TRANSIENT_KEYS.contains(&key.as_str()) && !skip.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<Map>()
        .into()
}

/// Compact JSON with `style` folded back in, `None` when there is nothing to write.
pub(crate) fn format_payload(mut data: DataBag, style: &DataBag) -> Option<String> {
    if !style.is_empty() {
        data.set("style", Value::Object(style.clone().into_inner()));
    }
    if data.is_empty() {
        None
    } else {
        Some(data.to_json_string())
    }
}
