//! Ordered fallback lookups over upstream attribute maps.

use serde_json::{Map, Value};

/// QLD publishes `lottype`, NSW publishes `PURPOSE`.
pub const LOT_TYPE_KEYS: &[&str] = &["lottype", "PURPOSE"];

/// Placeholder used when none of the candidate keys carry a value
pub const NOT_AVAILABLE: &str = "n/a";

/// Return the first candidate key holding a present, non-null, non-empty value.
///
/// Numbers and booleans are not coerced; only string values count.
pub fn first_present<'a>(attributes: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| attributes.get(*key))
        .filter_map(Value::as_str)
        .find(|value| !value.is_empty())
}

pub fn lot_type_or_purpose(attributes: &Map<String, Value>) -> &str {
    first_present(attributes, LOT_TYPE_KEYS).unwrap_or(NOT_AVAILABLE)
}
