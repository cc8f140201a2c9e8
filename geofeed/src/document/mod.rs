//! Schema-less document traversal.
//!
//! Backend documents are arbitrary JSON trees, represented here as
//! [`serde_json::Value`]: null, scalars, ordered sequences and string-keyed
//! mappings. Field locations are dotted paths (`"properties.name"`) that are
//! split into segments and walked one mapping at a time.
//!
//! Lookups never fail: a path that runs into a missing key or into a value
//! that is not a mapping simply resolves to `None`.

use serde_json::{Map, Value};

/// Splits a dotted field path into its segments.
///
/// ```
/// use geofeed::document::split_path;
///
/// assert_eq!(split_path("geometry.location"), vec!["geometry", "location"]);
/// assert_eq!(split_path("name"), vec!["name"]);
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

/// Resolves a path of keys in a nested document.
///
/// An empty path resolves to `value` itself. Otherwise the first segment is
/// looked up in `value`, which must be a mapping, and the rest of the path is
/// resolved against the result.
///
/// ```
/// use geofeed::document::get_nested;
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": {"c": 5}}});
/// assert_eq!(get_nested(&doc, &["a", "b", "c"]), Some(&json!(5)));
/// assert_eq!(get_nested(&json!({"a": 1}), &["a", "b"]), None);
/// ```
pub fn get_nested<'a, S: AsRef<str>>(value: &'a Value, path: &[S]) -> Option<&'a Value> {
    match path.split_first() {
        None => Some(value),
        Some((key, rest)) => match value {
            Value::Object(map) => map
                .get(key.as_ref())
                .and_then(|child| get_nested(child, rest)),
            _ => None,
        },
    }
}

/// Mutable counterpart of [`get_nested`].
pub fn get_nested_mut<'a, S: AsRef<str>>(
    value: &'a mut Value,
    path: &[S],
) -> Option<&'a mut Value> {
    match path.split_first() {
        None => Some(value),
        Some((key, rest)) => match value {
            Value::Object(map) => map
                .get_mut(key.as_ref())
                .and_then(|child| get_nested_mut(child, rest)),
            _ => None,
        },
    }
}

/// Flattens a nested document into dotted keys.
///
/// Every scalar leaf is emitted under the path that leads to it; sequence
/// indices become path segments. Nulls are dropped.
///
/// This is an ingestion helper for backends whose documents arrive
/// pre-flattened; neither retrieval path uses it.
///
/// ```
/// use geofeed::document::flatten;
/// use serde_json::json;
///
/// let flat = flatten(&json!({"a": {"b": [1, {"c": "x"}]}}));
/// assert_eq!(flat["a.b.0"], json!(1));
/// assert_eq!(flat["a.b.1.c"], json!("x"));
/// ```
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut accum = Map::new();
    let mut prefix = Vec::new();
    flatten_into(value, &mut prefix, &mut accum);
    accum
}

fn flatten_into(value: &Value, prefix: &mut Vec<String>, accum: &mut Map<String, Value>) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                prefix.push(index.to_string());
                flatten_into(item, prefix, accum);
                prefix.pop();
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                prefix.push(key.clone());
                flatten_into(item, prefix, accum);
                prefix.pop();
            }
        }
        scalar => {
            accum.insert(prefix.join("."), scalar.clone());
        }
    }
}
