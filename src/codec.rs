//! Conversions between a nested payload tree and a flat, path-keyed mapping.

use crate::path::{join, set_value, Segment};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Walks `tree` depth-first and maps every path (relative to `prefix`) to
/// `resolve(node)`, skipping nodes where `resolve` yields `None`.
///
/// Mappings and sequences are always descended into, so a resolver such as
/// `|_| Some(true)` marks a container and every node below it. Absent nodes
/// (`null`) are skipped entirely.
pub fn flatten<T, F>(tree: &Value, prefix: &str, resolve: F) -> BTreeMap<String, T>
where
    F: Fn(&Value) -> Option<T>,
{
    let mut result = BTreeMap::new();
    collect(tree, prefix.to_string(), &resolve, &mut result);
    result
}

fn collect<T, F>(node: &Value, path: String, resolve: &F, result: &mut BTreeMap<String, T>)
where
    F: Fn(&Value) -> Option<T>,
{
    if node.is_null() {
        return;
    }
    if let Some(resolved) = resolve(node) {
        result.insert(path.clone(), resolved);
    }
    match node {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect(item, join(path.clone(), &Segment::Index(index)), resolve, result);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                collect(item, join(path.clone(), &Segment::Key(key.clone())), resolve, result);
            }
        }
        _ => {}
    }
}

/// Rebuilds a tree from a path-keyed mapping.
///
/// Entries are written in iteration order, so with a sorted mapping a
/// container is written before the paths inside it.
pub fn unflatten<I, K>(entries: I) -> Value
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    let mut tree = Value::Object(Map::new());
    for (path, value) in entries {
        set_value(&mut tree, path.as_ref(), |_| Some(value));
    }
    tree
}

/// Strips absent and empty structure from a tree.
///
/// `null`, empty strings, empty mappings and empty sequences are removed;
/// returns `None` when nothing is left. Sequence holes stay as `null` so the
/// remaining elements keep their indices.
pub fn simplify(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::Object(map) => {
            let simplified: Map<String, Value> = map
                .into_iter()
                .filter_map(|(key, item)| simplify(item).map(|item| (key, item)))
                .collect();
            (!simplified.is_empty()).then_some(Value::Object(simplified))
        }
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => Some(Value::Array(
            items
                .into_iter()
                .map(|item| simplify(item).unwrap_or(Value::Null))
                .collect(),
        )),
        other => Some(other),
    }
}

/// Drops `None` entries from an error map; `None` when nothing is left.
pub fn simplify_errors<E>(errors: BTreeMap<String, Option<E>>) -> Option<BTreeMap<String, E>> {
    let simplified: BTreeMap<String, E> = errors
        .into_iter()
        .filter_map(|(path, error)| error.map(|error| (path, error)))
        .collect();
    (!simplified.is_empty()).then_some(simplified)
}
