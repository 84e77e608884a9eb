//! Dotted/bracketed field paths and navigation over a payload tree.
//!
//! A path such as `a.b[0].c` is parsed into an ordered list of [`Segment`]s.
//! All tree navigation works on the segment form; the string form is only the
//! wire encoding used by form field names and validation-state keys.

use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Largest index a write may grow a sequence to. Writes past it (and past
/// the current length) address a mapping key instead.
pub const MAX_LIST_INDEX: usize = 10_000;

/// A single step into a payload tree.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Mapping key, written `.key` (or bare at the start of a path).
    Key(String),
    /// Sequence index, written `[n]`.
    Index(usize),
}

impl Segment {
    /// The key this segment addresses inside a mapping.
    pub fn to_key(&self) -> String {
        match self {
            Segment::Key(key) => key.clone(),
            Segment::Index(index) => index.to_string(),
        }
    }

    /// Returns the position this segment addresses inside a sequence, if any.
    ///
    /// Dotted numeric keys (`a.0`) address sequences too when one is already there.
    fn as_position(&self) -> Option<usize> {
        match self {
            Segment::Index(index) => Some(*index),
            Segment::Key(key) => parse_index(key),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(String::new(), self))
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_owned())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// A parsed field path. The empty path is the tree root.
///
/// ```
/// use submission_core::path::Path;
///
/// let path = Path::root().key("items").index(0).key("name");
/// assert_eq!(path.to_string(), "items[0].name");
/// assert_eq!("items[0].name".parse::<Path>().unwrap(), path);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn parse(name: &str) -> Self {
        Self(parse_path(name))
    }

    /// Append a key segment (builder style).
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Append an index segment (builder style).
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(&self.0))
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl From<Vec<Segment>> for Path {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

/// Checks if `s` is a canonical non-negative integer (no sign, no leading zero).
fn is_index(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}

/// Parses a canonical index that fits in a `usize`.
fn parse_index(s: &str) -> Option<usize> {
    if !is_index(s) {
        return None;
    }
    s.parse().ok()
}

/// Parses a field name into segments.
///
/// Parsing never fails: an unterminated bracket is kept as part of the key,
/// and empty brackets (`tags[]`) add no segment. A bracketed number too large
/// for a `usize` is kept as a key segment.
pub fn parse_path(name: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut key = String::new();
    let mut rest = name;

    while let Some(c) = rest.chars().next() {
        match c {
            '.' => {
                flush_key(&mut key, &mut segments);
                rest = &rest[1..];
            }
            '[' => match rest.find(']') {
                Some(end) => {
                    flush_key(&mut key, &mut segments);
                    let inner = &rest[1..end];
                    if let Some(index) = parse_index(inner) {
                        segments.push(Segment::Index(index));
                    } else if !inner.is_empty() {
                        segments.push(Segment::Key(inner.to_string()));
                    }
                    rest = &rest[end + 1..];
                }
                None => {
                    key.push_str(rest);
                    rest = "";
                }
            },
            _ => {
                key.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    flush_key(&mut key, &mut segments);
    segments
}

fn flush_key(key: &mut String, segments: &mut Vec<Segment>) {
    if !key.is_empty() {
        segments.push(Segment::Key(std::mem::take(key)));
    }
}

/// Appends one segment to a formatted path.
pub fn join(mut prefix: String, segment: &Segment) -> String {
    match segment {
        Segment::Index(index) => {
            prefix.push('[');
            prefix.push_str(&index.to_string());
            prefix.push(']');
        }
        Segment::Key(key) if key.contains(['.', '[']) && !key.contains(']') => {
            prefix.push('[');
            prefix.push_str(key);
            prefix.push(']');
        }
        Segment::Key(key) => {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(key);
        }
    }
    prefix
}

/// Formats segments back into a field name. The root formats as `""`.
pub fn format_path(segments: &[Segment]) -> String {
    segments.iter().fold(String::new(), join)
}

/// Returns true iff `name` is `prefix` followed by a navigation operator.
///
/// A path is never a prefix of itself.
pub fn is_prefix(prefix: &str, name: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
}

/// Like [`is_prefix`], except that every non-empty path descends from the root.
pub(crate) fn is_descendant(path: &str, name: &str) -> bool {
    if path.is_empty() {
        !name.is_empty()
    } else {
        is_prefix(path, name)
    }
}

fn child<'a>(node: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map.get(&segment.to_key()),
        Value::Array(items) => items.get(segment.as_position()?),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match node {
        Value::Object(map) => map.get_mut(&segment.to_key()),
        Value::Array(items) => items.get_mut(segment.as_position()?),
        _ => None,
    }
}

/// Returns the child slot for `segment`, turning `node` into a container and
/// growing sequences as needed.
///
/// Sequences never grow past [`MAX_LIST_INDEX`]; a larger index is written
/// as a mapping key.
fn child_entry<'a>(node: &'a mut Value, segment: &Segment) -> &'a mut Value {
    let position = match node {
        Value::Object(_) => None,
        Value::Array(items) => {
            let len = items.len();
            segment
                .as_position()
                .filter(|index| *index < len || *index <= MAX_LIST_INDEX)
        }
        _ => match segment {
            Segment::Index(index) => Some(*index).filter(|index| *index <= MAX_LIST_INDEX),
            Segment::Key(_) => None,
        },
    };
    match position {
        Some(_) if !node.is_array() => *node = Value::Array(Vec::new()),
        None if !node.is_object() => *node = Value::Object(Map::new()),
        _ => {}
    }
    match (node, position) {
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.to_key()).or_insert(Value::Null),
        (other, _) => other,
    }
}

/// Returns the subtree at `path`, or `None` when it is absent.
///
/// `null` is treated as absent: it is what remains in a sequence hole.
pub fn get_value<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    get_segments(tree, &parse_path(path))
}

pub(crate) fn get_segments<'a>(tree: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(tree, child)
        .filter(|value| !value.is_null())
}

fn lookup_mut<'a>(tree: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    segments.iter().try_fold(tree, child_mut)
}

/// Replaces the subtree at `path` with `updater(current)`.
///
/// Missing intermediate nodes are created: index segments create sequences,
/// key segments create mappings. When `updater` returns `None` the subtree is
/// deleted instead, and nothing is created for a path that did not exist.
pub fn set_value<F>(tree: &mut Value, path: &str, updater: F)
where
    F: FnOnce(Option<Value>) -> Option<Value>,
{
    let segments = parse_path(path);
    let current = lookup_mut(tree, &segments)
        .map(Value::take)
        .filter(|value| !value.is_null());

    match updater(current) {
        Some(value) => {
            let slot = segments.iter().fold(tree, child_entry);
            *slot = value;
        }
        None => {
            remove_segments(tree, &segments);
        }
    }
}

/// Deletes the subtree at `path` and returns it.
///
/// Sequence elements are left as holes so sibling indices keep their meaning.
pub fn remove_value(tree: &mut Value, path: &str) -> Option<Value> {
    remove_segments(tree, &parse_path(path))
}

fn remove_segments(tree: &mut Value, segments: &[Segment]) -> Option<Value> {
    let Some((last, parents)) = segments.split_last() else {
        return Some(tree.take()).filter(|value| !value.is_null());
    };
    let removed = match lookup_mut(tree, parents)? {
        Value::Object(map) => map.remove(&last.to_key()),
        Value::Array(items) => last
            .as_position()
            .and_then(|index| items.get_mut(index))
            .map(Value::take),
        _ => None,
    };
    removed.filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_mixed_path() {
        assert_eq!(
            parse_path("a.b[0].c"),
            vec![
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Index(0),
                Segment::Key("c".into()),
            ]
        );
    }

    #[test]
    fn test_parse_root_and_brackets() {
        assert!(parse_path("").is_empty());
        assert_eq!(parse_path("[2]"), vec![Segment::Index(2)]);
        assert_eq!(
            parse_path("a[key]"),
            vec![Segment::Key("a".into()), Segment::Key("key".into())]
        );
        assert_eq!(parse_path("tags[]"), vec![Segment::Key("tags".into())]);
        assert_eq!(parse_path("a[0"), vec![Segment::Key("a[0".into())]);
        assert_eq!(
            parse_path("a[01]"),
            vec![Segment::Key("a".into()), Segment::Key("01".into())]
        );
    }

    #[test]
    fn test_format_round_trip() {
        for name in ["", "a", "a.b[0].c", "[1][2]", "list[10].x.y"] {
            assert_eq!(format_path(&parse_path(name)), name);
        }
    }

    #[test]
    fn test_prefix_relation() {
        assert!(is_prefix("a", "a.b"));
        assert!(is_prefix("a", "a[0]"));
        assert!(!is_prefix("a", "a"));
        assert!(!is_prefix("a", "ab"));
        assert!(!is_prefix("a.b", "a"));
        assert!(is_descendant("", "a"));
        assert!(!is_descendant("", ""));
    }

    #[test]
    fn test_set_creates_containers() {
        let mut tree = json!({});
        set_value(&mut tree, "a.b[1].c", |_| Some(json!("x")));
        assert_eq!(tree, json!({"a": {"b": [null, {"c": "x"}]}}));
    }

    #[test]
    fn test_oversized_indices_do_not_grow_sequences() {
        let mut tree = json!({});
        set_value(&mut tree, "a[4000000000]", |_| Some(json!("x")));
        assert_eq!(tree, json!({"a": {"4000000000": "x"}}));

        let mut tree = json!({"list": ["a"]});
        set_value(&mut tree, "list[20000]", |_| Some(json!("x")));
        assert_eq!(tree, json!({"list": {"20000": "x"}}));

        let mut tree = json!({});
        set_value(&mut tree, &format!("b[{MAX_LIST_INDEX}]"), |_| Some(json!("y")));
        assert_eq!(tree["b"].as_array().map(Vec::len), Some(MAX_LIST_INDEX + 1));
    }

    #[test]
    fn test_overflowing_index_is_a_key() {
        assert_eq!(
            parse_path("a[99999999999999999999999]"),
            vec![
                Segment::Key("a".into()),
                Segment::Key("99999999999999999999999".into())
            ]
        );
        let mut tree = json!({});
        set_value(&mut tree, "a[99999999999999999999999]", |_| Some(json!("x")));
        set_value(&mut tree, "a.b", |_| Some(json!("y")));
        assert_eq!(tree, json!({"a": {"99999999999999999999999": "x", "b": "y"}}));
    }

    #[test]
    fn test_set_with_none_does_not_create() {
        let mut tree = json!({"keep": "1"});
        set_value(&mut tree, "missing.deep", |current| {
            assert!(current.is_none());
            None
        });
        assert_eq!(tree, json!({"keep": "1"}));
    }

    #[test]
    fn test_remove_leaves_hole() {
        let mut tree = json!({"items": ["a", "b", "c"]});
        assert_eq!(remove_value(&mut tree, "items[1]"), Some(json!("b")));
        assert_eq!(tree, json!({"items": ["a", null, "c"]}));
        assert_eq!(get_value(&tree, "items[2]"), Some(&json!("c")));
        assert_eq!(get_value(&tree, "items[1]"), None);
    }
}
