//! Value Shapes
//!
//! Agent responses arrive as untyped JSON trees. `Shape` is a borrowed,
//! tagged view over one node of such a tree so traversal code matches on
//! `{mapping, sequence, scalar, absent}` exhaustively instead of poking at
//! `Value` with ad-hoc type checks at every level.
//!
//! Key probes (`probe`, `probe_truthy`) evaluate an ordered list of candidate
//! keys against a mapping and return the first hit.

use serde_json::{Map, Value};

/// Borrowed view of a single JSON node.
///
/// `null` and a missing key are both `Absent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape<'a> {
    Mapping(&'a Map<String, Value>),
    Sequence(&'a [Value]),
    Scalar(&'a Value),
    Absent,
}

impl<'a> Shape<'a> {
    /// Classify an optional node.
    pub fn of(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => Shape::Absent,
            Some(Value::Object(map)) => Shape::Mapping(map),
            Some(Value::Array(items)) => Shape::Sequence(items.as_slice()),
            Some(other) => Shape::Scalar(other),
        }
    }

    /// Classify a node that is known to exist.
    pub fn from_value(value: &'a Value) -> Self {
        Self::of(Some(value))
    }

    pub fn as_mapping(self) -> Option<&'a Map<String, Value>> {
        match self {
            Shape::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(self) -> Option<&'a [Value]> {
        match self {
            Shape::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Child under `key`; `Absent` unless this node is a mapping holding it.
    pub fn field(self, key: &str) -> Shape<'a> {
        match self {
            Shape::Mapping(map) => Shape::of(map.get(key)),
            _ => Shape::Absent,
        }
    }

    /// Element at `index`; `Absent` unless this node is a long enough sequence.
    pub fn index(self, index: usize) -> Shape<'a> {
        match self {
            Shape::Sequence(items) => Shape::of(items.get(index)),
            _ => Shape::Absent,
        }
    }

    /// Follow a path of mapping keys.
    pub fn path(self, keys: &[&str]) -> Shape<'a> {
        keys.iter().fold(self, |node, key| node.field(key))
    }

    pub fn is_absent(self) -> bool {
        matches!(self, Shape::Absent)
    }

    /// Truthiness in the loose sense agent payloads are written with:
    /// absent, `false`, zero and `""` are falsy; containers are always truthy.
    pub fn is_truthy(self) -> bool {
        match self {
            Shape::Absent => false,
            Shape::Mapping(_) | Shape::Sequence(_) => true,
            Shape::Scalar(value) => is_truthy(value),
        }
    }
}

/// Loose truthiness of a raw value. See [`Shape::is_truthy`].
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First candidate key whose value is present and not `null`.
pub fn probe<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// First candidate key whose value is truthy.
pub fn probe_truthy<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| is_truthy(value))
}

/// Coerce a scalar to display text. Containers and `null` have no text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
