//! Polymorphic Field Resolution
//!
//! Some fields change shape between agent versions: a benefit score may be a
//! bare `65` or `{"score": 65, "weight": 100}`. These helpers collapse such
//! fields to a single scalar.

use serde_json::Value;

use avagama_core::{probe, probe_truthy, Shape};

/// Resolve a field that is either a scalar or a mapping holding one of
/// `probes`.
///
/// - mapping: the first probe whose value is present and not `null`
/// - scalar: the scalar itself
/// - anything else (absent, `null`, a sequence, no matching probe): `default`
pub fn resolve_polymorphic(value: Option<&Value>, probes: &[&str], default: Value) -> Value {
    match Shape::of(value) {
        Shape::Mapping(map) => probe(map, probes).cloned().unwrap_or(default),
        Shape::Scalar(scalar) => scalar.clone(),
        Shape::Sequence(_) | Shape::Absent => default,
    }
}

/// First truthy field among `keys` of a mapping-valued `container`, e.g.
/// `recommendations.llm_recommendation` falling back to the legacy
/// `recommendations.llm_type`.
pub fn resolve_field(container: Option<&Value>, keys: &[&str]) -> Option<Value> {
    Shape::of(container)
        .as_mapping()
        .and_then(|map| probe_truthy(map, keys))
        .cloned()
}

/// Resolve a polymorphic field and read it as a number.
pub fn resolve_score(value: Option<&Value>, probes: &[&str]) -> Option<f64> {
    numeric(&resolve_polymorphic(value, probes, Value::Null))
}

/// Read a JSON number, or a string holding one.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
