//! Lenient JSON Decoding
//!
//! Strict `serde_json` parsing with an opaque fallback: text that is not JSON
//! comes back as `Decoded::Raw` instead of an error.

use serde_json::Value;
use tracing::debug;

use crate::fence::unwrap_fenced;
use crate::keys::{CHARACTERISTICS_KEY, DIMENSIONS_KEY};

/// Outcome of a lenient decode.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The text was valid JSON
    Json(Value),
    /// The text was not valid JSON; holds it verbatim
    Raw(String),
}

impl Decoded {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Decoded::Json(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Decoded::Json(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Decoded::Raw(_))
    }
}

/// Decode `text` as JSON, falling back to the raw text on failure.
///
/// A decoded mapping that carries `dimensions` but no
/// `process_characteristics` gets the dimensions republished under the
/// canonical key too (see [`alias_dimensions`]).
pub fn decode_lenient(text: &str) -> Decoded {
    match serde_json::from_str::<Value>(text) {
        Ok(mut value) => {
            alias_dimensions(&mut value);
            Decoded::Json(value)
        }
        Err(e) => {
            debug!(error = %e, len = text.len(), "agent text is not JSON, keeping raw");
            Decoded::Raw(text.to_string())
        }
    }
}

/// Unwrap a markdown fence, then decode leniently.
///
/// The raw fallback holds the unwrapped text.
pub fn decode_fenced(text: &str) -> Decoded {
    decode_lenient(unwrap_fenced(text))
}

/// Copy a mapping's `dimensions` object to `process_characteristics` when the
/// canonical key is missing. Both keys remain present. Returns whether the
/// alias was added.
pub fn alias_dimensions(value: &mut Value) -> bool {
    let Some(map) = value.as_object_mut() else {
        return false;
    };
    if map.contains_key(CHARACTERISTICS_KEY) {
        return false;
    }
    match map.get(DIMENSIONS_KEY) {
        Some(dimensions @ Value::Object(_)) => {
            let dimensions = dimensions.clone();
            map.insert(CHARACTERISTICS_KEY.to_string(), dimensions);
            true
        }
        _ => false,
    }
}
