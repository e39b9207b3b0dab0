//! Deep Structure Locator
//!
//! Recursive search through an untyped mapping for something that looks like
//! a list of use cases.
//!
//! Keys are visited in document order (`serde_json` is built with
//! `preserve_order`). When several sibling lists qualify, the first one in
//! document order wins; callers should not depend on which.

use serde_json::{Map, Value};

use avagama_core::{probe_truthy, Shape};

use crate::keys::{NAME_KEYS, USE_CASES_KEY};

/// Find the first item-like sequence inside `map`.
///
/// Precedence at every level: the canonical `use_cases` list, then any
/// sequence whose first element is a mapping with a name-bearing field, then
/// the same search inside each child mapping.
pub fn locate_item_sequence(map: &Map<String, Value>) -> Option<&[Value]> {
    if let Some(items) = Shape::of(map.get(USE_CASES_KEY)).as_sequence() {
        return Some(items);
    }

    for value in map.values() {
        match Shape::from_value(value) {
            Shape::Sequence(items) if looks_like_item_list(items) => return Some(items),
            Shape::Mapping(child) => {
                if let Some(found) = locate_item_sequence(child) {
                    return Some(found);
                }
            }
            Shape::Sequence(_) | Shape::Scalar(_) | Shape::Absent => {}
        }
    }

    None
}

/// Find the first mapping (at or below `value`) that carries a `use_cases`
/// list. Sequences are searched element by element.
pub fn locate_container(value: &Value) -> Option<&Map<String, Value>> {
    match Shape::from_value(value) {
        Shape::Mapping(map) => {
            if Shape::of(map.get(USE_CASES_KEY)).as_sequence().is_some() {
                return Some(map);
            }
            map.values().find_map(locate_container)
        }
        Shape::Sequence(items) => items.iter().find_map(locate_container),
        Shape::Scalar(_) | Shape::Absent => None,
    }
}

fn looks_like_item_list(items: &[Value]) -> bool {
    items
        .first()
        .and_then(|first| Shape::from_value(first).as_mapping())
        .map(|record| probe_truthy(record, &NAME_KEYS).is_some())
        .unwrap_or(false)
}
