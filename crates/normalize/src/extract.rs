//! Shape Normalizer
//!
//! Resolves an agent response of unknown shape into a flat sequence of
//! use-case item records. Strategies are tried in a fixed order and the first
//! one that yields a sequence wins:
//!
//! 1. the response is itself a sequence
//! 2. a canonical `use_cases` list
//! 3. a nested `agent_response` (double-wrapped persistence records)
//! 4. an alternate list key (`items`, `results`, `data`)
//! 5. deep search over the whole mapping
//! 6. the assistant message text of a completion (`choices[0].message.content`),
//!    unwrapped and decoded, then used directly or deep-searched
//!
//! A strategy that does not apply simply yields `None`; the response as a
//! whole yields an empty list if nothing matches.

use std::borrow::Cow;

use serde_json::{Map, Value};
use tracing::debug;

use avagama_core::{probe_truthy, scalar_text, Shape};

use crate::decode::{decode_fenced, Decoded};
use crate::keys::{AGENT_RESPONSE_KEY, ALTERNATE_LIST_KEYS, ROOT_DOMAIN_KEYS, USE_CASES_KEY};
use crate::locate::{locate_container, locate_item_sequence};

/// Which strategy produced the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    TopLevelSequence,
    CanonicalKey,
    AlternateKey(&'static str),
    DeepSearch,
    CompletionSequence,
    CompletionDeepSearch,
}

/// Extract item records from an agent response. Never fails; an unusable
/// response yields an empty list.
pub fn extract_items(response: &Value) -> Vec<Value> {
    match find_items(response) {
        Some((source, items)) => {
            debug!(?source, count = items.len(), "extracted use-case items");
            items.into_owned()
        }
        None => {
            debug!("no use-case items found in agent response");
            Vec::new()
        }
    }
}

/// Run the strategies and report which one matched. Items borrowed from the
/// response are not copied; items decoded from completion text are owned.
pub fn find_items(response: &Value) -> Option<(ItemSource, Cow<'_, [Value]>)> {
    let map = match Shape::from_value(response) {
        Shape::Sequence(items) => {
            return Some((ItemSource::TopLevelSequence, Cow::Borrowed(items)));
        }
        Shape::Mapping(map) => map,
        Shape::Scalar(_) | Shape::Absent => return None,
    };

    if let Some(items) = Shape::of(map.get(USE_CASES_KEY)).as_sequence() {
        return Some((ItemSource::CanonicalKey, Cow::Borrowed(items)));
    }

    if let Some(nested) = map.get(AGENT_RESPONSE_KEY) {
        if Shape::from_value(nested).is_truthy() {
            return find_items(nested);
        }
    }

    for key in ALTERNATE_LIST_KEYS {
        if let Some(items) = Shape::of(map.get(key)).as_sequence() {
            return Some((ItemSource::AlternateKey(key), Cow::Borrowed(items)));
        }
    }

    if let Some(items) = locate_item_sequence(map) {
        return Some((ItemSource::DeepSearch, Cow::Borrowed(items)));
    }

    items_from_completion(response)
}

fn items_from_completion(response: &Value) -> Option<(ItemSource, Cow<'static, [Value]>)> {
    let text = completion_text(response)?;
    match decode_fenced(text) {
        Decoded::Json(Value::Array(items)) => {
            Some((ItemSource::CompletionSequence, Cow::Owned(items)))
        }
        Decoded::Json(Value::Object(map)) => locate_item_sequence(&map)
            .map(|items| (ItemSource::CompletionDeepSearch, Cow::Owned(items.to_vec()))),
        Decoded::Json(_) | Decoded::Raw(_) => None,
    }
}

/// The assistant message text of a completion-shaped response
/// (`choices[0].message.content`), if it is a string.
pub fn completion_text(response: &Value) -> Option<&str> {
    match Shape::from_value(response)
        .field("choices")
        .index(0)
        .path(&["message", "content"])
    {
        Shape::Scalar(Value::String(text)) => Some(text.as_str()),
        _ => None,
    }
}

/// The full mapping that carries the `use_cases` list, keeping sibling
/// fields such as `company_name` and `industry`.
pub fn find_use_case_container(response: &Value) -> Option<Map<String, Value>> {
    let map = Shape::from_value(response).as_mapping()?;

    if Shape::of(map.get(USE_CASES_KEY)).as_sequence().is_some() {
        return Some(map.clone());
    }

    if let Some(nested) = map.get(AGENT_RESPONSE_KEY) {
        if Shape::from_value(nested).is_truthy() {
            return find_use_case_container(nested);
        }
    }

    let text = completion_text(response)?;
    let decoded = decode_fenced(text).into_json()?;
    locate_container(&decoded).cloned()
}

/// Root-level domain of a company payload (`industry`, `category` or
/// `domain`), used when an item carries no domain of its own.
pub fn root_domain(response: &Value) -> Option<String> {
    let container = find_use_case_container(response)?;
    probe_truthy(&container, &ROOT_DOMAIN_KEYS)
        .and_then(scalar_text)
        .map(|domain| domain.trim().to_string())
        .filter(|domain| !domain.is_empty())
}
