//! Evaluation Content
//!
//! The evaluation agent answers with a completion whose message content is
//! (usually) a JSON object describing the process. `ContentResult` is either
//! that object or the raw message text when it could not be decoded into one.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use avagama_core::Shape;

use crate::decode::{alias_dimensions, decode_fenced, Decoded};

const RAW_TEXT_KEY: &str = "raw_text";

/// Canonical single-object result of an evaluation.
///
/// Serialized as the decoded mapping itself, or as `{"raw_text": "..."}`.
/// Deserializing that form cannot tell a decoded `{"raw_text": "..."}`
/// mapping from raw text; persistent storage keeps an explicit variant tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub enum ContentResult {
    /// Decoded mapping
    Parsed(Map<String, Value>),
    /// Message text kept verbatim
    RawText(String),
}

impl ContentResult {
    pub fn as_mapping(&self) -> Option<&Map<String, Value>> {
        match self {
            ContentResult::Parsed(map) => Some(map),
            ContentResult::RawText(_) => None,
        }
    }

    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ContentResult::Parsed(_) => None,
            ContentResult::RawText(text) => Some(text),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ContentResult::RawText(_))
    }

    /// Field of the decoded mapping; always `None` for raw text.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.clone().into())
    }
}

impl From<Map<String, Value>> for ContentResult {
    fn from(map: Map<String, Value>) -> Self {
        if map.len() == 1 {
            if let Some(Value::String(text)) = map.get(RAW_TEXT_KEY) {
                return ContentResult::RawText(text.clone());
            }
        }
        ContentResult::Parsed(map)
    }
}

impl From<ContentResult> for Map<String, Value> {
    fn from(content: ContentResult) -> Self {
        match content {
            ContentResult::Parsed(map) => map,
            ContentResult::RawText(text) => {
                let mut map = Map::new();
                map.insert(RAW_TEXT_KEY.to_string(), Value::String(text));
                map
            }
        }
    }
}

/// Normalize the message text of an evaluation completion.
///
/// A fenced or bare JSON object becomes `Parsed`; anything else (prose,
/// malformed JSON, a JSON array or scalar) keeps the original text.
pub fn content_from_text(text: &str) -> ContentResult {
    match decode_fenced(text) {
        Decoded::Json(Value::Object(map)) => ContentResult::Parsed(map),
        Decoded::Json(_) | Decoded::Raw(_) => {
            debug!(len = text.len(), "evaluation content kept as raw text");
            ContentResult::RawText(text.to_string())
        }
    }
}

/// Extract the content of a completion-shaped agent response
/// (`choices[0].message.content`). Returns `None` when there is no message
/// content at all.
pub fn extract_content(agent_json: &Value) -> Option<ContentResult> {
    let content = Shape::from_value(agent_json)
        .field("choices")
        .index(0)
        .path(&["message", "content"]);

    match content {
        Shape::Absent => None,
        Shape::Scalar(Value::String(text)) => Some(content_from_text(text)),
        Shape::Mapping(map) => {
            let mut value = Value::Object(map.clone());
            alias_dimensions(&mut value);
            match value {
                Value::Object(map) => Some(ContentResult::Parsed(map)),
                other => Some(ContentResult::RawText(other.to_string())),
            }
        }
        Shape::Scalar(other) => Some(ContentResult::RawText(other.to_string())),
        Shape::Sequence(items) => Some(ContentResult::RawText(Value::from(items.to_vec()).to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completion(content: Value) -> Value {
        json!({"id": "cmpl-1", "choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_fenced_object_is_parsed() {
        let response = completion(json!(
            "```json\n{\"fitment\": \"Agentic AI\", \"automation_feasibility_score\": 78}\n```"
        ));
        let content = extract_content(&response).unwrap();
        assert_eq!(content.get("fitment"), Some(&json!("Agentic AI")));
        assert!(!content.is_raw());
    }

    #[test]
    fn test_dimensions_alias_on_parsed_content() {
        let response = completion(json!("{\"dimensions\": {\"volume\": {\"score\": 70}}}"));
        let content = extract_content(&response).unwrap();
        assert_eq!(content.get("process_characteristics"), content.get("dimensions"));
    }

    #[test]
    fn test_prose_is_kept_verbatim() {
        let text = "  I am unable to evaluate this process.  ";
        let content = extract_content(&completion(json!(text))).unwrap();
        assert_eq!(content, ContentResult::RawText(text.to_string()));
        assert_eq!(content.raw_text(), Some(text));
        assert!(content.as_mapping().is_none());
    }

    #[test]
    fn test_array_content_falls_back_to_raw() {
        let text = "[1, 2, 3]";
        let content = extract_content(&completion(json!(text))).unwrap();
        assert_eq!(content.raw_text(), Some(text));
    }

    #[test]
    fn test_structured_content_mapping() {
        let response = completion(json!({"dimensions": {"a": 1}}));
        let content = extract_content(&response).unwrap();
        assert_eq!(content.get("process_characteristics"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_missing_content() {
        assert_eq!(extract_content(&json!({})), None);
        assert_eq!(extract_content(&json!({"choices": []})), None);
        assert_eq!(extract_content(&Value::Null), None);
    }

    #[test]
    fn test_serde_shape() {
        let raw = ContentResult::RawText("oops".to_string());
        assert_eq!(serde_json::to_value(&raw).unwrap(), json!({"raw_text": "oops"}));
        let back: ContentResult = serde_json::from_value(json!({"raw_text": "oops"})).unwrap();
        assert_eq!(back, raw);

        let parsed: ContentResult =
            serde_json::from_value(json!({"raw_text": "x", "fitment": "LLM"})).unwrap();
        assert!(!parsed.is_raw());
        assert_eq!(parsed.to_value(), json!({"raw_text": "x", "fitment": "LLM"}));
    }
}
