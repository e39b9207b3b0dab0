//! Avagama Normalize
//!
//! Turns whatever the external agent returned (a JSON object, a JSON array,
//! plain text, or JSON inside a markdown fence, with unpredictable keys and
//! nesting) into canonical results:
//!
//! - a single content object for evaluations (`ContentResult`)
//! - a flat list of use-case item records (`extract_items`)
//! - a deduplicated list of use-case names (`NameList`)
//!
//! Nothing in this crate returns an error. Every stage degrades to an empty
//! or fallback value so a malformed agent answer never aborts a request.
//!
//! ## Pipeline
//!
//! ```text
//! raw response ─► extract_items ─┬─► locate (deep search)
//!                                └─► completion text ─► unwrap_fenced ─► decode_lenient
//!              ─► project_names ─► NameList
//! ```

pub mod content;
pub mod decode;
pub mod extract;
pub mod fence;
pub mod keys;
pub mod locate;
pub mod names;
pub mod resolve;
pub mod summary;

pub use content::{content_from_text, extract_content, ContentResult};
pub use decode::{alias_dimensions, decode_fenced, decode_lenient, Decoded};
pub use extract::{
    completion_text, extract_items, find_items, find_use_case_container, root_domain, ItemSource,
};
pub use fence::unwrap_fenced;
pub use locate::{locate_container, locate_item_sequence};
pub use names::{item_name, project_names, NameList};
pub use resolve::{numeric, resolve_field, resolve_polymorphic, resolve_score};
pub use summary::{summarize, summarize_items, UseCaseSummary};

/// Extract use-case names from a raw agent response in one step.
pub fn normalize_use_case_names(response: &serde_json::Value) -> NameList {
    project_names(&extract_items(response))
}
