//! Name Projection and Deduplication
//!
//! Maps item records to display names and keeps the first occurrence of each.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use avagama_core::{probe_truthy, scalar_text, Shape};

use crate::keys::NAME_KEYS;

/// Ordered list of unique, trimmed, non-empty names.
///
/// Order is first-seen order. Deserializing drops blanks and duplicates so
/// lists read back from storage are unique too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct NameList {
    names: Vec<String>,
}

impl NameList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` (trimmed) unless it is blank or already present.
    /// Matching is exact and case-sensitive. Returns whether it was added.
    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.contains(name) {
            return false;
        }
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.names.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

impl<S: AsRef<str>> FromIterator<S> for NameList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = NameList::new();
        for name in iter {
            list.insert(name.as_ref());
        }
        list
    }
}

impl From<Vec<String>> for NameList {
    fn from(names: Vec<String>) -> Self {
        names.into_iter().collect()
    }
}

impl From<NameList> for Vec<String> {
    fn from(list: NameList) -> Self {
        list.names
    }
}

impl<'a> IntoIterator for &'a NameList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Display name of one item record: the first truthy of `title`, `use_case`,
/// `name`, as text, trimmed. Non-mapping records and blank names have none.
pub fn item_name(item: &Value) -> Option<String> {
    let record = Shape::from_value(item).as_mapping()?;
    let name = scalar_text(probe_truthy(record, &NAME_KEYS)?)?;
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Project item records to a deduplicated name list.
pub fn project_names(items: &[Value]) -> NameList {
    items.iter().filter_map(item_name).collect()
}
