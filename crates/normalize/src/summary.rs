//! Use-Case Summaries
//!
//! Flat, display-ready view of item records: title, description, domain and a
//! 0-10 rating, sorted best first.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use avagama_core::{probe_truthy, scalar_text, Shape};

use crate::extract::{extract_items, root_domain};
use crate::keys::{DESCRIPTION_KEYS, DOMAIN_KEYS, NAME_KEYS, SCORE_PROBES};
use crate::resolve::{numeric, resolve_score};

const RATING_KEY: &str = "rating";
const BENEFIT_SCORE_KEY: &str = "business_benefit_score";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseSummary {
    pub title: String,
    pub description: String,
    pub domain: String,
    pub rating: f64,
}

impl UseCaseSummary {
    /// Project one item record. Non-mapping records have no summary.
    ///
    /// The rating is the item's own `rating`, else its business benefit
    /// score (0-100) scaled to 0-10, else 0.
    pub fn from_item(item: &Value, root_domain: Option<&str>) -> Option<Self> {
        let record = Shape::from_value(item).as_mapping()?;
        let text_of = |keys: &[&str]| {
            probe_truthy(record, keys)
                .and_then(scalar_text)
                .map(|text| text.trim().to_string())
                .unwrap_or_default()
        };

        let mut domain = text_of(&DOMAIN_KEYS[..]);
        if domain.is_empty() {
            domain = root_domain.unwrap_or_default().to_string();
        }

        let rating = match probe_truthy(record, &[RATING_KEY]) {
            Some(rating) => numeric(rating).unwrap_or(0.0),
            None => resolve_score(record.get(BENEFIT_SCORE_KEY), &SCORE_PROBES)
                .filter(|score| *score != 0.0)
                .map(|score| score / 10.0)
                .unwrap_or(0.0),
        };

        Some(Self {
            title: text_of(&NAME_KEYS[..]),
            description: text_of(&DESCRIPTION_KEYS[..]),
            domain,
            rating,
        })
    }
}

/// Summarize item records, highest rating first. Ties keep input order.
pub fn summarize_items(items: &[Value], root_domain: Option<&str>) -> Vec<UseCaseSummary> {
    let mut summaries: Vec<UseCaseSummary> = items
        .iter()
        .filter_map(|item| UseCaseSummary::from_item(item, root_domain))
        .collect();
    summaries.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    summaries
}

/// Extract and summarize the use cases of a raw agent response.
pub fn summarize(response: &Value) -> Vec<UseCaseSummary> {
    let domain = root_domain(response);
    summarize_items(&extract_items(response), domain.as_deref())
}
