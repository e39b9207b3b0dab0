//! Evaluation Models
//!
//! Process evaluation requests, persisted records and the list-view row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use avagama_core::RecordStatus;
use avagama_normalize::keys::{LLM_RECOMMENDATION_KEYS, SCORE_PROBES};
use avagama_normalize::{resolve_field, resolve_polymorphic, ContentResult};

/// Process description submitted for evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub process_name: String,
    pub description: String,
    #[serde(default)]
    pub volume: String,
    #[serde(default)]
    pub frequency: String,
    /// Percentage of cases that need exception handling
    #[serde(default)]
    pub exception_rate: u32,
    #[serde(default)]
    pub complexity: u32,
    #[serde(default)]
    pub risk_tolerance: String,
    #[serde(default)]
    pub compliance_sensitivity: String,
    #[serde(default)]
    pub decision_points: String,
    /// Text of an attached SOP document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sop_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sop_metadata: Option<SopMetadata>,
}

/// Describes the SOP document a request was submitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SopMetadata {
    pub filename: String,
    pub content_type: String,
    /// Length of the extracted text in characters
    pub size: usize,
}

const SCORING_INSTRUCTIONS: &str = "IMPORTANT JSON SCHEMA REQUIREMENT:\n\
For any 'dimensions', 'process_characteristics', or scoring criteria in your JSON output, \
do NOT just return a simple string (like 'high' or 'medium'). Instead, return an object for each dimension containing:\n\
- 'score': A numerical score (e.g., 75, 8.5)\n\
- 'weight': A numerical weight (e.g., 100, 10)\n\
- 'value': The string value ('High', 'Medium', 'Low')\n\
- 'justification': A detailed 1-2 sentence explanation justifying the assigned score.\n\
Example: 'knowledge_intensity': { 'score': 80, 'weight': 100, 'value': 'High', 'justification': 'Requires deep domain expertise...' }";

impl EvaluationRequest {
    /// Attach a plain-text SOP document.
    pub fn attach_sop(&mut self, filename: &str, content_type: &str, text: String) {
        self.sop_metadata = Some(SopMetadata {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            size: text.chars().count(),
        });
        self.sop_text = Some(text);
    }

    /// Message sent to the process evaluation agent.
    pub fn agent_message(&self) -> String {
        let mut message = format!(
            "{}\n{}\nprocess_volume: {}\nprocess_frequency: {}\nexception_rate: {}%\n\
             process_complexity: {}\nrisk_tolerance: {}\ncompliance_sensitivity: {}\n\
             decision_points: {}\n\n{}",
            self.process_name,
            self.description,
            self.volume,
            self.frequency,
            self.exception_rate,
            self.complexity,
            self.risk_tolerance,
            self.compliance_sensitivity,
            self.decision_points,
            SCORING_INSTRUCTIONS,
        );
        if let Some(sop) = self.sop_text.as_deref().filter(|text| !text.is_empty()) {
            message.push_str("\n\n--- SOP Document Content ---\n");
            message.push_str(sop);
        }
        message
    }
}

/// A stored evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub id: String,
    pub owner_id: String,
    pub process_name: String,
    pub submitted_payload: EvaluationRequest,
    pub formatted_message: String,
    /// Raw agent answer; `None` for drafts
    pub agent_response: Option<Value>,
    /// Normalized agent answer; `None` for drafts or answers without content
    pub parsed_content: Option<ContentResult>,
    pub status: RecordStatus,
    pub is_shortlisted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the "my evaluations" list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub id: String,
    pub process_name: String,
    pub created_at: DateTime<Utc>,
    pub automation_score: Option<Value>,
    /// Business benefit score, whether stored bare or as `{score|value}`
    pub feasibility_score: Value,
    pub fitment: Option<Value>,
    /// LLM recommendation under either of its legacy key names
    pub llm_type: Option<Value>,
    pub status: RecordStatus,
    pub is_shortlisted: bool,
}

impl EvaluationRow {
    pub fn from_record(record: &EvaluationRecord) -> Self {
        let content = record.parsed_content.as_ref();
        let field = |key: &str| content.and_then(|c| c.get(key));

        Self {
            id: record.id.clone(),
            process_name: record.process_name.clone(),
            created_at: record.created_at,
            automation_score: field("automation_feasibility_score").cloned(),
            feasibility_score: resolve_polymorphic(
                field("business_benefit_score"),
                &SCORE_PROBES,
                Value::from(0),
            ),
            fitment: field("fitment").cloned(),
            llm_type: resolve_field(field("recommendations"), &LLM_RECOMMENDATION_KEYS),
            status: record.status,
            is_shortlisted: record.is_shortlisted,
        }
    }
}
