//! Process Evaluation
//!
//! Submits process descriptions to the evaluation agent, stores the
//! normalized answer and serves the list, detail and dashboard views.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use avagama_core::RecordStatus;
use avagama_normalize::{extract_content, ContentResult};

use crate::models::dashboard::DashboardSummary;
use crate::models::evaluation::{EvaluationRecord, EvaluationRequest, EvaluationRow};
use crate::models::settings::AppConfig;
use crate::services::agent::AgentClient;
use crate::services::dashboard::summarize_dashboard;
use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

/// Evaluation flows for one configured agent
pub struct EvaluationService {
    config: AppConfig,
    agent: Arc<dyn AgentClient>,
    db: Database,
}

impl EvaluationService {
    pub fn new(config: AppConfig, agent: Arc<dyn AgentClient>, db: Database) -> Self {
        Self { config, agent, db }
    }

    /// Evaluate a process and store the result.
    ///
    /// With `existing_id` the owner's stored evaluation (usually a draft) is
    /// overwritten in place. Fails when the owner has used up their
    /// evaluation allowance or the agent cannot be reached. Usage grows when
    /// a new evaluation is stored or a draft is completed, and never shrinks.
    pub async fn submit(
        &self,
        owner_id: &str,
        request: EvaluationRequest,
        existing_id: Option<&str>,
    ) -> AppResult<EvaluationRecord> {
        validate_request(&request)?;

        let used = self.db.evaluation_usage(owner_id)?;
        if used >= self.config.default_evaluation_limit {
            return Err(AppError::validation("You have reached your evaluation limit."));
        }
        let existing = self.existing(owner_id, existing_id)?;

        let message = request.agent_message();
        let agent_response = self
            .agent
            .call_agent(&self.config.process_agent_id, &message)
            .await
            .map_err(|e| {
                tracing::warn!(owner_id, "Evaluation agent call failed: {}", e);
                AppError::agent(format!("The AI service is temporarily unavailable: {}", e))
            })?;

        let parsed_content = extract_content(&agent_response);
        if parsed_content.as_ref().map_or(true, |c| c.is_raw()) {
            tracing::debug!(owner_id, "Evaluation content was not a JSON object");
        }

        let record = self.store(
            owner_id,
            existing,
            request,
            message,
            Some(agent_response),
            parsed_content,
            RecordStatus::Completed,
        )?;
        tracing::info!(owner_id, "Stored evaluation {}", record.id);
        Ok(record)
    }

    /// Store a request without evaluating it, or overwrite `existing_id`
    pub fn save_draft(
        &self,
        owner_id: &str,
        request: EvaluationRequest,
        existing_id: Option<&str>,
    ) -> AppResult<EvaluationRecord> {
        validate_request(&request)?;
        let existing = self.existing(owner_id, existing_id)?;
        self.store(
            owner_id,
            existing,
            request,
            String::new(),
            None,
            None,
            RecordStatus::Draft,
        )
    }

    fn existing(&self, owner_id: &str, id: Option<&str>) -> AppResult<Option<EvaluationRecord>> {
        id.map(|id| {
            self.db.get_evaluation(owner_id, id)?.ok_or_else(|| {
                AppError::not_found(format!("Evaluation {} not found or unauthorized", id))
            })
        })
        .transpose()
    }

    #[allow(clippy::too_many_arguments)]
    fn store(
        &self,
        owner_id: &str,
        existing: Option<EvaluationRecord>,
        request: EvaluationRequest,
        formatted_message: String,
        agent_response: Option<Value>,
        parsed_content: Option<ContentResult>,
        status: RecordStatus,
    ) -> AppResult<EvaluationRecord> {
        let now = Utc::now();
        let (id, created_at) = match &existing {
            Some(previous) => (previous.id.clone(), previous.created_at),
            None => (uuid::Uuid::new_v4().to_string(), now),
        };
        let record = EvaluationRecord {
            id,
            owner_id: owner_id.to_string(),
            process_name: request.process_name.clone(),
            submitted_payload: request,
            formatted_message,
            agent_response,
            parsed_content,
            status,
            is_shortlisted: false,
            created_at,
            updated_at: now,
        };

        if existing.is_some() {
            if !self.db.update_evaluation(&record)? {
                return Err(AppError::not_found(format!(
                    "Evaluation {} not found or unauthorized",
                    record.id
                )));
            }
        } else {
            self.db.insert_evaluation(&record)?;
        }
        Ok(record)
    }

    /// List-view rows, newest first
    pub fn list_rows(&self, owner_id: &str) -> AppResult<Vec<EvaluationRow>> {
        Ok(self
            .db
            .list_evaluations(owner_id)?
            .iter()
            .map(EvaluationRow::from_record)
            .collect())
    }

    pub fn get(&self, owner_id: &str, id: &str) -> AppResult<EvaluationRecord> {
        self.db
            .get_evaluation(owner_id, id)?
            .ok_or_else(|| AppError::not_found(format!("Evaluation {}", id)))
    }

    pub fn delete(&self, owner_id: &str, id: &str) -> AppResult<()> {
        if self.db.delete_evaluation(owner_id, id)? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Evaluation {}", id)))
        }
    }

    /// Shortlist evaluations; returns how many were updated
    pub fn shortlist(&self, owner_id: &str, ids: &[String]) -> AppResult<usize> {
        let updated = self.db.shortlist_evaluations(owner_id, ids)?;
        if updated == 0 {
            return Err(AppError::not_found("No matching evaluations"));
        }
        Ok(updated)
    }

    /// Dashboard over the last `days` days (1 to 365)
    pub fn dashboard(&self, owner_id: &str, days: u32) -> AppResult<DashboardSummary> {
        if !(1..=365).contains(&days) {
            return Err(AppError::validation("days must be between 1 and 365"));
        }
        let records = self.db.list_evaluations(owner_id)?;
        Ok(summarize_dashboard(&records, days, Utc::now()))
    }
}

fn validate_request(request: &EvaluationRequest) -> AppResult<()> {
    if request.process_name.trim().is_empty() {
        return Err(AppError::validation("process_name is required"));
    }
    Ok(())
}
