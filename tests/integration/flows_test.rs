//! Discovery and Evaluation Flow Integration Tests
//!
//! Runs the flows through `AppState` with a scripted agent and a real
//! in-memory SQLite database. No network calls are made.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use avagama_backend::models::discovery::{CompanyRequest, DomainRequest};
use avagama_backend::models::evaluation::EvaluationRequest;
use avagama_backend::services::agent::AgentClient;
use avagama_backend::services::tracking::{InMemoryTrackingStore, TrackingStore};
use avagama_backend::storage::database::Database;
use avagama_backend::{AppConfig, AppError, AppResult, AppState, DiscoveryType, RecordStatus};

// ============================================================================
// Helpers
// ============================================================================

struct ScriptedAgent {
    answers: Mutex<VecDeque<AppResult<Value>>>,
}

#[async_trait]
impl AgentClient for ScriptedAgent {
    async fn call_agent(&self, _agent_id: &str, _content: &str) -> AppResult<Value> {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::agent("no scripted answer left")))
    }
}

fn agent(answers: Vec<AppResult<Value>>) -> Arc<ScriptedAgent> {
    Arc::new(ScriptedAgent {
        answers: Mutex::new(answers.into()),
    })
}

fn state(answers: Vec<AppResult<Value>>) -> AppState {
    let agent = agent(answers);
    AppState::with_parts(
        AppConfig::default(),
        Database::new_in_memory().expect("Failed to create in-memory test database"),
        agent,
    )
}

fn completion(content: &str) -> Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

// ============================================================================
// Discovery
// ============================================================================

#[tokio::test]
async fn test_company_discovery_tracks_names_across_calls() {
    let state = state(vec![
        Ok(completion(
            "```json\n{\"company_name\": \"Acme\", \"use_cases\": [{\"title\": \"A\"}, {\"title\": \"B\"}]}\n```",
        )),
        Ok(json!({"agent_response": {"use_cases": [{"name": "B"}, {"name": "C"}]}})),
    ]);
    let request = CompanyRequest {
        company_name: "Acme".to_string(),
    };

    let first = state.discovery().discover_company("u1", &request).await.unwrap();
    let second = state.discovery().discover_company("u1", &request).await.unwrap();
    assert_eq!(first.names.as_slice(), ["A", "B"]);
    assert_eq!(second.names.as_slice(), ["B", "C"]);

    let tracked = state
        .discovery()
        .tracked_names("u1", DiscoveryType::Company)
        .unwrap();
    assert_eq!(tracked.as_slice(), ["A", "B", "C"]);

    let history = state.discovery().history("u1", DiscoveryType::Company).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id);
}

#[tokio::test]
async fn test_discovery_with_in_memory_tracking() {
    let tracking = Arc::new(InMemoryTrackingStore::new());
    let state = AppState::with_tracking(
        AppConfig::default(),
        Database::new_in_memory().expect("Failed to create in-memory test database"),
        agent(vec![Ok(json!({"use_cases": [{"title": "A"}, {"title": "B"}]}))]),
        tracking.clone(),
    );
    let request = CompanyRequest {
        company_name: "Acme".to_string(),
    };

    state.discovery().discover_company("u1", &request).await.unwrap();
    assert_eq!(
        tracking.members("u1", DiscoveryType::Company).unwrap().into_vec(),
        ["A", "B"]
    );
    assert_eq!(
        state
            .discovery()
            .tracked_names("u1", DiscoveryType::Company)
            .unwrap()
            .into_vec(),
        ["A", "B"]
    );
}

#[tokio::test]
async fn test_domain_discovery_fallback_is_stored() {
    let state = state(vec![Err(AppError::agent("Agent API error (503): unavailable"))]);
    let request = DomainRequest {
        domain: "Insurance".to_string(),
        user_role: "Claims lead".to_string(),
        objective: "Faster settlements".to_string(),
    };

    let record = state.discovery().discover_domain("u1", &request).await.unwrap();
    assert_eq!(record.status, RecordStatus::Fallback);
    assert_eq!(record.names.len(), 5);
    assert_eq!(
        record.agent_error,
        Some(json!({"detail": "Agent error: Agent API error (503): unavailable"}))
    );

    let stored = state.discovery().history("u1", DiscoveryType::Domain).unwrap();
    assert_eq!(stored, vec![record]);
    assert!(state
        .discovery()
        .history("u1", DiscoveryType::Company)
        .unwrap()
        .is_empty());
}

// ============================================================================
// Evaluation
// ============================================================================

#[tokio::test]
async fn test_evaluation_rows_and_dashboard() {
    let state = state(vec![
        Ok(completion(
            "```json\n{\"automation_feasibility_score\": 80, \"business_benefit_score\": {\"score\": 65}, \
             \"fitment\": \"Agentic AI\", \"recommendations\": {\"llm_type\": \"GPT-4o\"}}\n```",
        )),
        Ok(completion(
            "{\"automation_feasibility_score\": 60, \"business_benefit_score\": 40, \
             \"fitment\": \"RPA\", \"recommendations\": {\"llm_recommendation\": \"Mistral Large\"}}",
        )),
    ]);
    let request = |name: &str| EvaluationRequest {
        process_name: name.to_string(),
        description: "Process description".to_string(),
        ..Default::default()
    };

    state.evaluation().submit("u1", request("First"), None).await.unwrap();
    state.evaluation().submit("u1", request("Second"), None).await.unwrap();

    let rows = state.evaluation().list_rows("u1").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].process_name, "Second");
    assert_eq!(rows[0].feasibility_score, json!(40));
    assert_eq!(rows[0].llm_type, Some(json!("Mistral Large")));
    assert_eq!(rows[1].feasibility_score, json!(65));
    assert_eq!(rows[1].llm_type, Some(json!("GPT-4o")));

    let dashboard = state.evaluation().dashboard("u1", 30).unwrap();
    assert_eq!(dashboard.total_evaluations, 2);
    assert_eq!(dashboard.evaluations_in_range, 2);
    assert_eq!(dashboard.average_automation_score, 70.0);
    assert_eq!(dashboard.technology_distribution.len(), 2);
}

#[tokio::test]
async fn test_evaluation_agent_failure_is_reported() {
    let state = state(vec![]);
    let result = state
        .evaluation()
        .submit(
            "u1",
            EvaluationRequest {
                process_name: "Payroll".to_string(),
                ..Default::default()
            },
            None,
        )
        .await;
    assert!(matches!(result, Err(AppError::Agent(_))));
}

#[tokio::test]
async fn test_draft_completion_counts_once() {
    let state = state(vec![
        Ok(completion("{\"fitment\": \"RPA\", \"automation_feasibility_score\": 72}")),
        Ok(completion("{\"fitment\": \"RPA\", \"automation_feasibility_score\": 75}")),
    ]);
    let mut request = EvaluationRequest {
        process_name: "Claims".to_string(),
        description: "Claims triage".to_string(),
        ..Default::default()
    };

    let draft = state.evaluation().save_draft("u1", request.clone(), None).unwrap();
    assert_eq!(state.evaluation().dashboard("u1", 30).unwrap().average_automation_score, 0.0);

    request.attach_sop("claims.txt", "text/plain", "Check policy number".to_string());
    let completed = state
        .evaluation()
        .submit("u1", request.clone(), Some(&draft.id))
        .await
        .unwrap();
    assert_eq!(completed.id, draft.id);
    assert!(completed
        .formatted_message
        .ends_with("--- SOP Document Content ---\nCheck policy number"));

    // Re-evaluating a completed record overwrites it without a new row.
    let again = state
        .evaluation()
        .submit("u1", request, Some(&draft.id))
        .await
        .unwrap();
    let rows = state.evaluation().list_rows("u1").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].automation_score, Some(json!(75)));
    assert_eq!(rows[0].status, RecordStatus::Completed);
    assert_eq!(state.evaluation().get("u1", &draft.id).unwrap(), again);
}
