//! Use-Case Discovery
//!
//! Domain and company discovery flows. Each call asks an agent for use
//! cases, stores the answer with the extracted names in the owner's
//! history, and merges the names into the owner's tracking set. An agent
//! failure does not fail the call: a canned response is stored instead.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};

use avagama_core::{DiscoveryType, RecordStatus};
use avagama_normalize::{normalize_use_case_names, NameList};

use crate::models::discovery::{CompanyRequest, DiscoveryRecord, DomainRequest};
use crate::models::settings::AppConfig;
use crate::services::agent::AgentClient;
use crate::services::tracking::{merge_discovered_names, TrackingStore};
use crate::storage::database::Database;
use crate::utils::error::AppResult;

/// Canned domain use cases, used when the agent is unavailable
pub fn fallback_domain_use_cases(request: &DomainRequest) -> Value {
    let domain = non_blank(&request.domain, "General");
    let objective = non_blank(&request.objective, "Improve operations").to_lowercase();
    json!({
        "use_cases": [
            {
                "title": format!("Automated {} Fraud Detection and Prevention", domain),
                "rating": 10,
                "description": format!(
                    "AI can analyze transaction patterns in real-time for {}, flag anomalies, and support {} across teams.",
                    domain, objective
                ),
            },
            {"title": "Intelligent Customer Support Chatbots", "rating": 9, "description": "Conversational AI for routine support workflows."},
            {"title": "Automated Compliance and Regulatory Reporting", "rating": 8, "description": "Automates extraction and reporting for compliance requirements."},
            {"title": "Predictive Analytics for Risk Management", "rating": 8, "description": "Forecast risk events and trigger proactive interventions."},
            {"title": "Automated Loan Processing and Underwriting", "rating": 7, "description": "Streamline intake and underwriting decisions."},
        ]
    })
}

/// Canned company use cases, used when the agent is unavailable
pub fn fallback_company_use_cases(request: &CompanyRequest) -> Value {
    let company = non_blank(&request.company_name, "the company");
    json!({
        "use_cases": [
            {
                "title": "Automated Document Processing for Compliance",
                "domain": "Finance",
                "rating": 9,
                "description": format!("Agentic AI can automate compliance document workflows for {}.", company),
            },
            {"title": "Intelligent Customer Support Chatbots", "domain": "Customer Service", "rating": 8, "description": "Resolve L1 support with AI assistants."},
            {"title": "Fraud Detection and Prevention", "domain": "Finance", "rating": 9, "description": "Monitor suspicious patterns across channels."},
            {"title": "Automated Risk Assessment", "domain": "Finance", "rating": 8, "description": "Risk scoring automation for faster reviews."},
            {"title": "Personalized Marketing Campaigns", "domain": "Marketing", "rating": 7, "description": "AI-driven campaign targeting and personalization."},
        ]
    })
}

fn non_blank<'a>(value: &'a str, default: &'a str) -> &'a str {
    match value.trim() {
        "" => default,
        trimmed => trimmed,
    }
}

/// Runs discovery calls and owns their history
pub struct DiscoveryService {
    config: AppConfig,
    agent: Arc<dyn AgentClient>,
    db: Database,
    tracking: Arc<dyn TrackingStore>,
}

impl DiscoveryService {
    pub fn new(
        config: AppConfig,
        agent: Arc<dyn AgentClient>,
        db: Database,
        tracking: Arc<dyn TrackingStore>,
    ) -> Self {
        Self {
            config,
            agent,
            db,
            tracking,
        }
    }

    /// Discover use cases for a business domain
    pub async fn discover_domain(
        &self,
        owner_id: &str,
        request: &DomainRequest,
    ) -> AppResult<DiscoveryRecord> {
        self.discover(
            owner_id,
            DiscoveryType::Domain,
            serde_json::to_value(request)?,
            request.agent_message(),
            &self.config.use_case_agent_id,
            || fallback_domain_use_cases(request),
        )
        .await
    }

    /// Discover use cases for a named company
    pub async fn discover_company(
        &self,
        owner_id: &str,
        request: &CompanyRequest,
    ) -> AppResult<DiscoveryRecord> {
        self.discover(
            owner_id,
            DiscoveryType::Company,
            serde_json::to_value(request)?,
            request.agent_message(),
            &self.config.company_use_case_agent_id,
            || fallback_company_use_cases(request),
        )
        .await
    }

    async fn discover(
        &self,
        owner_id: &str,
        discovery_type: DiscoveryType,
        input: Value,
        message: String,
        agent_id: &str,
        fallback: impl FnOnce() -> Value,
    ) -> AppResult<DiscoveryRecord> {
        let (agent_response, status, agent_error) =
            match self.agent.call_agent(agent_id, &message).await {
                Ok(response) => (response, RecordStatus::Completed, None),
                Err(e) => {
                    tracing::warn!(
                        discovery_type = discovery_type.as_str(),
                        "Agent call failed, using fallback use cases: {}",
                        e
                    );
                    (
                        fallback(),
                        RecordStatus::Fallback,
                        Some(json!({ "detail": e.to_string() })),
                    )
                }
            };

        let names = normalize_use_case_names(&agent_response);
        let record = DiscoveryRecord {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            discovery_type,
            input,
            formatted_message: message,
            agent_response,
            names,
            status,
            agent_error,
            created_at: Utc::now(),
        };

        self.db.insert_discovery(&record)?;
        merge_discovered_names(self.tracking.as_ref(), owner_id, discovery_type, &record.names)?;

        tracing::info!(
            discovery_type = discovery_type.as_str(),
            status = record.status.as_str(),
            names = record.names.len(),
            "Stored discovery {}",
            record.id
        );
        Ok(record)
    }

    /// The owner's discovery history of one type, newest first
    pub fn history(
        &self,
        owner_id: &str,
        discovery_type: DiscoveryType,
    ) -> AppResult<Vec<DiscoveryRecord>> {
        self.db.list_discoveries(owner_id, discovery_type)
    }

    /// Every use-case name the owner has discovered for one type
    pub fn tracked_names(&self, owner_id: &str, discovery_type: DiscoveryType) -> AppResult<NameList> {
        self.tracking.members(owner_id, discovery_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tracking::InMemoryTrackingStore;
    use crate::utils::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned results and records the calls it received.
    struct ScriptedAgent {
        responses: Mutex<Vec<AppResult<Value>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedAgent {
        fn new(responses: Vec<AppResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AgentClient for ScriptedAgent {
        async fn call_agent(&self, agent_id: &str, content: &str) -> AppResult<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((agent_id.to_string(), content.to_string()));
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn config() -> AppConfig {
        AppConfig {
            use_case_agent_id: "ag:domain".to_string(),
            company_use_case_agent_id: "ag:company".to_string(),
            ..Default::default()
        }
    }

    fn service(agent: Arc<ScriptedAgent>) -> DiscoveryService {
        DiscoveryService::new(
            config(),
            agent,
            Database::new_in_memory().unwrap(),
            Arc::new(InMemoryTrackingStore::new()),
        )
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn test_company_discovery_from_fenced_completion() {
        let agent = ScriptedAgent::new(vec![Ok(completion(
            "```json\n{\"company_name\": \"Acme\", \"use_cases\": [{\"title\": \"Invoice OCR\"}, {\"title\": \"Churn alerts\"}]}\n```",
        ))]);
        let service = service(agent.clone());

        let record = service
            .discover_company(
                "u1",
                &CompanyRequest {
                    company_name: "Acme".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.status, RecordStatus::Completed);
        assert_eq!(record.agent_error, None);
        assert_eq!(record.names.as_slice(), ["Invoice OCR", "Churn alerts"]);
        assert_eq!(
            agent.calls.lock().unwrap().as_slice(),
            [("ag:company".to_string(), "Acme".to_string())]
        );

        let history = service.history("u1", DiscoveryType::Company).unwrap();
        assert_eq!(history, vec![record]);
    }

    #[tokio::test]
    async fn test_domain_discovery_falls_back_on_agent_error() {
        let agent = ScriptedAgent::new(vec![Err(AppError::timeout("Agent request timed out"))]);
        let service = service(agent.clone());

        let record = service
            .discover_domain(
                "u1",
                &DomainRequest {
                    domain: "Banking".to_string(),
                    user_role: "COO".to_string(),
                    objective: "Cut Costs".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(record.status, RecordStatus::Fallback);
        assert_eq!(
            record.agent_error,
            Some(json!({"detail": "Timeout: Agent request timed out"}))
        );
        assert_eq!(record.names.len(), 5);
        assert_eq!(record.names.as_slice()[0], "Automated Banking Fraud Detection and Prevention");
        assert_eq!(
            record.formatted_message,
            "domain: Banking,user_role: COO,objective: Cut Costs"
        );
        assert_eq!(agent.calls.lock().unwrap()[0].0, "ag:domain");
        assert_eq!(
            service.tracked_names("u1", DiscoveryType::Domain).unwrap(),
            record.names
        );
    }

    #[tokio::test]
    async fn test_tracking_accumulates_across_calls() {
        let agent = ScriptedAgent::new(vec![
            Ok(json!({"use_cases": [{"title": "A"}, {"title": "B"}]})),
            Ok(json!([{"name": "B"}, {"use_case": "C"}])),
            Ok(json!({"unexpected": true})),
        ]);
        let service = service(agent);
        let request = CompanyRequest {
            company_name: "Acme".to_string(),
        };

        service.discover_company("u1", &request).await.unwrap();
        service.discover_company("u1", &request).await.unwrap();
        let empty = service.discover_company("u1", &request).await.unwrap();
        assert!(empty.names.is_empty());
        assert_eq!(empty.status, RecordStatus::Completed);

        let tracked = service.tracked_names("u1", DiscoveryType::Company).unwrap();
        assert_eq!(tracked.as_slice(), ["A", "B", "C"]);
        assert!(service
            .tracked_names("u1", DiscoveryType::Domain)
            .unwrap()
            .is_empty());
        assert_eq!(service.history("u1", DiscoveryType::Company).unwrap().len(), 3);
    }

    #[test]
    fn test_fallback_defaults_for_blank_input() {
        let domain = fallback_domain_use_cases(&DomainRequest {
            domain: "  ".to_string(),
            user_role: String::new(),
            objective: String::new(),
        });
        assert_eq!(
            domain["use_cases"][0]["title"],
            "Automated General Fraud Detection and Prevention"
        );
        assert!(domain["use_cases"][0]["description"]
            .as_str()
            .unwrap()
            .contains("support improve operations across teams"));

        let company = fallback_company_use_cases(&CompanyRequest {
            company_name: String::new(),
        });
        assert_eq!(
            company["use_cases"][0]["description"],
            "Agentic AI can automate compliance document workflows for the company."
        );
    }
}
