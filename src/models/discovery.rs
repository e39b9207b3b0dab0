//! Discovery Models
//!
//! Requests and persisted history records of use-case discovery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use avagama_core::{DiscoveryType, RecordStatus};
use avagama_normalize::NameList;

/// Discover use cases for a business domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRequest {
    pub domain: String,
    pub user_role: String,
    pub objective: String,
}

impl DomainRequest {
    /// Message sent to the domain discovery agent.
    pub fn agent_message(&self) -> String {
        format!(
            "domain: {},user_role: {},objective: {}",
            self.domain, self.user_role, self.objective
        )
    }
}

/// Discover use cases for a named company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRequest {
    pub company_name: String,
}

impl CompanyRequest {
    pub fn agent_message(&self) -> String {
        self.company_name.clone()
    }
}

/// One discovery call as stored in the owner's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub id: String,
    pub owner_id: String,
    pub discovery_type: DiscoveryType,
    /// The request as submitted
    pub input: Value,
    pub formatted_message: String,
    /// The agent's answer, or the canned fallback response
    pub agent_response: Value,
    /// Use-case names extracted from `agent_response`
    pub names: NameList,
    pub status: RecordStatus,
    /// `{"detail": "..."}` when the agent call failed
    pub agent_error: Option<Value>,
    pub created_at: DateTime<Utc>,
}
