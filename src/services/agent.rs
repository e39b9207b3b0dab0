//! Agent Client
//!
//! HTTP collaborator for the external agent completions service. The
//! service answers with a completion-shaped JSON document; callers hand
//! that document to the normalization engine as-is.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};

/// A service that runs a named agent on a single user message.
#[async_trait]
pub trait AgentClient: Send + Sync {
    async fn call_agent(&self, agent_id: &str, content: &str) -> AppResult<Value>;
}

#[derive(Debug, Serialize)]
struct AgentMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct AgentRequest<'a> {
    agent_id: &'a str,
    messages: [AgentMessage<'a>; 1],
}

/// Agent client backed by the configured completions endpoint
pub struct HttpAgentClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpAgentClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Build a client from the effective configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.agent_api_url.clone(),
            config.agent_api_key.clone(),
            Duration::from_secs(config.agent_timeout_secs),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn call_agent(&self, agent_id: &str, content: &str) -> AppResult<Value> {
        let body = AgentRequest {
            agent_id,
            messages: [AgentMessage {
                role: "user",
                content,
            }],
        };

        tracing::debug!(agent_id, "Calling agent at {}", self.api_url);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::timeout("Agent request timed out")
                } else {
                    AppError::agent(format!("Agent request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::timeout("Agent request timed out")
            } else {
                AppError::agent(format!("Failed to read agent response: {}", e))
            }
        })?;

        if !status.is_success() {
            tracing::warn!(agent_id, status = status.as_u16(), "Agent returned an error status");
            return Err(AppError::agent(format!(
                "Agent API error ({}): {}",
                status.as_u16(),
                body_text
            )));
        }

        serde_json::from_str(&body_text)
            .map_err(|e| AppError::agent(format!("Failed to parse agent response: {}", e)))
    }
}
