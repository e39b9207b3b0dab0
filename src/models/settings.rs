//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `agent_api_key`.
pub const AGENT_API_KEY_ENV: &str = "AVAGAMA_AGENT_API_KEY";

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agent completions endpoint
    pub agent_api_url: String,
    /// Bearer token for the agent service
    #[serde(default)]
    pub agent_api_key: String,
    /// Agent that evaluates process descriptions
    pub process_agent_id: String,
    /// Agent that discovers use cases for a domain
    pub use_case_agent_id: String,
    /// Agent that discovers use cases for a company
    pub company_use_case_agent_id: String,
    /// Per-request timeout for agent calls, in seconds
    #[serde(default = "default_agent_timeout_secs")]
    pub agent_timeout_secs: u64,
    /// Completed evaluations allowed per owner
    #[serde(default = "default_evaluation_limit")]
    pub default_evaluation_limit: u32,
}

fn default_agent_timeout_secs() -> u64 {
    300
}

fn default_evaluation_limit() -> u32 {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_api_url: "https://api.mistral.ai/v1/agents/completions".to_string(),
            agent_api_key: String::new(),
            process_agent_id: String::new(),
            use_case_agent_id: String::new(),
            company_use_case_agent_id: String::new(),
            agent_timeout_secs: default_agent_timeout_secs(),
            default_evaluation_limit: default_evaluation_limit(),
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub agent_api_url: Option<String>,
    pub agent_api_key: Option<String>,
    pub process_agent_id: Option<String>,
    pub use_case_agent_id: Option<String>,
    pub company_use_case_agent_id: Option<String>,
    pub agent_timeout_secs: Option<u64>,
    pub default_evaluation_limit: Option<u32>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.agent_api_url {
            self.agent_api_url = url;
        }
        if let Some(key) = update.agent_api_key {
            self.agent_api_key = key;
        }
        if let Some(id) = update.process_agent_id {
            self.process_agent_id = id;
        }
        if let Some(id) = update.use_case_agent_id {
            self.use_case_agent_id = id;
        }
        if let Some(id) = update.company_use_case_agent_id {
            self.company_use_case_agent_id = id;
        }
        if let Some(timeout) = update.agent_timeout_secs {
            self.agent_timeout_secs = timeout;
        }
        if let Some(limit) = update.default_evaluation_limit {
            self.default_evaluation_limit = limit;
        }
    }

    /// Replace the API key with `AVAGAMA_AGENT_API_KEY` when it is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(AGENT_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.agent_api_key = key.trim().to_string();
            }
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.agent_api_url.starts_with("http://") || self.agent_api_url.starts_with("https://"))
        {
            return Err(format!(
                "Invalid agent_api_url: {}. Must start with http:// or https://",
                self.agent_api_url
            ));
        }

        if self.agent_timeout_secs == 0 || self.agent_timeout_secs > 600 {
            return Err("agent_timeout_secs must be between 1 and 600".to_string());
        }

        if self.default_evaluation_limit == 0 {
            return Err("default_evaluation_limit must be at least 1".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.agent_timeout_secs, 300);
        assert_eq!(config.default_evaluation_limit, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_update() {
        let mut config = AppConfig::default();
        config.apply_update(SettingsUpdate {
            use_case_agent_id: Some("ag:use-cases".to_string()),
            agent_timeout_secs: Some(60),
            ..Default::default()
        });
        assert_eq!(config.use_case_agent_id, "ag:use-cases");
        assert_eq!(config.agent_timeout_secs, 60);
        assert_eq!(config.default_evaluation_limit, 20);
    }

    #[test]
    fn test_validate_url() {
        let config = AppConfig {
            agent_api_url: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_timeout() {
        let config = AppConfig {
            agent_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let json = r#"{
            "agent_api_url": "https://agents.example.com/v1/completions",
            "process_agent_id": "p",
            "use_case_agent_id": "u",
            "company_use_case_agent_id": "c"
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.agent_timeout_secs, 300);
        assert!(config.agent_api_key.is_empty());
    }
}
