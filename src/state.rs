//! Application State
//!
//! Wires configuration, storage, the agent client and the services that
//! use them.

use std::sync::Arc;

use crate::models::settings::AppConfig;
use crate::services::agent::{AgentClient, HttpAgentClient};
use crate::services::discovery::DiscoveryService;
use crate::services::evaluation::EvaluationService;
use crate::services::tracking::{SqliteTrackingStore, TrackingStore};
use crate::storage::{ConfigService, Database};
use crate::utils::error::AppResult;

/// Application state shared by every entry point
pub struct AppState {
    discovery: DiscoveryService,
    evaluation: EvaluationService,
}

impl AppState {
    /// Open ~/.avagama/config.json and ~/.avagama/data.db and build services
    pub fn initialize() -> AppResult<Self> {
        let config = ConfigService::new()?.effective_config();
        let database = Database::new()?;
        let agent: Arc<dyn AgentClient> = Arc::new(HttpAgentClient::from_config(&config));
        Ok(Self::with_parts(config, database, agent))
    }

    /// Build the state from explicit parts, tracking sets in `database`
    pub fn with_parts(config: AppConfig, database: Database, agent: Arc<dyn AgentClient>) -> Self {
        let tracking: Arc<dyn TrackingStore> = Arc::new(SqliteTrackingStore::new(database.clone()));
        Self::with_tracking(config, database, agent, tracking)
    }

    /// Build the state with a separate tracking store
    pub fn with_tracking(
        config: AppConfig,
        database: Database,
        agent: Arc<dyn AgentClient>,
        tracking: Arc<dyn TrackingStore>,
    ) -> Self {
        let discovery = DiscoveryService::new(
            config.clone(),
            Arc::clone(&agent),
            database.clone(),
            tracking,
        );
        let evaluation = EvaluationService::new(config, agent, database);

        Self {
            discovery,
            evaluation,
        }
    }

    pub fn discovery(&self) -> &DiscoveryService {
        &self.discovery
    }

    pub fn evaluation(&self) -> &EvaluationService {
        &self.evaluation
    }
}
