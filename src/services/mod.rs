//! Services
//!
//! Business logic services for the application.
//! Services sit between the agent collaborator, the normalization engine
//! and storage.

pub mod agent;
pub mod dashboard;
pub mod discovery;
pub mod evaluation;
pub mod tracking;

pub use agent::{AgentClient, HttpAgentClient};
pub use dashboard::{fitment_from_content, score_from_content, summarize_dashboard};
pub use discovery::{fallback_company_use_cases, fallback_domain_use_cases, DiscoveryService};
pub use evaluation::EvaluationService;
pub use tracking::{
    merge_discovered_names, InMemoryTrackingStore, SqliteTrackingStore, TrackingStore,
};
