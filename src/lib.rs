//! Avagama Backend Library
//!
//! Backend of the process automation assessment tool. It includes:
//! - Agent collaborator for the external completions service
//! - Discovery and evaluation services built on the normalization engine
//!   (`avagama-normalize`)
//! - Storage layer (SQLite, Config)
//! - Data models and utilities

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};

pub use avagama_core::{DiscoveryType, RecordStatus};
pub use avagama_normalize::{ContentResult, NameList, UseCaseSummary};
