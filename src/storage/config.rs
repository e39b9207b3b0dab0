//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_avagama_dir, ensure_dir};

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Open the config at ~/.avagama/config.json, creating defaults if missing
    pub fn new() -> AppResult<Self> {
        ensure_avagama_dir()?;
        Self::open(config_path()?)
    }

    /// Open the config at `path`, creating defaults if missing
    pub fn open(config_path: PathBuf) -> AppResult<Self> {
        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            if let Some(parent) = config_path.parent() {
                ensure_dir(parent)?;
            }
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            info!(path = %config_path.display(), "created default configuration");
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Current configuration with environment overrides applied.
    ///
    /// Overrides are never written back to disk.
    pub fn effective_config(&self) -> AppConfig {
        self.config.clone().with_env_overrides()
    }

    /// Update the configuration with a partial update
    pub fn update_config(&mut self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut updated = self.config.clone();
        updated.apply_update(update);
        Self::save_to_file(&self.config_path, &updated)?;
        self.config = updated;
        Ok(self.config.clone())
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.config)
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> AppResult<()> {
        self.config = Self::load_from_file(&self.config_path)?;
        Ok(())
    }

    /// Reset configuration to defaults
    pub fn reset(&mut self) -> AppResult<()> {
        self.config = AppConfig::default();
        self.save()?;
        Ok(())
    }
}
