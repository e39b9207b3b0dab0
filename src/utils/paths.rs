//! Path Utilities
//!
//! Resolves the application's data directory (~/.avagama/) and the files in it.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Avagama directory (~/.avagama/)
pub fn avagama_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".avagama"))
}

/// Get the config file path (~/.avagama/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(avagama_dir()?.join("config.json"))
}

/// Get the database file path (~/.avagama/data.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(avagama_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Avagama directory, creating if it doesn't exist
pub fn ensure_avagama_dir() -> AppResult<PathBuf> {
    let path = avagama_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
