//! Shared Tags
//!
//! Small enums persisted as strings by the application's storage layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Independent tracking namespace for discovered use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryType {
    /// Discovery by business domain, user role and objective
    Domain,
    /// Discovery by company name
    Company,
}

impl DiscoveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryType::Domain => "domain",
            DiscoveryType::Company => "company",
        }
    }
}

impl fmt::Display for DiscoveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DiscoveryType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(DiscoveryType::Domain),
            "company" => Ok(DiscoveryType::Company),
            other => Err(CoreError::parse(format!("unknown discovery type: {}", other))),
        }
    }
}

/// Outcome recorded on a persisted discovery or evaluation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordStatus {
    /// The agent answered and its response was stored
    Completed,
    /// The agent failed and a canned response was stored instead
    Fallback,
    /// Saved without calling the agent
    Draft,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Completed => "Completed",
            RecordStatus::Fallback => "Fallback",
            RecordStatus::Draft => "Draft",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(RecordStatus::Completed),
            "Fallback" => Ok(RecordStatus::Fallback),
            "Draft" => Ok(RecordStatus::Draft),
            other => Err(CoreError::parse(format!("unknown record status: {}", other))),
        }
    }
}
