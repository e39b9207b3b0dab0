//! Dashboard Models

use serde::{Deserialize, Serialize};

/// Evaluations per day, with the day's average automation score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD` (UTC)
    pub date: String,
    pub count: usize,
    pub avg_score: f64,
}

/// How many evaluations recommend a given technology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyCount {
    pub technology: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// All of the owner's evaluations, regardless of the date range
    pub total_evaluations: usize,
    pub evaluations_in_range: usize,
    /// Rounded to one decimal; 0 when no evaluation in range has a score
    pub average_automation_score: f64,
    pub date_range_days: u32,
    pub evaluation_trend: Vec<TrendPoint>,
    pub technology_distribution: Vec<TechnologyCount>,
}
