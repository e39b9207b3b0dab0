//! Dashboard Aggregation
//!
//! Statistics over an owner's evaluations: average automation score,
//! per-day trend and the distribution of recommended technologies.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use avagama_normalize::ContentResult;

use crate::models::dashboard::{DashboardSummary, TechnologyCount, TrendPoint};
use crate::models::evaluation::EvaluationRecord;

/// Default dashboard window, in days
pub const DEFAULT_RANGE_DAYS: u32 = 30;

/// Numeric `automation_feasibility_score` of parsed content
pub fn score_from_content(content: Option<&ContentResult>) -> Option<f64> {
    content?
        .get("automation_feasibility_score")
        .filter(|value| value.is_number())
        .and_then(|value| value.as_f64())
}

/// Trimmed, non-empty `fitment` of parsed content
pub fn fitment_from_content(content: Option<&ContentResult>) -> Option<String> {
    let fitment = content?.get("fitment")?.as_str()?.trim();
    if fitment.is_empty() {
        None
    } else {
        Some(fitment.to_string())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        round1(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Summarize the evaluations created within `days` of `now`.
///
/// `total_evaluations` counts every record regardless of the window.
pub fn summarize_dashboard(
    records: &[EvaluationRecord],
    days: u32,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let cutoff = now - Duration::days(i64::from(days));

    let mut in_range = 0;
    let mut scores = Vec::new();
    let mut trend: BTreeMap<String, (usize, Vec<f64>)> = BTreeMap::new();
    let mut technologies: Vec<TechnologyCount> = Vec::new();

    for record in records.iter().filter(|r| r.created_at >= cutoff) {
        in_range += 1;
        let content = record.parsed_content.as_ref();
        let score = score_from_content(content);

        let day = trend
            .entry(record.created_at.format("%Y-%m-%d").to_string())
            .or_default();
        day.0 += 1;
        if let Some(score) = score {
            scores.push(score);
            day.1.push(score);
        }

        if let Some(fitment) = fitment_from_content(content) {
            match technologies.iter_mut().find(|t| t.technology == fitment) {
                Some(entry) => entry.count += 1,
                None => technologies.push(TechnologyCount {
                    technology: fitment,
                    count: 1,
                }),
            }
        }
    }

    technologies.sort_by(|a, b| b.count.cmp(&a.count));

    DashboardSummary {
        total_evaluations: records.len(),
        evaluations_in_range: in_range,
        average_automation_score: average(&scores),
        date_range_days: days,
        evaluation_trend: trend
            .into_iter()
            .map(|(date, (count, day_scores))| TrendPoint {
                date,
                count,
                avg_score: average(&day_scores),
            })
            .collect(),
        technology_distribution: technologies,
    }
}
