use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::ReportCounts;

/// Aggregate report statistics for the public dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportStatsDto {
    pub total_reports: i64,
    pub pending_reports: i64,
    pub investigating_reports: i64,
    pub resolved_reports: i64,
    /// Share of reports resolved, rounded to a whole percent
    pub resolved_percentage: i64,
    /// Registered accounts
    pub active_reporters: i64,
    /// Reports created in the last 7 days
    pub this_week_reports: i64,
}

impl ReportStatsDto {
    pub fn new(counts: ReportCounts, active_reporters: i64) -> Self {
        Self {
            total_reports: counts.total,
            pending_reports: counts.pending,
            investigating_reports: counts.investigating,
            resolved_reports: counts.resolved,
            resolved_percentage: resolved_percentage(counts.resolved, counts.total),
            active_reporters,
            this_week_reports: counts.created_since,
        }
    }
}

/// Rounded share of resolved reports; 0 when there are none
pub fn resolved_percentage(resolved: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (resolved as f64 * 100.0 / total as f64).round() as i64
}
