use sqlx::FromRow;

/// Report counts backing the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromRow)]
pub struct ReportCounts {
    pub total: i64,
    pub pending: i64,
    pub investigating: i64,
    pub resolved: i64,
    /// Reports created at or after the requested cutoff
    pub created_since: i64,
}
