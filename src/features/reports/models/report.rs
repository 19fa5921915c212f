use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Report status enum matching database enum.
///
/// Variants are declared in lifecycle order so `Ord` follows
/// `pending < investigating < resolved`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Investigating,
    Resolved,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Investigating => "investigating",
            ReportStatus::Resolved => "resolved",
        }
    }

    /// Same-state and forward moves are allowed, backward moves are not
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        next >= *self
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub incident_type: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: Option<String>,
    pub status: ReportStatus,
    /// Staff account that took the case
    pub authority_id: Option<Uuid>,
    pub authority_name: Option<String>,
    pub authority_contact: Option<String>,
    pub evidence_photo_url: Option<String>,
    /// Awaiting automatic classification
    pub ai_pending: bool,
    pub ai_dispatch: Option<Json<serde_json::Value>>,
    /// Authority proposed by dispatch
    pub notified_authority_id: Option<Uuid>,
    pub notification_mocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub user_id: Uuid,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub incident_type: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: Option<String>,
}

/// Fields written when staff take a case
#[derive(Debug, Clone)]
pub struct AssignReport {
    pub authority_id: Uuid,
    pub authority_name: String,
    pub authority_contact: Option<String>,
}

/// Fields written by a successful dispatch
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub classification: serde_json::Value,
    pub notified_authority_id: Uuid,
}
