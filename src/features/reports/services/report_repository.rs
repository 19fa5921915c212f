use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    AssignReport, CreateReport, DispatchResult, Report, ReportCounts, ReportStatus,
};
use crate::shared::constants::POINTS_PER_REPORT;

const REPORT_COLUMNS: &str = "id, user_id, reporter_name, reporter_email, incident_type, \
     description, latitude, longitude, photo_url, status, authority_id, authority_name, \
     authority_contact, evidence_photo_url, ai_pending, ai_dispatch, notified_authority_id, \
     notification_mocked, created_at, updated_at";

/// Persistence for reports
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a pending report awaiting dispatch and credit the reporter,
    /// atomically
    async fn create(&self, data: &CreateReport) -> Result<Report>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    /// Newest first
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Report>>;

    /// Newest first
    async fn list_all(&self) -> Result<Vec<Report>>;

    /// Oldest reports still awaiting dispatch
    async fn list_awaiting_dispatch(&self, limit: i64) -> Result<Vec<Uuid>>;

    /// Set the status unless the stored one is already further along.
    /// `None` when the report is missing or the move would go backwards.
    async fn set_status(&self, id: Uuid, status: ReportStatus) -> Result<Option<Report>>;

    /// Move to `investigating` and record who took the case
    async fn assign(&self, id: Uuid, data: &AssignReport) -> Result<Option<Report>>;

    /// Move to `resolved`, replacing the evidence reference
    async fn resolve(&self, id: Uuid, evidence_photo_url: Option<&str>) -> Result<Option<Report>>;

    /// Store a dispatch result only while the report is still awaiting one.
    /// Returns false when the flag was already cleared.
    async fn apply_dispatch(&self, id: Uuid, result: &DispatchResult) -> Result<bool>;

    async fn counts(&self, since: DateTime<Utc>) -> Result<ReportCounts>;
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn create(&self, data: &CreateReport) -> Result<Report> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin report transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            INSERT INTO reports (
                id, user_id, reporter_name, reporter_email, incident_type,
                description, latitude, longitude, photo_url, status, ai_pending
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', TRUE)
            RETURNING {REPORT_COLUMNS}
            "#
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(Uuid::now_v7())
            .bind(data.user_id)
            .bind(&data.reporter_name)
            .bind(&data.reporter_email)
            .bind(&data.incident_type)
            .bind(&data.description)
            .bind(data.latitude)
            .bind(data.longitude)
            .bind(&data.photo_url)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert report: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query(
            r#"
            UPDATE users
            SET total_reports = total_reports + 1, points = points + $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(data.user_id)
        .bind(POINTS_PER_REPORT)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to credit reporter: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report transaction: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(report)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE user_id = $1 ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list user reports: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_all(&self) -> Result<Vec<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC");

        sqlx::query_as::<_, Report>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_awaiting_dispatch(&self, limit: i64) -> Result<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM reports WHERE ai_pending = TRUE ORDER BY created_at ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list reports awaiting dispatch: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn set_status(&self, id: Uuid, status: ReportStatus) -> Result<Option<Report>> {
        let sql = format!(
            r#"
            UPDATE reports SET status = $2, updated_at = NOW()
            WHERE id = $1 AND status <= $2
            RETURNING {REPORT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report status: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn assign(&self, id: Uuid, data: &AssignReport) -> Result<Option<Report>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET status = 'investigating', authority_id = $2, authority_name = $3,
                authority_contact = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(data.authority_id)
            .bind(&data.authority_name)
            .bind(&data.authority_contact)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn resolve(&self, id: Uuid, evidence_photo_url: Option<&str>) -> Result<Option<Report>> {
        let sql = format!(
            r#"
            UPDATE reports
            SET status = 'resolved', evidence_photo_url = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(evidence_photo_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn apply_dispatch(&self, id: Uuid, result: &DispatchResult) -> Result<bool> {
        let outcome = sqlx::query(
            r#"
            UPDATE reports
            SET ai_pending = FALSE, ai_dispatch = $2, notified_authority_id = $3,
                notification_mocked = TRUE, updated_at = NOW()
            WHERE id = $1 AND ai_pending = TRUE
            "#,
        )
        .bind(id)
        .bind(Json(&result.classification))
        .bind(result.notified_authority_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store dispatch result: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(outcome.rows_affected() == 1)
    }

    async fn counts(&self, since: DateTime<Utc>) -> Result<ReportCounts> {
        sqlx::query_as::<_, ReportCounts>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'investigating') AS investigating,
                COUNT(*) FILTER (WHERE status = 'resolved') AS resolved,
                COUNT(*) FILTER (WHERE created_at >= $1) AS created_since
            FROM reports
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count reports: {:?}", e);
            AppError::Database(e)
        })
    }
}
