use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{AssignReportDto, CreateReportDto, PhotoUpload};
use crate::features::reports::models::{AssignReport, CreateReport, Report, ReportStatus};
use crate::features::reports::services::{ReportEventBus, ReportRepository};
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::ANONYMOUS_NAME;
use crate::shared::validation::sanitize_filename;

/// Report submission, listing and lifecycle operations
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    storage: Arc<dyn ObjectStorage>,
    events: Arc<ReportEventBus>,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        storage: Arc<dyn ObjectStorage>,
        events: Arc<ReportEventBus>,
    ) -> Self {
        Self {
            reports,
            storage,
            events,
        }
    }

    /// Store a new report (photo first, if any) and queue it for dispatch
    pub async fn submit(
        &self,
        user: &AuthenticatedUser,
        dto: CreateReportDto,
        photo: Option<PhotoUpload>,
    ) -> Result<Report> {
        let photo_url = match photo {
            Some(photo) => Some(self.upload(report_photo_path(&photo.file_name), photo).await?),
            None => None,
        };

        let reporter_name = user
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_NAME)
            .to_string();

        let report = self
            .reports
            .create(&CreateReport {
                user_id: user.user_id,
                reporter_name: Some(reporter_name),
                reporter_email: Some(user.email.clone()),
                incident_type: dto.incident_type.trim().to_string(),
                description: dto.description.trim().to_string(),
                latitude: dto.latitude,
                longitude: dto.longitude,
                photo_url,
            })
            .await?;

        tracing::info!("Report {} submitted by user {}", report.id, user.user_id);
        self.events.publish_created(report.id);
        Ok(report)
    }

    pub async fn list_mine(&self, user: &AuthenticatedUser) -> Result<Vec<Report>> {
        self.reports.list_by_user(user.user_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<Report>> {
        self.reports.list_all().await
    }

    /// Visible to its reporter and to authority staff
    pub async fn get(&self, id: Uuid, user: &AuthenticatedUser) -> Result<Report> {
        let report = self.find(id).await?;

        if report.user_id != user.user_id && !user.is_authority() {
            return Err(not_found(id));
        }

        Ok(report)
    }

    /// Generic status override; backward moves are rejected
    pub async fn update_status(&self, id: Uuid, status: ReportStatus) -> Result<Report> {
        let current = self.find(id).await?;

        if !current.status.can_transition_to(status) {
            return Err(backward_move(current.status, status));
        }

        let Some(report) = self.reports.set_status(id, status).await? else {
            // Moved past `status` after the read
            let latest = self.find(id).await?;
            return Err(backward_move(latest.status, status));
        };

        tracing::info!("Report {} status {} -> {}", id, current.status, status);
        self.events.publish_updated(id);
        Ok(report)
    }

    /// Take a case: status becomes `investigating` with the caller recorded.
    /// The current status is not checked.
    pub async fn assign(
        &self,
        id: Uuid,
        user: &AuthenticatedUser,
        dto: AssignReportDto,
    ) -> Result<Report> {
        let authority_name = dto
            .authority_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| user.display_name());

        let report = self
            .reports
            .assign(
                id,
                &AssignReport {
                    authority_id: user.user_id,
                    authority_name,
                    authority_contact: Some(dto.authority_contact.trim().to_string()),
                },
            )
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!("Report {} assigned to {}", id, user.user_id);
        self.events.publish_updated(id);
        Ok(report)
    }

    /// Mark resolved, uploading the evidence photo first when given.
    /// The current status is not checked.
    pub async fn resolve(&self, id: Uuid, evidence: Option<PhotoUpload>) -> Result<Report> {
        // Avoid orphaned uploads for unknown reports
        self.find(id).await?;

        let evidence_url = match evidence {
            Some(photo) => Some(
                self.upload(evidence_photo_path(id, &photo.file_name), photo)
                    .await?,
            ),
            None => None,
        };

        let report = self
            .reports
            .resolve(id, evidence_url.as_deref())
            .await?
            .ok_or_else(|| not_found(id))?;

        tracing::info!("Report {} resolved", id);
        self.events.publish_updated(id);
        Ok(report)
    }

    async fn find(&self, id: Uuid) -> Result<Report> {
        self.reports
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn upload(&self, path: String, photo: PhotoUpload) -> Result<String> {
        self.storage
            .put_public(&path, photo.data, &photo.content_type)
            .await
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Report {} not found", id))
}

fn backward_move(from: ReportStatus, to: ReportStatus) -> AppError {
    AppError::Conflict(format!("Cannot move report from {} back to {}", from, to))
}

/// `reports/{millis}_{token}_{filename}`
fn report_photo_path(file_name: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!(
        "reports/{}_{}_{}",
        Utc::now().timestamp_millis(),
        &token[..8],
        sanitize_filename(file_name)
    )
}

/// `evidence/{report_id}_{millis}_{filename}`
fn evidence_photo_path(report_id: Uuid, file_name: &str) -> String {
    format!(
        "evidence/{}_{}_{}",
        report_id,
        Utc::now().timestamp_millis(),
        sanitize_filename(file_name)
    )
}
