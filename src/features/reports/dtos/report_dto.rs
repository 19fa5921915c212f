use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::reports::models::{Report, ReportStatus};
use crate::shared::constants::{is_image_type_allowed, ALLOWED_IMAGE_TYPES, MAX_PHOTO_SIZE};

/// Report fields collected from the multipart submission form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReportDto {
    #[validate(length(min = 1, max = 100, message = "Incident type must be 1-100 characters"))]
    pub incident_type: String,

    #[validate(length(min = 1, max = 5000, message = "Description must be 1-5000 characters"))]
    pub description: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,
}

/// OpenAPI shape of the report submission form.
/// The handler reads the multipart fields directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SubmitReportForm {
    #[schema(example = "Illegal dumping")]
    pub incident_type: String,
    pub description: String,
    #[schema(example = -6.2088)]
    pub latitude: f64,
    #[schema(example = 106.8456)]
    pub longitude: f64,
    /// Optional photo (JPEG, PNG, GIF or WebP, max 10MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub photo: Option<String>,
}

/// OpenAPI shape of the resolve form
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ResolveReportForm {
    /// Optional evidence photo (JPEG, PNG, GIF or WebP, max 10MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub evidence: Option<String>,
}

/// Image received in a multipart upload
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

impl PhotoUpload {
    /// Enforce the size limit and image type allow-list
    pub fn validate(&self) -> Result<(), AppError> {
        if self.data.is_empty() {
            return Err(AppError::BadRequest("Uploaded photo is empty".to_string()));
        }

        if self.data.len() > MAX_PHOTO_SIZE {
            return Err(AppError::BadRequest(format!(
                "Photo too large. Maximum size is {} MB",
                MAX_PHOTO_SIZE / 1024 / 1024
            )));
        }

        if !is_image_type_allowed(&self.content_type) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                self.content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }

        Ok(())
    }
}

/// Request DTO for the generic status override
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
}

/// Request DTO for taking a case
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignReportDto {
    /// Name shown to the reporter; defaults to the caller's name
    #[validate(length(min = 1, max = 100, message = "Authority name must be 1-100 characters"))]
    pub authority_name: Option<String>,

    /// Official phone number or email the reporter can use
    #[validate(length(min = 1, max = 200, message = "Contact must be 1-200 characters"))]
    pub authority_contact: String,
}

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
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
    pub authority_id: Option<Uuid>,
    pub authority_name: Option<String>,
    pub authority_contact: Option<String>,
    pub evidence_photo_url: Option<String>,
    /// True until automatic classification has run
    pub ai_pending: bool,
    /// Classifier output, `{department, urgency}`
    #[schema(value_type = Option<Object>)]
    pub ai_dispatch: Option<serde_json::Value>,
    pub notified_authority_id: Option<Uuid>,
    pub notification_mocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            reporter_name: r.reporter_name,
            reporter_email: r.reporter_email,
            incident_type: r.incident_type,
            description: r.description,
            latitude: r.latitude,
            longitude: r.longitude,
            photo_url: r.photo_url,
            status: r.status,
            authority_id: r.authority_id,
            authority_name: r.authority_name,
            authority_contact: r.authority_contact,
            evidence_photo_url: r.evidence_photo_url,
            ai_pending: r.ai_pending,
            ai_dispatch: r.ai_dispatch.map(|j| j.0),
            notified_authority_id: r.notified_authority_id,
            notification_mocked: r.notification_mocked,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(lat: f64, lng: f64) -> CreateReportDto {
        CreateReportDto {
            incident_type: "Fire".to_string(),
            description: "Smoke near the market".to_string(),
            latitude: lat,
            longitude: lng,
        }
    }

    #[test]
    fn test_create_report_coordinates() {
        assert!(dto(-6.2, 106.8).validate().is_ok());
        assert!(dto(90.0, -180.0).validate().is_ok());
        assert!(dto(91.0, 0.0).validate().is_err());
        assert!(dto(0.0, 180.5).validate().is_err());
    }

    #[test]
    fn test_create_report_requires_description() {
        let mut d = dto(0.0, 0.0);
        d.description = String::new();
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_photo_upload_rules() {
        let photo = |data: Vec<u8>, ct: &str| PhotoUpload {
            data,
            file_name: "a.png".to_string(),
            content_type: ct.to_string(),
        };

        assert!(photo(vec![1, 2, 3], "image/png").validate().is_ok());
        assert!(photo(vec![], "image/png").validate().is_err());
        assert!(photo(vec![1], "application/pdf").validate().is_err());
        assert!(photo(vec![0; MAX_PHOTO_SIZE + 1], "image/jpeg")
            .validate()
            .is_err());
    }

    #[test]
    fn test_assign_requires_contact() {
        let dto = AssignReportDto {
            authority_name: None,
            authority_contact: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
