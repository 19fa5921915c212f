use std::sync::Arc;

use axum::{
    extract::{multipart::Field, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAuthority;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    AssignReportDto, CreateReportDto, PhotoUpload, ReportResponseDto, ResolveReportForm,
    SubmitReportForm, UpdateReportStatusDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::types::ApiResponse;

/// Submit a new incident report
///
/// Accepts multipart/form-data with:
/// - `incident_type`, `description`, `latitude`, `longitude` (required)
/// - `photo`: optional image
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body(
        content = SubmitReportForm,
        content_type = "multipart/form-data",
        description = "Report form with an optional photo",
    ),
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid form or photo"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "Request too large")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn submit_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let mut incident_type: Option<String> = None;
    let mut description: Option<String> = None;
    let mut latitude: Option<f64> = None;
    let mut longitude: Option<f64> = None;
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "incident_type" => incident_type = Some(read_text(field, "incident_type").await?),
            "description" => description = Some(read_text(field, "description").await?),
            "latitude" => latitude = Some(read_coordinate(field, "latitude").await?),
            "longitude" => longitude = Some(read_coordinate(field, "longitude").await?),
            "photo" => photo = read_photo(field).await?,
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let dto = CreateReportDto {
        incident_type: required(incident_type, "incident_type")?,
        description: required(description, "description")?,
        latitude: required(latitude, "latitude")?,
        longitude: required(longitude, "longitude")?,
    };
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.submit(&user, dto, photo).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(report.into()),
            Some("Report submitted".to_string()),
            None,
        )),
    ))
}

/// List the caller's own reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports/mine",
    responses(
        (status = 200, description = "Caller's reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_my_reports(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_mine(&user).await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// List all reports, newest first (authority only)
#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "All reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Authority access required")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_all_reports(
    RequireAuthority(_user): RequireAuthority,
    State(service): State<Arc<ReportService>>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let reports = service.list_all().await?;
    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(|r| r.into()).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get a report by ID (reporter or authority)
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get(id, &user).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Override report status (authority only)
///
/// Moving a report back to an earlier status is rejected.
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Authority access required"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Backward status transition")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    RequireAuthority(_user): RequireAuthority,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.update_status(id, dto.status).await?;
    Ok(Json(ApiResponse::success(Some(report.into()), None, None)))
}

/// Take a case (authority only)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/assign",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = AssignReportDto,
    responses(
        (status = 200, description = "Case assigned", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Authority access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn assign_report(
    RequireAuthority(user): RequireAuthority,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let report = service.assign(id, &user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Case assigned".to_string()),
        None,
    )))
}

/// Resolve a report with optional photo evidence (authority only)
#[utoipa::path(
    post,
    path = "/api/reports/{id}/resolve",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body(
        content = ResolveReportForm,
        content_type = "multipart/form-data",
        description = "Optional evidence photo",
    ),
    responses(
        (status = 200, description = "Report resolved", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Invalid photo"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Authority access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn resolve_report(
    RequireAuthority(_user): RequireAuthority,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let mut evidence: Option<PhotoUpload> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "evidence" => evidence = read_photo(field).await?,
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let report = service.resolve(id, evidence).await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report resolved".to_string()),
        None,
    )))
}

async fn next_field(multipart: &mut Multipart) -> Result<Option<Field<'_>>> {
    multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })
}

async fn read_text(field: Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

async fn read_coordinate(field: Field<'_>, name: &str) -> Result<f64> {
    let text = read_text(field, name).await?;
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::Validation(format!("{} must be a number", name)))
}

/// An empty file input is treated as no photo
async fn read_photo(field: Field<'_>) -> Result<Option<PhotoUpload>> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "photo".to_string());

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read file bytes: {}", e);
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })?;

    if data.is_empty() {
        return Ok(None);
    }

    let photo = PhotoUpload {
        data: data.to_vec(),
        file_name,
        content_type,
    };
    photo.validate()?;
    Ok(Some(photo))
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| AppError::Validation(format!("{} is required", name)))
}
