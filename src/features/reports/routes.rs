use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Report routes (auth middleware applied by caller)
pub fn routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/api/reports",
            post(handlers::submit_report).get(handlers::list_all_reports),
        )
        .route("/api/reports/mine", get(handlers::list_my_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .route("/api/reports/{id}/assign", post(handlers::assign_report))
        .route("/api/reports/{id}/resolve", post(handlers::resolve_report))
        .with_state(service)
}
