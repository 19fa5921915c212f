use axum::{routing::get, Router};
use std::sync::Arc;

use crate::features::dashboard::handlers;
use crate::features::dashboard::services::DashboardService;

/// Public dashboard routes; optional auth applied by caller
pub fn routes(dashboard_service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/api/dashboard/stats", get(handlers::get_stats))
        .route("/api/dashboard/stats/stream", get(handlers::stream_stats))
        .route("/api/dashboard/leaderboard", get(handlers::get_leaderboard))
        .with_state(dashboard_service)
}
