use std::sync::Arc;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Response, Sse,
    },
    Json,
};
use futures::{future, stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::ReportStatsDto;
use crate::features::dashboard::services::DashboardService;
use crate::features::users::dtos::LeaderboardEntryDto;
use crate::shared::types::ApiResponse;

/// Get aggregate report statistics
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "dashboard",
    responses(
        (status = 200, description = "Report statistics", body = ApiResponse<ReportStatsDto>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_stats(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<ReportStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Stream report statistics over SSE
///
/// Sends a `stats` event on connect and again after every report change.
#[utoipa::path(
    get,
    path = "/api/dashboard/stats/stream",
    tag = "dashboard",
    responses(
        (status = 200, description = "SSE stream of `stats` events", content_type = "text/event-stream", body = ReportStatsDto),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn stream_stats(State(service): State<Arc<DashboardService>>) -> Result<Response> {
    // Subscribe before the first read so no change slips in between
    let changes = BroadcastStream::new(service.subscribe());
    let initial = service.stats().await?;
    let keepalive = service.keepalive_interval();

    // Lagged receivers also trigger a refresh
    let updates = changes
        .then(move |_| {
            let service = service.clone();
            async move { service.stats().await }
        })
        .filter_map(|result| {
            future::ready(match result {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::warn!("Failed to refresh streamed stats: {}", e);
                    None
                }
            })
        });

    let events = stream::once(future::ready(initial))
        .chain(updates)
        .map(|stats| Event::default().event("stats").json_data(stats));

    let sse = Sse::new(events).keep_alive(KeepAlive::new().interval(keepalive).text("ping"));
    Ok(sse.into_response())
}

/// Get the reporter leaderboard
///
/// When the board is restricted to signed-in users, anonymous callers get
/// an empty list.
#[utoipa::path(
    get,
    path = "/api/dashboard/leaderboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "Top reporters by points", body = ApiResponse<Vec<LeaderboardEntryDto>>),
        (status = 500, description = "Internal server error")
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn get_leaderboard(
    caller: Option<AuthenticatedUser>,
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntryDto>>>> {
    let leaderboard = service.leaderboard(caller.as_ref()).await?;
    Ok(Json(ApiResponse::success(Some(leaderboard), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DashboardConfig;
    use crate::features::dashboard::routes;
    use crate::features::reports::models::{CreateReport, ReportStatus};
    use crate::features::reports::services::{ReportEventBus, ReportRepository};
    use crate::features::users::UserService;
    use crate::shared::test_helpers::{
        sample_user, with_citizen_auth, InMemoryReportRepository, InMemoryUserRepository,
    };
    use axum_test::TestServer;
    use std::time::Duration;
    use uuid::Uuid;

    struct Harness {
        service: Arc<DashboardService>,
        reports: Arc<InMemoryReportRepository>,
        events: Arc<ReportEventBus>,
    }

    fn harness(config: DashboardConfig) -> Harness {
        let users = Arc::new(InMemoryUserRepository::default());
        let mut user = sample_user("ayu@example.com");
        user.full_name = Some("Ayu".to_string());
        user.points = 20;
        user.total_reports = 2;
        users.insert(user);

        let reports = Arc::new(InMemoryReportRepository::default());
        let (bus, _) = ReportEventBus::new(4);
        let events = Arc::new(bus);
        let service = Arc::new(DashboardService::new(
            reports.clone(),
            Arc::new(UserService::new(users)),
            events.clone(),
            config,
        ));
        Harness {
            service,
            reports,
            events,
        }
    }

    fn service(requires_auth: bool) -> Arc<DashboardService> {
        harness(DashboardConfig {
            leaderboard_requires_auth: requires_auth,
            ..DashboardConfig::default()
        })
        .service
    }

    fn report() -> CreateReport {
        CreateReport {
            user_id: Uuid::new_v4(),
            reporter_name: None,
            reporter_email: None,
            incident_type: "Waste".to_string(),
            description: "Dumped tyres on the mudflat".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            photo_url: None,
        }
    }

    /// Read SSE frames until the next `stats` event and decode its payload
    async fn next_stats<S>(body: &mut S) -> ReportStatsDto
    where
        S: futures::Stream<Item = std::result::Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        let mut buffer = String::new();
        loop {
            let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
                .await
                .expect("timed out waiting for a stats event")
                .expect("stream ended")
                .unwrap();
            buffer.push_str(std::str::from_utf8(&chunk).unwrap());

            while let Some(end) = buffer.find("\n\n") {
                let frame: String = buffer.drain(..end + 2).collect();
                let is_stats = frame.lines().any(|l| l == "event: stats");
                let data = frame
                    .lines()
                    .find_map(|l| l.strip_prefix("data:"))
                    .map(str::trim_start);
                if let (true, Some(data)) = (is_stats, data) {
                    return serde_json::from_str(data).unwrap();
                }
            }
        }
    }

    #[tokio::test]
    async fn test_anonymous_restricted_leaderboard_is_empty_success() {
        let server = TestServer::new(routes::routes(service(true))).unwrap();

        let response = server.get("/api/dashboard/leaderboard").await;
        response.assert_status_ok();

        let body: ApiResponse<Vec<LeaderboardEntryDto>> = response.json();
        assert!(body.success);
        assert!(body.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_default_config_hides_leaderboard_from_anonymous() {
        let h = harness(DashboardConfig::default());
        let server = TestServer::new(routes::routes(h.service.clone())).unwrap();

        let response = server.get("/api/dashboard/leaderboard").await;
        response.assert_status_ok();
        let body: ApiResponse<Vec<LeaderboardEntryDto>> = response.json();
        assert!(body.success);
        assert!(body.data.unwrap().is_empty());

        let server = TestServer::new(with_citizen_auth(routes::routes(h.service))).unwrap();
        let body: ApiResponse<Vec<LeaderboardEntryDto>> =
            server.get("/api/dashboard/leaderboard").await.json();
        assert_eq!(body.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_leaderboard_for_anonymous() {
        let server = TestServer::new(routes::routes(service(false))).unwrap();

        let body: ApiResponse<Vec<LeaderboardEntryDto>> =
            server.get("/api/dashboard/leaderboard").await.json();
        assert_eq!(body.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_signed_in_leaderboard() {
        let server = TestServer::new(with_citizen_auth(routes::routes(service(true)))).unwrap();

        let body: ApiResponse<Vec<LeaderboardEntryDto>> =
            server.get("/api/dashboard/leaderboard").await.json();
        let board = body.data.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].name, "Ayu");
        assert_eq!(board[0].reports, 2);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let server = TestServer::new(routes::routes(service(false))).unwrap();

        let body: ApiResponse<ReportStatsDto> = server.get("/api/dashboard/stats").await.json();
        let stats = body.data.unwrap();
        assert_eq!(stats.total_reports, 0);
        assert_eq!(stats.active_reporters, 1);
    }

    #[tokio::test]
    async fn test_stats_stream_pushes_on_report_change() {
        let h = harness(DashboardConfig::default());

        // The stream never completes, so its body is read frame by frame
        let response = stream_stats(State(h.service.clone())).await.unwrap();
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "text/event-stream"
        );
        let mut body = response.into_body().into_data_stream();

        let initial = next_stats(&mut body).await;
        assert_eq!(initial.total_reports, 0);
        assert_eq!(initial.active_reporters, 1);

        let created = h.reports.create(&report()).await.unwrap();
        h.events.publish_created(created.id);

        let after_create = next_stats(&mut body).await;
        assert_eq!(after_create.total_reports, 1);
        assert_eq!(after_create.pending_reports, 1);

        h.reports
            .set_status(created.id, ReportStatus::Resolved)
            .await
            .unwrap();
        h.events.publish_updated(created.id);

        let after_resolve = next_stats(&mut body).await;
        assert_eq!(after_resolve.resolved_reports, 1);
        assert_eq!(after_resolve.resolved_percentage, 100);
    }
}
