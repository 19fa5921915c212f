use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;

use crate::core::config::DashboardConfig;
use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::ReportStatsDto;
use crate::features::reports::services::{ReportEvent, ReportEventBus, ReportRepository};
use crate::features::users::dtos::LeaderboardEntryDto;
use crate::features::users::UserService;

/// Window counted as "this week"
const RECENT_WINDOW_DAYS: i64 = 7;

/// Public statistics and the reporter leaderboard
pub struct DashboardService {
    reports: Arc<dyn ReportRepository>,
    users: Arc<UserService>,
    events: Arc<ReportEventBus>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(
        reports: Arc<dyn ReportRepository>,
        users: Arc<UserService>,
        events: Arc<ReportEventBus>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            reports,
            users,
            events,
            config,
        }
    }

    pub async fn stats(&self) -> Result<ReportStatsDto> {
        let since = Utc::now() - chrono::Duration::days(RECENT_WINDOW_DAYS);
        let counts = self.reports.counts(since).await?;
        let reporters = self.users.count_reporters().await?;
        Ok(ReportStatsDto::new(counts, reporters))
    }

    /// Top reporters. When the board is restricted, anonymous callers get an
    /// empty list rather than an error.
    pub async fn leaderboard(
        &self,
        caller: Option<&AuthenticatedUser>,
    ) -> Result<Vec<LeaderboardEntryDto>> {
        if self.config.leaderboard_requires_auth && caller.is_none() {
            tracing::debug!("Anonymous leaderboard read on restricted board; returning empty");
            return Ok(Vec::new());
        }

        self.users.leaderboard(self.config.leaderboard_size).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.events.subscribe()
    }

    pub fn keepalive_interval(&self) -> Duration {
        self.config.stats_keepalive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{CreateReport, ReportStatus};
    use crate::shared::test_helpers::{
        create_citizen_user, sample_user, InMemoryReportRepository, InMemoryUserRepository,
    };
    use uuid::Uuid;

    fn service(
        reports: Arc<InMemoryReportRepository>,
        config: DashboardConfig,
    ) -> DashboardService {
        let users = Arc::new(InMemoryUserRepository::default());
        for (i, points) in [10, 40, 20].into_iter().enumerate() {
            let mut user = sample_user(&format!("reporter{}@example.com", i));
            user.points = points;
            users.insert(user);
        }
        let (bus, _) = ReportEventBus::new(4);
        DashboardService::new(
            reports,
            Arc::new(UserService::new(users)),
            Arc::new(bus),
            config,
        )
    }

    fn report() -> CreateReport {
        CreateReport {
            user_id: Uuid::new_v4(),
            reporter_name: None,
            reporter_email: None,
            incident_type: "Traffic".to_string(),
            description: "Broken signal".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn test_stats_counts_by_status() {
        let reports = Arc::new(InMemoryReportRepository::default());
        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(reports.create(&report()).await.unwrap().id);
        }
        reports
            .set_status(ids[0], ReportStatus::Resolved)
            .await
            .unwrap();
        reports
            .set_status(ids[1], ReportStatus::Investigating)
            .await
            .unwrap();

        let stats = service(reports, DashboardConfig::default())
            .stats()
            .await
            .unwrap();

        assert_eq!(stats.total_reports, 4);
        assert_eq!(stats.pending_reports, 2);
        assert_eq!(stats.investigating_reports, 1);
        assert_eq!(stats.resolved_reports, 1);
        assert_eq!(stats.resolved_percentage, 25);
        assert_eq!(stats.this_week_reports, 4);
        assert_eq!(stats.active_reporters, 3);
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let stats = service(
            Arc::new(InMemoryReportRepository::default()),
            DashboardConfig::default(),
        )
        .stats()
        .await
        .unwrap();

        assert_eq!(stats.total_reports, 0);
        assert_eq!(stats.resolved_percentage, 0);
    }

    #[tokio::test]
    async fn test_restricted_leaderboard_is_empty_for_anonymous() {
        let config = DashboardConfig {
            leaderboard_requires_auth: true,
            ..DashboardConfig::default()
        };
        let service = service(Arc::new(InMemoryReportRepository::default()), config);

        assert!(service.leaderboard(None).await.unwrap().is_empty());

        let caller = create_citizen_user();
        let board = service.leaderboard(Some(&caller)).await.unwrap();
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].points, 40);
    }

    #[tokio::test]
    async fn test_open_leaderboard_respects_size() {
        let config = DashboardConfig {
            leaderboard_size: 2,
            leaderboard_requires_auth: false,
            ..DashboardConfig::default()
        };
        let service = service(Arc::new(InMemoryReportRepository::default()), config);

        let board = service.leaderboard(None).await.unwrap();
        assert_eq!(board.len(), 2);
    }
}
