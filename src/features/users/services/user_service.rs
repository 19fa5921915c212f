use std::sync::Arc;

use crate::core::error::Result;
use crate::features::users::dtos::LeaderboardEntryDto;
use crate::features::users::services::UserRepository;

/// Read-side operations on reporter profiles
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Top reporters by points
    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntryDto>> {
        let users = self.users.top_by_points(limit.max(1)).await?;
        Ok(users.into_iter().map(LeaderboardEntryDto::from).collect())
    }

    /// Number of registered accounts
    pub async fn count_reporters(&self) -> Result<i64> {
        self.users.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{sample_user, InMemoryUserRepository};

    #[tokio::test]
    async fn test_leaderboard_orders_by_points_and_limits() {
        let repo = Arc::new(InMemoryUserRepository::default());
        for (name, points) in [("Ayu", 30), ("Budi", 50), ("Citra", 10)] {
            let mut user = sample_user(&format!("{}@example.com", name.to_lowercase()));
            user.full_name = Some(name.to_string());
            user.points = points;
            user.total_reports = points / 10;
            repo.insert(user);
        }

        let service = UserService::new(repo);
        let board = service.leaderboard(2).await.unwrap();

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Budi");
        assert_eq!(board[0].reports, 5);
        assert_eq!(board[1].name, "Ayu");
    }
}
