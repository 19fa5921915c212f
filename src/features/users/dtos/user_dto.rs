use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{User, UserRole};

/// Reporter profile as shown to the account owner
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileDto {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub total_reports: i32,
    pub points: i32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfileDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            phone: u.phone,
            role: u.role,
            total_reports: u.total_reports,
            points: u.points,
            created_at: u.created_at,
        }
    }
}

/// One row of the public reporter leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntryDto {
    pub id: Uuid,
    /// Full name, falling back to email, then "Anonymous"
    pub name: String,
    pub reports: i32,
    pub points: i32,
}

impl From<User> for LeaderboardEntryDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.display_name(),
            reports: u.total_reports,
            points: u.points,
        }
    }
}
