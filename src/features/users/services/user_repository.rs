use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::database::is_unique_violation;
use crate::core::error::{AppError, Result};
use crate::features::users::models::{CreateUser, User};

/// Message shown when registering an email that is already taken
pub const EMAIL_TAKEN_MESSAGE: &str = "An account with this email already exists.";

const USER_COLUMNS: &str = "id, email, password_hash, full_name, phone, role, \
     total_reports, points, created_at, updated_at";

/// Persistence for user accounts and reporter stats
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user; a taken email is a `Conflict`
    async fn create(&self, data: &CreateUser) -> Result<User>;

    /// Lookup by already-normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Highest point totals first
    async fn top_by_points(&self, limit: i64) -> Result<Vec<User>>;

    async fn count(&self) -> Result<i64>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, data: &CreateUser) -> Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, password_hash, full_name, phone, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::now_v7())
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(&data.full_name)
            .bind(&data.phone)
            .bind(data.role)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return AppError::Conflict(EMAIL_TAKEN_MESSAGE.to_string());
                }
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Created user: {} (role: {})", user.id, user.role);
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user by email: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find user {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn top_by_points(&self, limit: i64) -> Result<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY points DESC, created_at ASC LIMIT $1"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch leaderboard: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })
    }
}
