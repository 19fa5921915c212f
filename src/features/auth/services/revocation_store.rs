use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Tracks access tokens invalidated by logout until they expire
#[async_trait]
pub trait RevokedTokenStore: Send + Sync {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> Result<()>;

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool>;
}

pub struct PgRevokedTokenStore {
    pool: PgPool,
}

impl PgRevokedTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevokedTokenStore for PgRevokedTokenStore {
    async fn revoke(&self, token_id: Uuid, expires_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(token_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to revoke token {}: {:?}", token_id, e);
            AppError::Database(e)
        })?;

        // Expired entries can never match a valid token again
        let pruned = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to prune revoked tokens: {:?}", e);
                AppError::Database(e)
            })?
            .rows_affected();

        if pruned > 0 {
            tracing::debug!("Pruned {} expired revoked tokens", pruned);
        }

        Ok(())
    }

    async fn is_revoked(&self, token_id: Uuid) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
            .bind(token_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to check token revocation: {:?}", e);
                AppError::Database(e)
            })
    }
}
