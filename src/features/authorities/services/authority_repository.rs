use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::features::authorities::models::{Authority, Department};

/// Optional filters for authority listings
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorityFilter {
    pub department: Option<Department>,
    pub active: Option<bool>,
}

impl AuthorityFilter {
    /// Authorities eligible to receive a dispatch for `department`
    pub fn eligible(department: Department) -> Self {
        Self {
            department: Some(department),
            active: Some(true),
        }
    }

    pub fn matches(&self, authority: &Authority) -> bool {
        self.department.is_none_or(|d| authority.department == d)
            && self.active.is_none_or(|a| authority.active == a)
    }
}

/// Read access to the authority directory
#[async_trait]
pub trait AuthorityRepository: Send + Sync {
    /// Matching authorities in stable order (oldest first)
    async fn list(&self, filter: AuthorityFilter) -> Result<Vec<Authority>>;
}

pub struct PgAuthorityRepository {
    pool: PgPool,
}

impl PgAuthorityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorityRepository for PgAuthorityRepository {
    async fn list(&self, filter: AuthorityFilter) -> Result<Vec<Authority>> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, department, active, lat, lng, phone, created_at \
             FROM authorities WHERE TRUE",
        );

        if let Some(department) = filter.department {
            query.push(" AND department = ").push_bind(department);
        }
        if let Some(active) = filter.active {
            query.push(" AND active = ").push_bind(active);
        }
        query.push(" ORDER BY created_at ASC, id ASC");

        query
            .build_query_as::<Authority>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list authorities: {:?}", e);
                AppError::Database(e)
            })
    }
}
