use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::authorities::models::{Authority, Department};
use crate::features::authorities::services::AuthorityFilter;

/// Query filters for listing authorities
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AuthorityListQuery {
    /// Only authorities of this department
    pub department: Option<Department>,
    /// Only active (`true`) or inactive (`false`) authorities
    pub active: Option<bool>,
}

impl From<AuthorityListQuery> for AuthorityFilter {
    fn from(q: AuthorityListQuery) -> Self {
        Self {
            department: q.department,
            active: q.active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorityResponseDto {
    pub id: Uuid,
    pub name: String,
    pub department: Department,
    pub active: bool,
    pub lat: f64,
    pub lng: f64,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Authority> for AuthorityResponseDto {
    fn from(a: Authority) -> Self {
        Self {
            id: a.id,
            name: a.name,
            department: a.department,
            active: a.active,
            lat: a.lat,
            lng: a.lng,
            phone: a.phone,
            created_at: a.created_at,
        }
    }
}
