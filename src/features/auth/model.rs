use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::constants::ROLE_AUTHORITY;

/// Caller identity resolved from a validated access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub roles: Vec<String>,
    /// `jti` of the presented token, used for logout
    pub token_id: Uuid,
    pub token_expires_at: DateTime<Utc>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Authority staff can triage, assign and resolve any report
    pub fn is_authority(&self) -> bool {
        self.has_role(ROLE_AUTHORITY)
    }

    /// Name shown on reports this user files or takes on
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
            .to_string()
    }
}

/// Claims carried by access tokens issued by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    pub jti: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}
