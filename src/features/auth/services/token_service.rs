use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::time::Duration;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AccessTokenClaims;
use crate::features::users::models::User;

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Signs HS256 access tokens for authenticated users
pub struct TokenService {
    encoding_key: EncodingKey,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, issuer: String, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl,
        }
    }

    /// Issue an access token carrying the user's id, email, name and role
    pub fn issue(&self, user: &User) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_in = self.ttl.as_secs() as i64;
        let expires_at = now + ChronoDuration::seconds(expires_in);
        let token_id = Uuid::new_v4();

        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            name: user.full_name.clone(),
            roles: vec![user.role.as_str().to_string()],
            jti: token_id.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign access token: {}", e);
            AppError::Internal(format!("Failed to sign access token: {}", e))
        })?;

        tracing::debug!("Issued access token {} for user {}", token_id, user.id);

        Ok(IssuedToken {
            access_token,
            token_id,
            expires_at,
            expires_in,
        })
    }
}
