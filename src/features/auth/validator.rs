use super::model::{AccessTokenClaims, AuthenticatedUser};
use super::services::RevokedTokenStore;
use crate::core::error::AppError;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Validates HS256 access tokens and rejects revoked ones
pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: String,
    leeway: u64,
    revocations: Arc<dyn RevokedTokenStore>,
}

impl JwtValidator {
    pub fn new(
        secret: &str,
        issuer: String,
        leeway: Duration,
        revocations: Arc<dyn RevokedTokenStore>,
    ) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            leeway: leeway.as_secs(),
            revocations,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = self.leeway;

        let claims = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Auth("Invalid subject claim".to_string()))?;
        let token_id = Uuid::parse_str(&claims.jti)
            .map_err(|_| AppError::Auth("Invalid token id claim".to_string()))?;
        let token_expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| AppError::Auth("Invalid expiry claim".to_string()))?;

        if self.revocations.is_revoked(token_id).await? {
            return Err(AppError::Auth("Token has been revoked".to_string()));
        }

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            name: claims.name,
            roles: claims.roles,
            token_id,
            token_expires_at,
        })
    }
}
