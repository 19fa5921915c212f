use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{AuthResponseDto, LoginRequestDto, RegisterRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::{RevokedTokenStore, TokenService};
use crate::features::users::dtos::UserProfileDto;
use crate::features::users::models::{CreateUser, User, UserRole};
use crate::features::users::services::EMAIL_TAKEN_MESSAGE;
use crate::features::users::UserRepository;

/// Service for account operations (register, login, logout, me)
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    revocations: Arc<dyn RevokedTokenStore>,
    /// Lowercased emails that register with the authority role
    authority_emails: Vec<String>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        revocations: Arc<dyn RevokedTokenStore>,
        authority_emails: Vec<String>,
    ) -> Self {
        Self {
            users,
            tokens,
            revocations,
            authority_emails,
        }
    }

    /// Register a new account and sign it in
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let email = normalize_email(&dto.email);

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(EMAIL_TAKEN_MESSAGE.to_string()));
        }

        let password = dto.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;

        let role = if self.authority_emails.contains(&email) {
            UserRole::Authority
        } else {
            UserRole::Citizen
        };

        let user = self
            .users
            .create(&CreateUser {
                email,
                password_hash,
                full_name: trimmed(dto.full_name),
                phone: trimmed(dto.phone),
                role,
            })
            .await?;

        tracing::info!("Registered user {} as {}", user.id, user.role);
        self.sign_in(user)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let email = normalize_email(&dto.email);

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::NotFound("No account found with this email.".to_string()))?;

        let password = dto.password;
        let hash = user.password_hash.clone();
        let password_valid =
            tokio::task::spawn_blocking(move || verify_password(&password, &hash))
                .await
                .map_err(|e| {
                    AppError::Internal(format!("Password verification task failed: {}", e))
                })?;

        if !password_valid {
            return Err(AppError::Unauthorized("Incorrect password.".to_string()));
        }

        tracing::info!("User {} logged in", user.id);
        self.sign_in(user)
    }

    /// Revoke the token the caller authenticated with
    pub async fn logout(&self, user: &AuthenticatedUser) -> Result<()> {
        self.revocations
            .revoke(user.token_id, user.token_expires_at)
            .await?;

        tracing::info!("User {} logged out (token {})", user.user_id, user.token_id);
        Ok(())
    }

    /// Current profile of the caller
    pub async fn me(&self, user: &AuthenticatedUser) -> Result<UserProfileDto> {
        self.users
            .find_by_id(user.user_id)
            .await?
            .map(UserProfileDto::from)
            .ok_or_else(|| AppError::NotFound("Account no longer exists".to_string()))
    }

    fn sign_in(&self, user: User) -> Result<AuthResponseDto> {
        let issued = self.tokens.issue(&user)?;

        Ok(AuthResponseDto {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
