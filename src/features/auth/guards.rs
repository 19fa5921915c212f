//! Role-based authorization guards.
//!
//! Guards read the `AuthenticatedUser` inserted by the auth middleware and
//! reject callers without the required role.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for authority staff.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAuthority(user): RequireAuthority) { ... }
/// ```
pub struct RequireAuthority(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuthority
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_authority() {
            return Err(AppError::Forbidden("Authority access required".to_string()));
        }

        Ok(RequireAuthority(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{create_authority_user, create_citizen_user};
    use axum::http::Request;

    async fn run_guard(user: Option<AuthenticatedUser>) -> Result<RequireAuthority, AppError> {
        let mut request = Request::new(());
        if let Some(user) = user {
            request.extensions_mut().insert(user);
        }
        let (mut parts, _) = request.into_parts();
        RequireAuthority::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_authority_passes() {
        let guard = run_guard(Some(create_authority_user())).await;
        assert!(guard.is_ok());
    }

    #[tokio::test]
    async fn test_citizen_is_forbidden() {
        let guard = run_guard(Some(create_citizen_user())).await;
        assert!(matches!(guard, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthorized() {
        let guard = run_guard(None).await;
        assert!(matches!(guard, Err(AppError::Unauthorized(_))));
    }
}
