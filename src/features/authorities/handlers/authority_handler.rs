use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::auth::guards::RequireAuthority;
use crate::features::authorities::dtos::{AuthorityListQuery, AuthorityResponseDto};
use crate::features::authorities::services::AuthorityRepository;
use crate::shared::types::ApiResponse;

/// List authorities (authority staff only)
#[utoipa::path(
    get,
    path = "/api/authorities",
    params(AuthorityListQuery),
    responses(
        (status = 200, description = "Authorities in directory order", body = ApiResponse<Vec<AuthorityResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Authority access required")
    ),
    security(("bearer_auth" = [])),
    tag = "authorities"
)]
pub async fn list_authorities(
    RequireAuthority(_user): RequireAuthority,
    State(repository): State<Arc<dyn AuthorityRepository>>,
    Query(query): Query<AuthorityListQuery>,
) -> Result<Json<ApiResponse<Vec<AuthorityResponseDto>>>> {
    let authorities = repository.list(query.into()).await?;
    let dtos: Vec<AuthorityResponseDto> = authorities.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::authorities::models::Department;
    use crate::features::authorities::routes;
    use crate::shared::test_helpers::{
        sample_authority, with_authority_auth, with_citizen_auth, InMemoryAuthorityRepository,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn repository() -> Arc<InMemoryAuthorityRepository> {
        let repo = InMemoryAuthorityRepository::default();
        repo.insert(sample_authority("Fire North", Department::Fire, true, 0.0, 0.0));
        repo.insert(sample_authority("Fire Old", Department::Fire, false, 0.0, 0.0));
        repo.insert(sample_authority("Waste Depot", Department::Waste, true, 0.0, 0.0));
        Arc::new(repo)
    }

    #[tokio::test]
    async fn test_list_authorities_filters() {
        let server =
            TestServer::new(with_authority_auth(routes::routes(repository()))).unwrap();

        let response = server
            .get("/api/authorities")
            .add_query_param("department", "Fire")
            .add_query_param("active", true)
            .await;
        response.assert_status_ok();

        let body: ApiResponse<Vec<AuthorityResponseDto>> = response.json();
        let names: Vec<String> = body.data.unwrap().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["Fire North".to_string()]);
    }

    #[tokio::test]
    async fn test_list_authorities_requires_authority_role() {
        let server = TestServer::new(with_citizen_auth(routes::routes(repository()))).unwrap();

        let response = server.get("/api/authorities").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }
}
