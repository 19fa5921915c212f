use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::authorities::{
    dtos as authorities_dtos, handlers as authorities_handlers, models as authorities_models,
};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{dtos as users_dtos, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::logout,
        auth::handlers::get_me,
        // Reports
        reports_handlers::submit_report,
        reports_handlers::list_my_reports,
        reports_handlers::list_all_reports,
        reports_handlers::get_report,
        reports_handlers::update_report_status,
        reports_handlers::assign_report,
        reports_handlers::resolve_report,
        // Authorities
        authorities_handlers::list_authorities,
        // Dashboard
        dashboard_handlers::get_stats,
        dashboard_handlers::stream_stats,
        dashboard_handlers::get_leaderboard,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            // Users
            users_models::UserRole,
            users_dtos::UserProfileDto,
            users_dtos::LeaderboardEntryDto,
            ApiResponse<users_dtos::UserProfileDto>,
            ApiResponse<Vec<users_dtos::LeaderboardEntryDto>>,
            // Reports
            reports_models::ReportStatus,
            reports_dtos::SubmitReportForm,
            reports_dtos::ResolveReportForm,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::AssignReportDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            // Authorities
            authorities_models::Department,
            authorities_dtos::AuthorityResponseDto,
            ApiResponse<Vec<authorities_dtos::AuthorityResponseDto>>,
            // Dashboard
            dashboard_dtos::ReportStatsDto,
            ApiResponse<dashboard_dtos::ReportStatsDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and session management"),
        (name = "reports", description = "Incident reports and their lifecycle"),
        (name = "authorities", description = "Responding authorities (authority role only)"),
        (name = "dashboard", description = "Public statistics, live stats stream and leaderboard"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Mangrove Watch API",
        version = "0.1.0",
        description = "API documentation for Mangrove Watch community incident reporting",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
