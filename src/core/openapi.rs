use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::agencies::{dtos as agencies_dtos, handlers as agencies_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::dashboard::{dtos as dashboard_dtos, handlers as dashboard_handlers};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::handlers::{profile_handler, user_admin_handler};
use crate::features::users::{dtos as users_dtos, models as users_models};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Users
        profile_handler::get_profile,
        profile_handler::register_profile,
        profile_handler::update_profile,
        // Reports
        reports_handlers::submit_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::edit_report,
        reports_handlers::update_report_status,
        reports_handlers::list_report_updates,
        // Categories
        categories_handlers::list_categories,
        categories_handlers::get_category,
        // Agencies
        agencies_handlers::list_agencies,
        agencies_handlers::get_agency,
        // Dashboard
        dashboard_handlers::get_summary,
        // Admin
        user_admin_handler::list_users,
        user_admin_handler::update_user_access,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        agencies_handlers::create_agency,
        agencies_handlers::update_agency,
        agencies_handlers::delete_agency,
        reports_handlers::assign_report_agencies,
    ),
    components(
        schemas(
            Meta,
            // Users
            users_models::Role,
            users_dtos::UserProfileResponseDto,
            users_dtos::RegisterProfileDto,
            users_dtos::UpdateProfileDto,
            users_dtos::UpdateUserAccessDto,
            ApiResponse<users_dtos::UserProfileResponseDto>,
            ApiResponse<Vec<users_dtos::UserProfileResponseDto>>,
            // Reports
            reports_models::ReportStatus,
            reports_models::Priority,
            reports_models::EmergencyLevel,
            reports_dtos::ReportResponseDto,
            reports_dtos::ReportUpdateResponseDto,
            reports_dtos::SubmitReportForm,
            reports_dtos::EditReportDto,
            reports_dtos::UpdateReportStatusDto,
            reports_dtos::AssignAgenciesDto,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<Vec<reports_dtos::ReportUpdateResponseDto>>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            // Agencies
            agencies_dtos::AgencyResponseDto,
            agencies_dtos::CreateAgencyDto,
            agencies_dtos::UpdateAgencyDto,
            ApiResponse<agencies_dtos::AgencyResponseDto>,
            ApiResponse<Vec<agencies_dtos::AgencyResponseDto>>,
            // Dashboard
            dashboard_dtos::DashboardSummaryDto,
            ApiResponse<dashboard_dtos::DashboardSummaryDto>,
        )
    ),
    tags(
        (name = "users", description = "User profile management"),
        (name = "reports", description = "Emergency report submission and lifecycle"),
        (name = "categories", description = "Emergency categories (public)"),
        (name = "agencies", description = "Responding agencies"),
        (name = "dashboard", description = "Report counts for the dashboard charts"),
        (name = "admin", description = "Admin endpoints (admin and superadmin)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "UERRA API",
        version = "0.1.0",
        description = "API documentation for the UERRA emergency reporting service",
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
