use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, ValidatedJson};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    AssignAgenciesDto, EditReportDto, ListReportsQuery, ReportResponseDto,
    ReportUpdateResponseDto, UpdateReportStatusDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

use super::ReportState;

/// List reports visible to the caller
///
/// Citizens see their own reports, agencies the reports assigned to them,
/// admins everything. Newest first.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(PaginationQuery, ListReportsQuery),
    responses(
        (status = 200, description = "Paginated list of reports", body = ApiResponse<Vec<ReportResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No active profile")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Query(params): Query<PaginationQuery>,
    Query(filter): Query<ListReportsQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (items, total) = state
        .report_service
        .list(&user, filter.status, &params)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(total, &params)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Edit own report while it is still pending
#[utoipa::path(
    patch,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = EditReportDto,
    responses(
        (status = 200, description = "Report updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the reporting citizen"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn edit_report(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<EditReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.edit(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report updated successfully".to_string()),
        None,
    )))
}

/// Change report status
#[utoipa::path(
    patch,
    path = "/api/reports/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateReportStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Transition not allowed for this role"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Transition not allowed from the current status")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report_status(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateReportStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = state.report_service.transition(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report status updated".to_string()),
        None,
    )))
}

/// Audit history of a report, oldest first
#[utoipa::path(
    get,
    path = "/api/reports/{id}/updates",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report history", body = ApiResponse<Vec<ReportUpdateResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_report_updates(
    user: AuthenticatedUser,
    State(state): State<ReportState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<ReportUpdateResponseDto>>>> {
    let updates = state.report_service.updates(&user, id).await?;
    let total = updates.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(updates),
        None,
        Some(Meta::total(total)),
    )))
}

/// Replace the agencies assigned to a report
#[utoipa::path(
    put,
    path = "/api/admin/reports/{id}/agencies",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = AssignAgenciesDto,
    responses(
        (status = 200, description = "Assignment updated", body = ApiResponse<ReportResponseDto>),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Report not found")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn assign_report_agencies(
    RequireAdmin(ctx): RequireAdmin,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<AssignAgenciesDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.assign_agencies(&ctx, id, dto.agency_ids).await?;
    Ok(Json(ApiResponse::success(
        Some(report),
        Some("Report assignment updated".to_string()),
        None,
    )))
}
