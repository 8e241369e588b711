use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::agencies::dtos::{AgencyResponseDto, CreateAgencyDto, UpdateAgencyDto};
use crate::features::agencies::services::AgencyService;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List agencies (paginated)
#[utoipa::path(
    get,
    path = "/api/agencies",
    params(PaginationQuery),
    responses(
        (status = 200, description = "List of agencies", body = ApiResponse<Vec<AgencyResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "agencies",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_agencies(
    _user: AuthenticatedUser,
    State(service): State<Arc<AgencyService>>,
    Query(params): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AgencyResponseDto>>>> {
    let (items, total) = service.list(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(total, &params)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/agencies/{id}",
    params(
        ("id" = Uuid, Path, description = "Agency ID")
    ),
    responses(
        (status = 200, description = "Agency found", body = ApiResponse<AgencyResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Agency not found")
    ),
    tag = "agencies",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_agency(
    _user: AuthenticatedUser,
    State(service): State<Arc<AgencyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AgencyResponseDto>>> {
    let agency = service.get(id).await?;
    Ok(Json(ApiResponse::success(Some(agency), None, None)))
}

#[utoipa::path(
    post,
    path = "/api/admin/agencies",
    request_body = CreateAgencyDto,
    responses(
        (status = 201, description = "Agency created", body = ApiResponse<AgencyResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_agency(
    RequireAdmin(_ctx): RequireAdmin,
    State(service): State<Arc<AgencyService>>,
    ValidatedJson(dto): ValidatedJson<CreateAgencyDto>,
) -> Result<(StatusCode, Json<ApiResponse<AgencyResponseDto>>)> {
    let agency = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(agency),
            Some("Agency created successfully".to_string()),
            None,
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/agencies/{id}",
    params(
        ("id" = Uuid, Path, description = "Agency ID")
    ),
    request_body = UpdateAgencyDto,
    responses(
        (status = 200, description = "Agency updated", body = ApiResponse<AgencyResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Agency not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_agency(
    RequireAdmin(_ctx): RequireAdmin,
    State(service): State<Arc<AgencyService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAgencyDto>,
) -> Result<Json<ApiResponse<AgencyResponseDto>>> {
    let agency = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(agency),
        Some("Agency updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/agencies/{id}",
    params(
        ("id" = Uuid, Path, description = "Agency ID")
    ),
    responses(
        (status = 200, description = "Agency deleted"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Agency not found"),
        (status = 409, description = "Agency still has linked users")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_agency(
    RequireAdmin(_ctx): RequireAdmin,
    State(service): State<Arc<AgencyService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Agency deleted successfully".to_string()),
        None,
    )))
}
