use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::users::dtos::{ListUsersQuery, UpdateUserAccessDto, UserProfileResponseDto};
use crate::features::users::services::UserProfileService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List user profiles (paginated)
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(PaginationQuery, ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = ApiResponse<Vec<UserProfileResponseDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_users(
    RequireAdmin(_ctx): RequireAdmin,
    State(service): State<Arc<UserProfileService>>,
    Query(params): Query<PaginationQuery>,
    Query(filter): Query<ListUsersQuery>,
) -> Result<Json<ApiResponse<Vec<UserProfileResponseDto>>>> {
    let (items, total) = service
        .list(filter.role, params.offset(), params.limit())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta::paged(total, &params)),
    )))
}

/// Update a user's role, agency link or active flag
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(
        ("id" = String, Path, description = "User (identity) ID")
    ),
    request_body = UpdateUserAccessDto,
    responses(
        (status = 200, description = "Access updated", body = ApiResponse<UserProfileResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_user_access(
    RequireAdmin(ctx): RequireAdmin,
    State(service): State<Arc<UserProfileService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateUserAccessDto>,
) -> Result<Json<ApiResponse<UserProfileResponseDto>>> {
    let profile = service.update_access(&ctx, &id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("User access updated".to_string()),
        None,
    )))
}
