use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{ReportResponseDto, SubmitReportDto, SubmitReportForm};
use crate::features::reports::submission::AttachmentInput;
use crate::shared::types::ApiResponse;

use super::ReportState;

/// Submit a new emergency report
///
/// Accepts multipart/form-data. Only citizens may submit; the report starts
/// as `pending` and gets one audit entry.
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "reports",
    request_body(
        content = SubmitReportForm,
        content_type = "multipart/form-data",
        description = "Report fields plus an optional `image` file",
    ),
    responses(
        (status = 201, description = "Report submitted", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation or attachment error"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Only citizens can submit reports")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn submit_report(
    user: Option<Extension<AuthenticatedUser>>,
    State(state): State<ReportState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let mut dto = SubmitReportDto::default();
    let mut attachment: Option<AttachmentInput> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "image" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let file_name = field.file_name().map(|s| s.to_string());

            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read image bytes: {}", e);
                AppError::BadRequest(format!("Failed to read image data: {}", e))
            })?;

            attachment = Some(AttachmentInput {
                file_name,
                content_type,
                data: data.to_vec(),
            });
            continue;
        }

        let slot = match field_name.as_str() {
            "category_id" => &mut dto.category_id,
            "title" => &mut dto.title,
            "description" => &mut dto.description,
            "priority" => &mut dto.priority,
            "emergency_level" => &mut dto.emergency_level,
            "latitude" => &mut dto.latitude,
            "longitude" => &mut dto.longitude,
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
                continue;
            }
        };

        let text = field.text().await.map_err(|e| {
            AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
        })?;
        *slot = Some(text);
    }

    let report = state
        .submission_service
        .submit(user.as_ref().map(|Extension(u)| u), dto, attachment)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(report.into()),
            Some("Report submitted successfully".to_string()),
            None,
        )),
    ))
}
