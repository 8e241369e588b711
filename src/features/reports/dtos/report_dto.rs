use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::features::reports::models::{
    EmergencyLevel, Priority, Report, ReportContentChanges, ReportStatus, ReportUpdate,
};
use crate::shared::constants::{
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE,
    MIN_LONGITUDE, TITLE_MAX_CHARS,
};

/// Response DTO for report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: String,
    pub title: Option<String>,
    pub description: String,
    pub priority: Priority,
    pub emergency_level: EmergencyLevel,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
    pub status: ReportStatus,
    pub assigned_agency_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            category_id: r.category_id,
            title: r.title,
            description: r.description,
            priority: r.priority,
            emergency_level: r.emergency_level,
            latitude: r.latitude,
            longitude: r.longitude,
            image_url: r.image_url,
            status: r.status,
            assigned_agency_ids: r.assigned_agency_ids,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// One entry of a report's audit history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportUpdateResponseDto {
    pub id: Uuid,
    pub report_id: Uuid,
    pub user_id: String,
    pub status: ReportStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ReportUpdate> for ReportUpdateResponseDto {
    fn from(u: ReportUpdate) -> Self {
        Self {
            id: u.id,
            report_id: u.report_id,
            user_id: u.user_id,
            status: u.status,
            notes: u.notes,
            created_at: u.created_at,
        }
    }
}

/// Query params for listing reports
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListReportsQuery {
    /// Filter by status
    pub status: Option<ReportStatus>,
}

/// Request DTO for a status change
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReportStatusDto {
    pub status: ReportStatus,
    #[validate(length(max = 1000, message = "Notes must not exceed 1000 characters"))]
    pub notes: Option<String>,
}

/// Request DTO replacing a report's agency assignment
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignAgenciesDto {
    pub agency_ids: Vec<Uuid>,
}

// =============================================================================
// SUBMISSION / EDIT INPUT
// =============================================================================

/// Multipart form for `POST /api/reports` (OpenAPI documentation only).
/// The handler reads the fields with axum's Multipart extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct SubmitReportForm {
    #[schema(example = "fire")]
    pub category_id: String,
    #[schema(example = "Smoke coming from the building")]
    pub description: String,
    pub title: Option<String>,
    #[schema(example = "high")]
    pub priority: Option<String>,
    #[schema(example = "standard")]
    pub emergency_level: Option<String>,
    #[schema(example = "14.5995")]
    pub latitude: Option<String>,
    #[schema(example = "120.9842")]
    pub longitude: Option<String>,
    /// Optional image (jpeg, png or webp, at most 5MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Submission fields, as received. Every field arrives as text so that each
/// rule can report its own message instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_submission_location", skip_on_field_errors = false))]
pub struct SubmitReportDto {
    #[validate(
        required(message = "Category is required"),
        custom(function = "validate_category")
    )]
    pub category_id: Option<String>,

    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,

    #[validate(
        required(message = "Description is required"),
        custom(function = "validate_description")
    )]
    pub description: Option<String>,

    /// low | medium | high | critical (default: medium)
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    /// standard | urgent | life_threatening (default: standard)
    #[validate(custom(function = "validate_emergency_level"))]
    pub emergency_level: Option<String>,

    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Submission input after every rule passed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub category_id: String,
    pub title: Option<String>,
    pub description: String,
    pub priority: Priority,
    pub emergency_level: EmergencyLevel,
    pub location: Option<(f64, f64)>,
}

impl SubmitReportDto {
    /// Check every rule; on failure returns all messages in field order.
    pub fn into_validated(self) -> Result<ValidatedSubmission, Vec<String>> {
        if let Err(errors) = self.validate() {
            return Err(ordered_messages(&errors));
        }

        let location = parse_location(self.latitude.as_deref(), self.longitude.as_deref())
            .ok()
            .flatten();

        Ok(ValidatedSubmission {
            category_id: self.category_id.unwrap_or_default().trim().to_string(),
            title: non_blank(self.title),
            description: self.description.unwrap_or_default().trim().to_string(),
            priority: parse_or_default(self.priority.as_deref()),
            emergency_level: parse_or_default(self.emergency_level.as_deref()),
            location,
        })
    }
}

/// Owner edit of a pending report. Omitted fields keep their value and a
/// blank title removes it. The location can be moved but not removed.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_edit_location", skip_on_field_errors = false))]
pub struct EditReportDto {
    #[validate(custom(function = "validate_category"))]
    pub category_id: Option<String>,
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_description"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,
    #[validate(custom(function = "validate_emergency_level"))]
    pub emergency_level: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl EditReportDto {
    pub fn into_changes(self) -> Result<ReportContentChanges, Vec<String>> {
        if let Err(errors) = self.validate() {
            return Err(ordered_messages(&errors));
        }

        Ok(ReportContentChanges {
            category_id: self.category_id.map(|c| c.trim().to_string()),
            title: self.title.map(|t| non_blank(Some(t))),
            description: self.description.map(|d| d.trim().to_string()),
            priority: self.priority.as_deref().and_then(|p| p.trim().parse().ok()),
            emergency_level: self
                .emergency_level
                .as_deref()
                .and_then(|l| l.trim().parse().ok()),
            location: self.latitude.zip(self.longitude),
        })
    }
}

impl ReportContentChanges {
    pub fn is_empty(&self) -> bool {
        *self == ReportContentChanges::default()
    }
}

// Field order used when reporting violations. Schema-level (location)
// errors are stored under `__all__`.
const FIELD_ORDER: [&str; 6] = [
    "category_id",
    "title",
    "description",
    "priority",
    "emergency_level",
    "__all__",
];

fn ordered_messages(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();
    FIELD_ORDER
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .map(|e| {
            e.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| e.code.to_string())
        })
        .collect()
}

fn violation(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or_default<T: std::str::FromStr + Default>(value: Option<&str>) -> T {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

fn validate_category(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(violation("required", "Category is required"));
    }
    Ok(())
}

fn validate_title(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() > TITLE_MAX_CHARS {
        return Err(violation(
            "title_too_long",
            "Title must not exceed 100 characters",
        ));
    }
    Ok(())
}

fn validate_description(value: &str) -> Result<(), ValidationError> {
    let length = value.trim().chars().count();
    if length == 0 {
        return Err(violation("required", "Description is required"));
    }
    if length < DESCRIPTION_MIN_CHARS {
        return Err(violation(
            "description_too_short",
            "Description must be at least 10 characters long",
        ));
    }
    if length > DESCRIPTION_MAX_CHARS {
        return Err(violation(
            "description_too_long",
            "Description must not exceed 1000 characters",
        ));
    }
    Ok(())
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.parse::<Priority>().is_ok() {
        return Ok(());
    }
    Err(violation("invalid_priority", "Invalid priority level"))
}

fn validate_emergency_level(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.parse::<EmergencyLevel>().is_ok() {
        return Ok(());
    }
    Err(violation("invalid_emergency_level", "Invalid emergency level"))
}

fn validate_submission_location(dto: &SubmitReportDto) -> Result<(), ValidationError> {
    parse_location(dto.latitude.as_deref(), dto.longitude.as_deref()).map(|_| ())
}

fn validate_edit_location(dto: &EditReportDto) -> Result<(), ValidationError> {
    match (dto.latitude, dto.longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => check_bounds(lat, lng).map(|_| ()),
        _ => Err(invalid_coordinates()),
    }
}

fn invalid_coordinates() -> ValidationError {
    violation(
        "invalid_coordinates",
        "Latitude and longitude must be valid numbers",
    )
}

/// Blank coordinates count as absent. A point needs both halves.
fn parse_location(
    latitude: Option<&str>,
    longitude: Option<&str>,
) -> Result<Option<(f64, f64)>, ValidationError> {
    let latitude = latitude.map(str::trim).filter(|v| !v.is_empty());
    let longitude = longitude.map(str::trim).filter(|v| !v.is_empty());

    match (latitude, longitude) {
        (None, None) => Ok(None),
        (Some(lat), Some(lng)) => {
            let lat: f64 = lat.parse().map_err(|_| invalid_coordinates())?;
            let lng: f64 = lng.parse().map_err(|_| invalid_coordinates())?;
            check_bounds(lat, lng).map(Some)
        }
        _ => Err(invalid_coordinates()),
    }
}

fn check_bounds(lat: f64, lng: f64) -> Result<(f64, f64), ValidationError> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(invalid_coordinates());
    }
    if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&lat)
        || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lng)
    {
        return Err(violation(
            "out_of_bounds",
            "Location must be within Philippine territory",
        ));
    }
    Ok((lat, lng))
}
