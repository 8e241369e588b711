use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::agencies::models::Agency;

/// Response DTO for agency
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AgencyResponseDto {
    pub id: Uuid,
    pub name: String,
    pub agency_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Agency> for AgencyResponseDto {
    fn from(a: Agency) -> Self {
        Self {
            id: a.id,
            name: a.name,
            agency_type: a.agency_type,
            contact: a.contact,
            address: a.address,
            latitude: a.latitude,
            longitude: a.longitude,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Request DTO for creating an agency
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_point"))]
pub struct CreateAgencyDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[schema(example = "City Fire Station 3")]
    pub name: String,

    #[validate(length(min = 1, max = 50, message = "Agency type must be 1-50 characters"))]
    #[schema(example = "fire_department")]
    pub agency_type: String,

    #[validate(length(max = 100, message = "Contact must not exceed 100 characters"))]
    pub contact: Option<String>,

    #[validate(length(max = 255, message = "Address must not exceed 255 characters"))]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
}

/// Request DTO for updating an agency. Omitted fields keep their value;
/// the point is only replaced when both coordinates are given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_point"))]
pub struct UpdateAgencyDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Agency type must be 1-50 characters"))]
    pub agency_type: Option<String>,

    #[validate(length(max = 100, message = "Contact must not exceed 100 characters"))]
    pub contact: Option<String>,

    #[validate(length(max = 255, message = "Address must not exceed 255 characters"))]
    pub address: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: Option<f64>,
}

fn check_point(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ValidationError> {
    if latitude.is_some() != longitude.is_some() {
        return Err(ValidationError::new("incomplete_point").with_message(Cow::Borrowed(
            "Latitude and longitude must be provided together",
        )));
    }
    Ok(())
}

fn validate_create_point(dto: &CreateAgencyDto) -> Result<(), ValidationError> {
    check_point(dto.latitude, dto.longitude)
}

fn validate_update_point(dto: &UpdateAgencyDto) -> Result<(), ValidationError> {
    check_point(dto.latitude, dto.longitude)
}
