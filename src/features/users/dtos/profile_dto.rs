use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{Role, UserProfile};

/// User profile response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponseDto {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponseDto {
    fn from(p: UserProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            display_name: p.display_name,
            role: p.role,
            agency_id: p.agency_id,
            is_active: p.is_active,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Request DTO for self-registration. New profiles always start as citizens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterProfileDto {
    /// Only needed when the access token carries no email claim
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 128, message = "Display name must be 1-128 characters"))]
    pub display_name: Option<String>,
}

/// Request DTO for updating one's own profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileDto {
    #[validate(length(max = 128, message = "Display name must not exceed 128 characters"))]
    pub display_name: Option<String>,
}

/// Request DTO for admin changes to a user's access.
/// Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserAccessDto {
    pub role: Option<Role>,
    pub agency_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Query params for the admin user list
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Only return users with this role
    pub role: Option<Role>,
}
