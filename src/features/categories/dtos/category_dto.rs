use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::shared::validation::{CODE_REGEX, HEX_COLOR_REGEX};

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponseDto {
    pub id: String,
    pub name: String,
    pub color: String,
    pub tips: Vec<String>,
    pub equipment: Vec<String>,
    pub agency_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            color: c.color,
            tips: c.tips,
            equipment: c.equipment,
            agency_ids: c.agency_ids,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Request DTO for creating a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryDto {
    /// Lowercase slug used as the category key (e.g. `road-accident`)
    #[validate(regex(
        path = *CODE_REGEX,
        message = "Key must be lowercase alphanumeric with single hyphens (e.g. 'road-accident')"
    ))]
    pub id: String,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be in #RRGGBB format"))]
    pub color: String,

    #[serde(default)]
    pub tips: Vec<String>,

    #[serde(default)]
    pub equipment: Vec<String>,

    #[serde(default)]
    pub agency_ids: Vec<Uuid>,
}

/// Request DTO for updating a category. Omitted fields keep their value,
/// list fields are replaced as a whole.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "Color must be in #RRGGBB format"))]
    pub color: Option<String>,

    pub tips: Option<Vec<String>>,
    pub equipment: Option<Vec<String>>,
    pub agency_ids: Option<Vec<Uuid>>,
}
