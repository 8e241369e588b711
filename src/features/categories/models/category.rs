use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for an emergency category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    /// Lowercase slug, e.g. `fire` or `road-accident`
    pub id: String,
    pub name: String,
    /// `#RRGGBB`
    pub color: String,
    pub tips: Vec<String>,
    pub equipment: Vec<String>,
    /// Agencies that usually respond to this kind of emergency
    pub agency_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
