use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a responding agency
#[derive(Debug, Clone, FromRow)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    /// Free-form kind, e.g. `fire_department`, `police`, `hospital`
    pub agency_type: String,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
