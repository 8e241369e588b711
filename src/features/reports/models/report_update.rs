use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::ReportStatus;

/// Append-only audit entry. Rows are never updated or deleted.
#[derive(Debug, Clone, FromRow)]
pub struct ReportUpdate {
    pub id: Uuid,
    pub report_id: Uuid,
    /// Identity id of whoever made the change
    pub user_id: String,
    pub status: ReportStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateReportUpdate {
    pub report_id: Uuid,
    pub user_id: String,
    pub status: ReportStatus,
    pub notes: Option<String>,
}
