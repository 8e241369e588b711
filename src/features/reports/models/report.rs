use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Report status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Acknowledged,
    InProgress,
    Resolved,
    Cancelled,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 5] = [
        ReportStatus::Pending,
        ReportStatus::Acknowledged,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
        ReportStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Acknowledged => "acknowledged",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Cancelled => "cancelled",
        }
    }

    /// Edges of the report lifecycle.
    ///
    /// pending -> acknowledged | cancelled
    /// acknowledged -> in_progress
    /// in_progress -> resolved | cancelled
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Pending, ReportStatus::Acknowledged)
                | (ReportStatus::Pending, ReportStatus::Cancelled)
                | (ReportStatus::Acknowledged, ReportStatus::InProgress)
                | (ReportStatus::InProgress, ReportStatus::Resolved)
                | (ReportStatus::InProgress, ReportStatus::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Cancelled)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report priority enum matching database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "report_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

/// How urgently responders are needed
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "emergency_level", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmergencyLevel {
    #[default]
    Standard,
    Urgent,
    LifeThreatening,
}

impl EmergencyLevel {
    pub const ALL: [EmergencyLevel; 3] = [
        EmergencyLevel::Standard,
        EmergencyLevel::Urgent,
        EmergencyLevel::LifeThreatening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyLevel::Standard => "standard",
            EmergencyLevel::Urgent => "urgent",
            EmergencyLevel::LifeThreatening => "life_threatening",
        }
    }
}

impl std::str::FromStr for EmergencyLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmergencyLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or(())
    }
}

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    /// Identity id of the submitting citizen
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

impl Report {
    pub fn is_assigned_to(&self, agency_id: Uuid) -> bool {
        self.assigned_agency_ids.contains(&agency_id)
    }
}

/// Data for creating a new report. Status is always `pending` on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateReport {
    pub user_id: String,
    pub category_id: String,
    pub title: Option<String>,
    pub description: String,
    pub priority: Priority,
    pub emergency_level: EmergencyLevel,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
}

/// Field changes a citizen may make while the report is pending.
/// `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportContentChanges {
    pub category_id: Option<String>,
    /// `Some(None)` removes the title
    pub title: Option<Option<String>>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub emergency_level: Option<EmergencyLevel>,
    pub location: Option<(f64, f64)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine_edges() {
        use ReportStatus::*;

        let allowed = [
            (Pending, Acknowledged),
            (Pending, Cancelled),
            (Acknowledged, InProgress),
            (InProgress, Resolved),
            (InProgress, Cancelled),
        ];

        for from in ReportStatus::ALL {
            for to in ReportStatus::ALL {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{} -> {}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for status in ReportStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            assert!(ReportStatus::ALL
                .into_iter()
                .all(|next| !status.can_transition_to(next)));
        }
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!("critical".parse::<Priority>(), Ok(Priority::Critical));
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(
            "life_threatening".parse::<EmergencyLevel>(),
            Ok(EmergencyLevel::LifeThreatening)
        );
        assert_eq!(
            serde_json::to_string(&ReportStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(EmergencyLevel::default(), EmergencyLevel::Standard);
    }
}
