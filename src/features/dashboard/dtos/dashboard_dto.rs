use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::reports::models::{EmergencyLevel, Priority, ReportStatus, ReportSummary};

/// Report counts behind the dashboard charts.
///
/// Status, priority and emergency level always carry every known value
/// (zero when absent); categories only those that have reports.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryDto {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub by_emergency_level: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
}

fn with_zeros<'a>(
    keys: impl IntoIterator<Item = &'a str>,
    mut counts: BTreeMap<String, i64>,
) -> BTreeMap<String, i64> {
    for key in keys {
        counts.entry(key.to_string()).or_insert(0);
    }
    counts
}

impl From<ReportSummary> for DashboardSummaryDto {
    fn from(s: ReportSummary) -> Self {
        Self {
            total: s.total,
            by_status: with_zeros(ReportStatus::ALL.iter().map(|v| v.as_str()), s.by_status),
            by_priority: with_zeros(Priority::ALL.iter().map(|v| v.as_str()), s.by_priority),
            by_emergency_level: with_zeros(
                EmergencyLevel::ALL.iter().map(|v| v.as_str()),
                s.by_emergency_level,
            ),
            by_category: s.by_category,
        }
    }
}
