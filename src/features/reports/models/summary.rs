use std::collections::BTreeMap;

/// Report counts for one access scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSummary {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub by_emergency_level: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
}
