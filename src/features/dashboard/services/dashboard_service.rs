use std::sync::Arc;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::dashboard::dtos::DashboardSummaryDto;
use crate::features::reports::repository::{ReportRepository, ReportScope};
use crate::features::users::access::AccessResolver;

/// Aggregated report counts, scoped like the report list
pub struct DashboardService {
    reports: Arc<dyn ReportRepository>,
    access: Arc<AccessResolver>,
}

impl DashboardService {
    pub fn new(reports: Arc<dyn ReportRepository>, access: Arc<AccessResolver>) -> Self {
        Self { reports, access }
    }

    pub async fn summary(&self, user: &AuthenticatedUser) -> Result<DashboardSummaryDto> {
        let ctx = self.access.resolve(user).await?;
        let summary = self
            .reports
            .summarize(&ReportScope::for_access(&ctx))
            .await?;
        Ok(summary.into())
    }
}
