use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::reports::models::{CreateReport, CreateReportUpdate, Report, ReportStatus};
use crate::features::reports::repository::ReportRepository;
use crate::shared::constants::SUBMISSION_NOTE;

use super::SubmissionError;

/// Persists a new report and its first audit entry.
///
/// The two inserts are not atomic. The report row is the success boundary:
/// a failed audit insert is logged and the report is still returned.
pub struct ReportWriter {
    reports: Arc<dyn ReportRepository>,
}

impl ReportWriter {
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    pub async fn write(&self, data: &CreateReport) -> Result<Report, SubmissionError> {
        let report = self
            .reports
            .insert_report(data)
            .await
            .map_err(|e| match e {
                AppError::BadRequest(msg) => SubmissionError::Validation(vec![msg]),
                other => SubmissionError::Persistence(other.to_string()),
            })?;

        let update = CreateReportUpdate {
            report_id: report.id,
            user_id: report.user_id.clone(),
            status: ReportStatus::Pending,
            notes: Some(SUBMISSION_NOTE.to_string()),
        };

        if let Err(e) = self.reports.insert_update(&update).await {
            tracing::warn!(
                "Report {} saved but its submission entry was not recorded: {:?}",
                report.id,
                e
            );
        }

        Ok(report)
    }
}
