mod report_handler;
mod submission_handler;

pub use report_handler::*;
pub use submission_handler::*;

use std::sync::Arc;

use crate::features::reports::services::ReportService;
use crate::features::reports::submission::SubmissionService;

/// State for report handlers
#[derive(Clone)]
pub struct ReportState {
    pub report_service: Arc<ReportService>,
    pub submission_service: Arc<SubmissionService>,
}
