use thiserror::Error;

use crate::core::error::AppError;

/// Why a submission was refused. Each stage of the pipeline fails with
/// exactly one of these.
#[derive(Debug, Error, PartialEq)]
pub enum SubmissionError {
    #[error("Authentication required")]
    Authentication,

    #[error("{0}")]
    Authorization(String),

    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("{0}")]
    Attachment(String),

    #[error("Failed to save report: {0}")]
    Persistence(String),
}

impl From<SubmissionError> for AppError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Authentication => {
                AppError::Unauthorized("Authentication required".to_string())
            }
            SubmissionError::Authorization(msg) => AppError::Forbidden(msg),
            SubmissionError::Validation(msgs) => AppError::InvalidFields(msgs),
            SubmissionError::Attachment(msg) => AppError::Attachment(msg),
            SubmissionError::Persistence(msg) => AppError::Internal(msg),
        }
    }
}
