use std::sync::Arc;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::access::resolve_access;
use crate::features::users::repository::ProfileRepository;

use super::SubmissionError;

/// Only active citizens may submit reports
pub struct RoleGate {
    profiles: Arc<dyn ProfileRepository>,
}

impl RoleGate {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn check(&self, user: &AuthenticatedUser) -> Result<(), SubmissionError> {
        let profile = self
            .profiles
            .find_by_id(user.id())
            .await
            .map_err(|e| SubmissionError::Persistence(e.to_string()))?
            .ok_or_else(|| {
                SubmissionError::Authorization("No profile registered for this account".to_string())
            })?;

        let ctx = resolve_access(&profile).map_err(|e| match e {
            AppError::Forbidden(msg) => SubmissionError::Authorization(msg),
            other => SubmissionError::Authorization(other.to_string()),
        })?;

        if !ctx.is_citizen() {
            tracing::debug!("Rejected submission from {} with role {}", ctx.user_id, ctx.role);
            return Err(SubmissionError::Authorization(
                "Only citizens can submit reports".to_string(),
            ));
        }

        Ok(())
    }
}
