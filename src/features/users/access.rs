//! Capability resolution.
//!
//! Every gate (report scoping, transitions, admin routes) goes through
//! [`resolve_access`] so role checks are made against one tagged value
//! instead of ad-hoc string comparisons.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::{Role, UserProfile};
use crate::features::users::repository::ProfileRepository;

/// What the current caller is allowed to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccessContext {
    pub user_id: String,
    pub role: Role,
    /// Set only for agency accounts
    pub agency_id: Option<Uuid>,
}

impl AccessContext {
    pub fn is_citizen(&self) -> bool {
        self.role == Role::Citizen
    }

    pub fn has_admin_access(&self) -> bool {
        self.role.has_admin_access()
    }
}

/// Resolve a loaded profile into an access context.
///
/// Inactive accounts get no capability at all. Agency accounts must be
/// linked to an agency.
pub fn resolve_access(profile: &UserProfile) -> Result<AccessContext> {
    if !profile.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    let agency_id = match profile.role {
        Role::Agency => Some(profile.agency_id.ok_or_else(|| {
            AppError::Forbidden("Agency account is not linked to an agency".to_string())
        })?),
        _ => None,
    };

    Ok(AccessContext {
        user_id: profile.id.clone(),
        role: profile.role,
        agency_id,
    })
}

/// Loads the caller's profile and resolves it
pub struct AccessResolver {
    profiles: Arc<dyn ProfileRepository>,
}

impl AccessResolver {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    pub async fn resolve(&self, user: &AuthenticatedUser) -> Result<AccessContext> {
        let profile = self.profiles.find_by_id(user.id()).await?.ok_or_else(|| {
            AppError::Forbidden("No profile registered for this account".to_string())
        })?;

        resolve_access(&profile)
    }
}
