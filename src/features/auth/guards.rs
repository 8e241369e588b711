//! Role-based authorization guards.
//!
//! The access middleware resolves the caller's profile into an
//! [`AccessContext`] and stores it in the request extensions; guards only
//! inspect that context.
//!
//! Role hierarchy (from highest to lowest):
//! - superadmin: everything, including granting admin access
//! - admin: categories, agencies, users, any report
//! - agency: reports assigned to its agency
//! - citizen: own reports

use crate::core::error::AppError;
use crate::features::users::access::AccessContext;
use axum::{extract::FromRequestParts, http::request::Parts};

fn access_from_parts(parts: &Parts) -> Result<AccessContext, AppError> {
    parts
        .extensions
        .get::<AccessContext>()
        .cloned()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-level access (admin or superadmin).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(ctx): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AccessContext);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = access_from_parts(parts)?;

        if !ctx.has_admin_access() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(ctx))
    }
}
