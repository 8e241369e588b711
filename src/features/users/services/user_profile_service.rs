use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::access::AccessContext;
use crate::features::users::dtos::{
    RegisterProfileDto, UpdateProfileDto, UpdateUserAccessDto, UserProfileResponseDto,
};
use crate::features::users::models::{CreateUserProfile, Role};
use crate::features::users::repository::ProfileRepository;

/// Service for profile self-service and admin user management
pub struct UserProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl UserProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Get the caller's own profile
    pub async fn get_profile(&self, user: &AuthenticatedUser) -> Result<UserProfileResponseDto> {
        self.profiles
            .find_by_id(user.id())
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Profile not registered".to_string()))
    }

    /// Register the caller as a citizen
    pub async fn register(
        &self,
        user: &AuthenticatedUser,
        dto: RegisterProfileDto,
    ) -> Result<UserProfileResponseDto> {
        if self.profiles.find_by_id(user.id()).await?.is_some() {
            return Err(AppError::Conflict("Profile already registered".to_string()));
        }

        let email = user
            .email
            .clone()
            .or(dto.email)
            .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

        let profile = self
            .profiles
            .create(&CreateUserProfile {
                id: user.id().to_string(),
                email,
                display_name: dto.display_name,
                role: Role::Citizen,
                agency_id: None,
            })
            .await?;

        Ok(profile.into())
    }

    /// Update the caller's display name. An omitted name is left as is; a
    /// blank one clears it.
    pub async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        dto: UpdateProfileDto,
    ) -> Result<UserProfileResponseDto> {
        let Some(requested) = dto.display_name.as_deref() else {
            return self.get_profile(user).await;
        };
        let display_name = Some(requested.trim()).filter(|s| !s.is_empty());

        let profile = self
            .profiles
            .update_display_name(user.id(), display_name)
            .await?;
        Ok(profile.into())
    }

    /// List profiles (admin)
    pub async fn list(
        &self,
        role: Option<Role>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserProfileResponseDto>, i64)> {
        let (items, total) = self.profiles.list(role, offset, limit).await?;
        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    /// Change role, agency link or active flag of another account (admin).
    ///
    /// Only a superadmin may touch accounts that are or would become admins.
    /// Switching away from the agency role drops the agency link.
    pub async fn update_access(
        &self,
        actor: &AccessContext,
        target_id: &str,
        dto: UpdateUserAccessDto,
    ) -> Result<UserProfileResponseDto> {
        if actor.user_id == target_id {
            return Err(AppError::Forbidden(
                "You cannot change your own access".to_string(),
            ));
        }

        let current = self
            .profiles
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", target_id)))?;

        let role = dto.role.unwrap_or(current.role);
        if (current.role.has_admin_access() || role.has_admin_access())
            && actor.role != Role::SuperAdmin
        {
            return Err(AppError::Forbidden(
                "Only a superadmin can grant or revoke admin access".to_string(),
            ));
        }

        let agency_id = match role {
            Role::Agency => Some(dto.agency_id.or(current.agency_id).ok_or_else(|| {
                AppError::Validation("An agency account must be linked to an agency".to_string())
            })?),
            _ => None,
        };
        let is_active = dto.is_active.unwrap_or(current.is_active);

        let profile = self
            .profiles
            .update_access(target_id, role, agency_id, is_active)
            .await?;

        tracing::info!(
            "User {} updated access of {}: role={}, active={}",
            actor.user_id,
            target_id,
            profile.role,
            profile.is_active
        );

        Ok(profile.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{authenticated, profile, InMemoryProfileRepository};
    use uuid::Uuid;

    fn admin_ctx(role: Role) -> AccessContext {
        AccessContext {
            user_id: "actor".to_string(),
            role,
            agency_id: None,
        }
    }

    fn service_with(profiles: Vec<crate::features::users::models::UserProfile>) -> UserProfileService {
        UserProfileService::new(Arc::new(InMemoryProfileRepository::with_profiles(profiles)))
    }

    #[tokio::test]
    async fn test_register_creates_citizen() {
        let service = service_with(vec![]);
        let user = authenticated("new-user");

        let created = service
            .register(&user, RegisterProfileDto::default())
            .await
            .unwrap();

        assert_eq!(created.role, Role::Citizen);
        assert_eq!(created.email, "new-user@example.com");
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let service = service_with(vec![profile("u1", Role::Citizen)]);
        let result = service
            .register(&authenticated("u1"), RegisterProfileDto::default())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_without_any_email_fails() {
        let service = service_with(vec![]);
        let mut user = authenticated("u1");
        user.email = None;

        let result = service.register(&user, RegisterProfileDto::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_profile_keeps_name_when_omitted() {
        let mut named = profile("u1", Role::Citizen);
        named.display_name = Some("Maria".to_string());
        let service = service_with(vec![named]);
        let user = authenticated("u1");

        let unchanged = service
            .update_profile(&user, UpdateProfileDto { display_name: None })
            .await
            .unwrap();
        assert_eq!(unchanged.display_name.as_deref(), Some("Maria"));

        let renamed = service
            .update_profile(
                &user,
                UpdateProfileDto {
                    display_name: Some("  Maria Santos ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.display_name.as_deref(), Some("Maria Santos"));

        let cleared = service
            .update_profile(
                &user,
                UpdateProfileDto {
                    display_name: Some("   ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.display_name, None);
    }

    #[tokio::test]
    async fn test_update_profile_requires_registration() {
        let service = service_with(vec![]);
        let result = service
            .update_profile(&authenticated("ghost"), UpdateProfileDto { display_name: None })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_admin_links_agency_account() {
        let service = service_with(vec![profile("target", Role::Citizen)]);
        let agency_id = Uuid::now_v7();

        let updated = service
            .update_access(
                &admin_ctx(Role::Admin),
                "target",
                UpdateUserAccessDto {
                    role: Some(Role::Agency),
                    agency_id: Some(agency_id),
                    is_active: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Agency);
        assert_eq!(updated.agency_id, Some(agency_id));
    }

    #[tokio::test]
    async fn test_agency_role_without_agency_is_rejected() {
        let service = service_with(vec![profile("target", Role::Citizen)]);
        let result = service
            .update_access(
                &admin_ctx(Role::Admin),
                "target",
                UpdateUserAccessDto {
                    role: Some(Role::Agency),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_only_superadmin_grants_admin() {
        let service = service_with(vec![profile("target", Role::Citizen)]);
        let promote = UpdateUserAccessDto {
            role: Some(Role::Admin),
            ..Default::default()
        };

        let denied = service
            .update_access(&admin_ctx(Role::Admin), "target", promote.clone())
            .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let granted = service
            .update_access(&admin_ctx(Role::SuperAdmin), "target", promote)
            .await
            .unwrap();
        assert_eq!(granted.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_admin_cannot_deactivate_other_admin() {
        let service = service_with(vec![profile("target", Role::Admin)]);
        let result = service
            .update_access(
                &admin_ctx(Role::Admin),
                "target",
                UpdateUserAccessDto {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_demoting_agency_drops_link() {
        let mut target = profile("target", Role::Agency);
        target.agency_id = Some(Uuid::now_v7());
        let service = service_with(vec![target]);

        let updated = service
            .update_access(
                &admin_ctx(Role::Admin),
                "target",
                UpdateUserAccessDto {
                    role: Some(Role::Citizen),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Citizen);
        assert_eq!(updated.agency_id, None);
    }

    #[tokio::test]
    async fn test_cannot_change_own_access() {
        let service = service_with(vec![profile("actor", Role::Admin)]);
        let result = service
            .update_access(
                &admin_ctx(Role::SuperAdmin),
                "actor",
                UpdateUserAccessDto::default(),
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
