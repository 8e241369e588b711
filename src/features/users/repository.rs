//! Profile storage seam.
//!
//! Services receive an `Arc<dyn ProfileRepository>`; production wires the
//! Postgres implementation, tests wire an in-memory double.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::users::models::{CreateUserProfile, Role, UserProfile};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Read one profile by identity id
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>>;

    async fn create(&self, data: &CreateUserProfile) -> Result<UserProfile>;

    async fn update_display_name(&self, id: &str, display_name: Option<&str>)
        -> Result<UserProfile>;

    /// Overwrite role, agency link and active flag in one write
    async fn update_access(
        &self,
        id: &str,
        role: Role,
        agency_id: Option<Uuid>,
        is_active: bool,
    ) -> Result<UserProfile>;

    /// Page through profiles, newest first, optionally filtered by role
    async fn list(
        &self,
        role: Option<Role>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserProfile>, i64)>;
}

const PROFILE_COLUMNS: &str =
    "id, email, display_name, role, agency_id, is_active, created_at, updated_at";

pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<UserProfile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get profile: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn create(&self, data: &CreateUserProfile) -> Result<UserProfile> {
        let sql = format!(
            r#"
            INSERT INTO user_profiles (id, email, display_name, role, agency_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(&data.id)
            .bind(&data.email)
            .bind(&data.display_name)
            .bind(data.role)
            .bind(data.agency_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create profile: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Created profile {} with role {}", profile.id, profile.role);
        Ok(profile)
    }

    async fn update_display_name(
        &self,
        id: &str,
        display_name: Option<&str>,
    ) -> Result<UserProfile> {
        let sql = format!(
            r#"
            UPDATE user_profiles
            SET display_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(display_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))
    }

    async fn update_access(
        &self,
        id: &str,
        role: Role,
        agency_id: Option<Uuid>,
        is_active: bool,
    ) -> Result<UserProfile> {
        let sql = format!(
            r#"
            UPDATE user_profiles
            SET role = $2, agency_id = $3, is_active = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(role)
            .bind(agency_id)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update profile access: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))?;

        tracing::info!(
            "Updated access for {}: role={}, agency={:?}, active={}",
            id,
            role,
            agency_id,
            is_active
        );
        Ok(profile)
    }

    async fn list(
        &self,
        role: Option<Role>,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<UserProfile>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_profiles WHERE ($1::user_role IS NULL OR role = $1)",
        )
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count profiles: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            SELECT {PROFILE_COLUMNS}
            FROM user_profiles
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#
        );
        let items = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(role)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list profiles: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, total))
    }
}
