use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::agencies::dtos::{AgencyResponseDto, CreateAgencyDto, UpdateAgencyDto};
use crate::features::agencies::models::Agency;
use crate::shared::types::PaginationQuery;

const AGENCY_COLUMNS: &str =
    "id, name, agency_type, contact, address, latitude, longitude, created_at, updated_at";

/// Service for agency operations
pub struct AgencyService {
    pool: PgPool,
}

impl AgencyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List agencies ordered by name, with the total count
    pub async fn list(&self, params: &PaginationQuery) -> Result<(Vec<AgencyResponseDto>, i64)> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agencies")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count agencies: {:?}", e);
                AppError::Database(e)
            })?;

        let sql = format!(
            "SELECT {} FROM agencies ORDER BY name LIMIT $1 OFFSET $2",
            AGENCY_COLUMNS
        );
        let agencies = sqlx::query_as::<_, Agency>(&sql)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list agencies: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((agencies.into_iter().map(|a| a.into()).collect(), total.0))
    }

    pub async fn get(&self, id: Uuid) -> Result<AgencyResponseDto> {
        let sql = format!("SELECT {} FROM agencies WHERE id = $1", AGENCY_COLUMNS);
        let agency = sqlx::query_as::<_, Agency>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get agency: {:?}", e);
                AppError::Database(e)
            })?;

        agency
            .map(|a| a.into())
            .ok_or_else(|| AppError::NotFound(format!("Agency {} not found", id)))
    }

    pub async fn create(&self, dto: CreateAgencyDto) -> Result<AgencyResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO agencies (name, agency_type, contact, address, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            AGENCY_COLUMNS
        );
        let agency = sqlx::query_as::<_, Agency>(&sql)
            .bind(&dto.name)
            .bind(&dto.agency_type)
            .bind(&dto.contact)
            .bind(&dto.address)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create agency: {:?}", e);
                AppError::Database(e)
            })?;

        tracing::info!("Agency {} created ({})", agency.id, agency.name);
        Ok(agency.into())
    }

    pub async fn update(&self, id: Uuid, dto: UpdateAgencyDto) -> Result<AgencyResponseDto> {
        let sql = format!(
            r#"
            UPDATE agencies SET
                name = COALESCE($2, name),
                agency_type = COALESCE($3, agency_type),
                contact = COALESCE($4, contact),
                address = COALESCE($5, address),
                latitude = COALESCE($6, latitude),
                longitude = COALESCE($7, longitude),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            AGENCY_COLUMNS
        );
        let agency = sqlx::query_as::<_, Agency>(&sql)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.agency_type)
            .bind(&dto.contact)
            .bind(&dto.address)
            .bind(dto.latitude)
            .bind(dto.longitude)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update agency: {:?}", e);
                AppError::Database(e)
            })?;

        agency
            .map(|a| a.into())
            .ok_or_else(|| AppError::NotFound(format!("Agency {} not found", id)))
    }

    /// Delete an agency. Fails with a conflict while user profiles are linked to it.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM agencies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
                        return AppError::Conflict(
                            "Agency still has linked user profiles".to_string(),
                        );
                    }
                }
                tracing::error!("Failed to delete agency: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Agency {} not found", id)));
        }

        tracing::info!("Agency {} deleted", id);
        Ok(())
    }
}
