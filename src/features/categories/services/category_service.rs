use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::Category;

const CATEGORY_COLUMNS: &str =
    "id, name, color, tips, equipment, agency_ids, created_at, updated_at";

/// Map constraint violations to user-facing conflicts
fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            return AppError::Conflict("A category with this key already exists".to_string());
        }

        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::Conflict(
                "Category is still referenced by existing reports".to_string(),
            );
        }
    }

    tracing::error!("Category query failed: {:?}", e);
    AppError::Database(e)
}

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let sql = format!("SELECT {} FROM categories ORDER BY name", CATEGORY_COLUMNS);
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list categories: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get category by key
    pub async fn get(&self, id: &str) -> Result<CategoryResponseDto> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get category: {:?}", e);
                AppError::Database(e)
            })?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let sql = format!(
            r#"
            INSERT INTO categories (id, name, color, tips, equipment, agency_ids)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(&dto.id)
            .bind(&dto.name)
            .bind(&dto.color)
            .bind(&dto.tips)
            .bind(&dto.equipment)
            .bind(&dto.agency_ids)
            .fetch_one(&self.pool)
            .await
            .map_err(handle_db_error)?;

        tracing::info!("Category '{}' created", category.id);
        Ok(category.into())
    }

    pub async fn update(&self, id: &str, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let sql = format!(
            r#"
            UPDATE categories SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                tips = COALESCE($4, tips),
                equipment = COALESCE($5, equipment),
                agency_ids = COALESCE($6, agency_ids),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&dto.name)
            .bind(&dto.color)
            .bind(&dto.tips)
            .bind(&dto.equipment)
            .bind(&dto.agency_ids)
            .fetch_optional(&self.pool)
            .await
            .map_err(handle_db_error)?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", id)))
    }

    /// Delete a category. Fails with a conflict while reports still use it.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(handle_db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category '{}' not found", id)));
        }

        tracing::info!("Category '{}' deleted", id);
        Ok(())
    }
}
