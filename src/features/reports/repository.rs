//! Report persistence.
//!
//! Services depend on [`ReportRepository`]; [`PgReportRepository`] is the
//! PostgreSQL implementation wired in `main`.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    CreateReport, CreateReportUpdate, Report, ReportContentChanges, ReportStatus, ReportSummary,
    ReportUpdate,
};
use crate::features::users::access::AccessContext;
use crate::features::users::models::Role;

/// Which reports a caller can see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// Reports submitted by this identity
    Owner(String),
    /// Reports assigned to this agency
    Agency(Uuid),
    All,
}

impl ReportScope {
    pub fn for_access(ctx: &AccessContext) -> Self {
        match (ctx.role, ctx.agency_id) {
            (Role::Admin | Role::SuperAdmin, _) => ReportScope::All,
            (Role::Agency, Some(agency_id)) => ReportScope::Agency(agency_id),
            // An unlinked agency account owns no reports, so it sees nothing
            _ => ReportScope::Owner(ctx.user_id.clone()),
        }
    }

    pub fn includes(&self, report: &Report) -> bool {
        match self {
            ReportScope::Owner(user_id) => &report.user_id == user_id,
            ReportScope::Agency(agency_id) => report.is_assigned_to(*agency_id),
            ReportScope::All => true,
        }
    }

    fn owner(&self) -> Option<&str> {
        match self {
            ReportScope::Owner(user_id) => Some(user_id),
            _ => None,
        }
    }

    fn agency(&self) -> Option<Uuid> {
        match self {
            ReportScope::Agency(agency_id) => Some(*agency_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportFilter {
    pub scope: ReportScope,
    pub status: Option<ReportStatus>,
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Insert a new report with status `pending`
    async fn insert_report(&self, data: &CreateReport) -> Result<Report>;

    async fn insert_update(&self, data: &CreateReportUpdate) -> Result<ReportUpdate>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    /// Newest first, with the total count for the filter
    async fn list(
        &self,
        filter: &ReportFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Report>, i64)>;

    /// Move a report from `expected` to `update.status` and append the audit
    /// entry in one transaction. Returns `None` when the report is no longer
    /// in `expected`.
    async fn apply_transition(
        &self,
        expected: ReportStatus,
        update: &CreateReportUpdate,
    ) -> Result<Option<Report>>;

    /// Apply content changes while the report is still pending. Returns
    /// `None` when it is not.
    async fn update_content(
        &self,
        id: Uuid,
        changes: &ReportContentChanges,
    ) -> Result<Option<Report>>;

    async fn set_agencies(&self, id: Uuid, agency_ids: &[Uuid]) -> Result<Report>;

    /// Audit history, oldest first
    async fn list_updates(&self, report_id: Uuid) -> Result<Vec<ReportUpdate>>;

    async fn summarize(&self, scope: &ReportScope) -> Result<ReportSummary>;
}

const REPORT_COLUMNS: &str = "id, user_id, category_id, title, description, priority, \
     emergency_level, latitude, longitude, image_url, status, assigned_agency_ids, \
     created_at, updated_at";

const UPDATE_COLUMNS: &str = "id, report_id, user_id, status, notes, created_at";

const SCOPE_FILTER: &str = "($1::text IS NULL OR user_id = $1) \
     AND ($2::uuid IS NULL OR $2 = ANY(assigned_agency_ids))";

/// Postgres names the category foreign key after its column
const CATEGORY_FKEY: &str = "reports_category_id_fkey";

fn handle_write_error(e: sqlx::Error, category_id: Option<&str>, action: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503"))
            && db_err.constraint() == Some(CATEGORY_FKEY)
        {
            return AppError::BadRequest(format!(
                "Unknown category '{}'",
                category_id.unwrap_or_default()
            ));
        }
    }
    tracing::error!("Failed to {}: {:?}", action, e);
    AppError::Database(e)
}

pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_by(&self, column: &str, scope: &ReportScope) -> Result<Vec<(String, i64)>> {
        let sql = format!(
            r#"
            SELECT {column}::text AS key, COUNT(*) AS count
            FROM reports
            WHERE {SCOPE_FILTER}
            GROUP BY {column}
            "#
        );
        sqlx::query_as::<_, (String, i64)>(&sql)
            .bind(scope.owner())
            .bind(scope.agency())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports by {}: {:?}", column, e);
                AppError::Database(e)
            })
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn insert_report(&self, data: &CreateReport) -> Result<Report> {
        let sql = format!(
            r#"
            INSERT INTO reports (
                user_id, category_id, title, description, priority,
                emergency_level, latitude, longitude, image_url, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(&data.user_id)
            .bind(&data.category_id)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.priority)
            .bind(data.emergency_level)
            .bind(data.latitude)
            .bind(data.longitude)
            .bind(&data.image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| handle_write_error(e, Some(&data.category_id), "create report"))?;

        tracing::info!("Created report {} for user {}", report.id, report.user_id);
        Ok(report)
    }

    async fn insert_update(&self, data: &CreateReportUpdate) -> Result<ReportUpdate> {
        let sql = format!(
            r#"
            INSERT INTO report_updates (report_id, user_id, status, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING {UPDATE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, ReportUpdate>(&sql)
            .bind(data.report_id)
            .bind(&data.user_id)
            .bind(data.status)
            .bind(&data.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report update: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list(
        &self,
        filter: &ReportFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Report>, i64)> {
        let where_clause =
            format!("{SCOPE_FILTER} AND ($3::report_status IS NULL OR status = $3)");

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reports WHERE {where_clause}"))
                .bind(filter.scope.owner())
                .bind(filter.scope.agency())
                .bind(filter.status)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count reports: {:?}", e);
                    AppError::Database(e)
                })?;

        let sql = format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE {where_clause}
            ORDER BY created_at DESC
            OFFSET $4 LIMIT $5
            "#
        );
        let items = sqlx::query_as::<_, Report>(&sql)
            .bind(filter.scope.owner())
            .bind(filter.scope.agency())
            .bind(filter.status)
            .bind(offset)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((items, total))
    }

    async fn apply_transition(
        &self,
        expected: ReportStatus,
        update: &CreateReportUpdate,
    ) -> Result<Option<Report>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            UPDATE reports
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(update.report_id)
            .bind(expected)
            .bind(update.status)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report status: {:?}", e);
                AppError::Database(e)
            })?;

        let Some(report) = report else {
            return Ok(None);
        };

        sqlx::query("INSERT INTO report_updates (report_id, user_id, status, notes) VALUES ($1, $2, $3, $4)")
            .bind(update.report_id)
            .bind(&update.user_id)
            .bind(update.status)
            .bind(&update.notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to record status change: {:?}", e);
                AppError::Database(e)
            })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status change: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Report {} moved {} -> {} by {}",
            report.id,
            expected,
            report.status,
            update.user_id
        );
        Ok(Some(report))
    }

    async fn update_content(
        &self,
        id: Uuid,
        changes: &ReportContentChanges,
    ) -> Result<Option<Report>> {
        let (latitude, longitude) = changes.location.unzip();
        let sql = format!(
            r#"
            UPDATE reports
            SET category_id = COALESCE($2, category_id),
                title = CASE WHEN $9 THEN $3 ELSE title END,
                description = COALESCE($4, description),
                priority = COALESCE($5, priority),
                emergency_level = COALESCE($6, emergency_level),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {REPORT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(&changes.category_id)
            .bind(changes.title.clone().flatten())
            .bind(&changes.description)
            .bind(changes.priority)
            .bind(changes.emergency_level)
            .bind(latitude)
            .bind(longitude)
            .bind(changes.title.is_some())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                handle_write_error(e, changes.category_id.as_deref(), "update report content")
            })
    }

    async fn set_agencies(&self, id: Uuid, agency_ids: &[Uuid]) -> Result<Report> {
        let sql = format!(
            r#"
            UPDATE reports
            SET assigned_agency_ids = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        );
        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(agency_ids)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to assign agencies: {:?}", e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        tracing::info!("Report {} assigned to {:?}", id, agency_ids);
        Ok(report)
    }

    async fn list_updates(&self, report_id: Uuid) -> Result<Vec<ReportUpdate>> {
        let sql = format!(
            "SELECT {UPDATE_COLUMNS} FROM report_updates WHERE report_id = $1 ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ReportUpdate>(&sql)
            .bind(report_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list report updates: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn summarize(&self, scope: &ReportScope) -> Result<ReportSummary> {
        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reports WHERE {SCOPE_FILTER}"))
                .bind(scope.owner())
                .bind(scope.agency())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to count reports: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok(ReportSummary {
            total,
            by_status: self.count_by("status", scope).await?.into_iter().collect(),
            by_priority: self.count_by("priority", scope).await?.into_iter().collect(),
            by_emergency_level: self
                .count_by("emergency_level", scope)
                .await?
                .into_iter()
                .collect(),
            by_category: self.count_by("category_id", scope).await?.into_iter().collect(),
        })
    }
}
