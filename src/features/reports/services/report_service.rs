use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::{
    EditReportDto, ReportResponseDto, ReportUpdateResponseDto, UpdateReportStatusDto,
};
use crate::features::reports::models::{CreateReportUpdate, Report, ReportStatus};
use crate::features::reports::repository::{ReportFilter, ReportRepository, ReportScope};
use crate::features::users::access::{AccessContext, AccessResolver};
use crate::features::users::models::Role;
use crate::shared::types::PaginationQuery;

/// Report lifecycle after submission: reading, editing, status changes and
/// agency assignment. Every call is scoped by the caller's access.
pub struct ReportService {
    reports: Arc<dyn ReportRepository>,
    access: Arc<AccessResolver>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportRepository>, access: Arc<AccessResolver>) -> Self {
        Self { reports, access }
    }

    pub async fn list(
        &self,
        user: &AuthenticatedUser,
        status: Option<ReportStatus>,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ReportResponseDto>, i64)> {
        let ctx = self.access.resolve(user).await?;
        let filter = ReportFilter {
            scope: ReportScope::for_access(&ctx),
            status,
        };

        let (items, total) = self
            .reports
            .list(&filter, pagination.offset(), pagination.limit())
            .await?;

        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<ReportResponseDto> {
        let ctx = self.access.resolve(user).await?;
        Ok(self.find_in_scope(&ctx, id).await?.into())
    }

    /// Owner edit while the report is still pending. Not a transition, so
    /// no audit entry is written.
    pub async fn edit(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: EditReportDto,
    ) -> Result<ReportResponseDto> {
        let ctx = self.access.resolve(user).await?;
        let report = self.find_in_scope(&ctx, id).await?;

        if !ctx.is_citizen() || report.user_id != ctx.user_id {
            return Err(AppError::Forbidden(
                "Only the reporting citizen can edit a report".to_string(),
            ));
        }
        if report.status != ReportStatus::Pending {
            return Err(AppError::Conflict(
                "Only pending reports can be edited".to_string(),
            ));
        }

        let changes = dto.into_changes().map_err(AppError::InvalidFields)?;
        if changes.is_empty() {
            return Err(AppError::Validation("No changes supplied".to_string()));
        }

        let updated = self
            .reports
            .update_content(id, &changes)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Report is no longer pending and cannot be edited".to_string())
            })?;

        tracing::info!("Report {} edited by {}", id, ctx.user_id);
        Ok(updated.into())
    }

    /// Move a report along the status state machine.
    ///
    /// Citizens may only cancel their own pending reports. Agencies act on
    /// reports assigned to them; admins on any report.
    pub async fn transition(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateReportStatusDto,
    ) -> Result<ReportResponseDto> {
        let ctx = self.access.resolve(user).await?;
        let report = self.find_in_scope(&ctx, id).await?;
        let next = dto.status;

        if ctx.role == Role::Citizen
            && !(report.status == ReportStatus::Pending && next == ReportStatus::Cancelled)
        {
            return Err(AppError::Forbidden(
                "Citizens can only cancel their own pending reports".to_string(),
            ));
        }

        if report.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Report is already {}",
                report.status
            )));
        }

        if !report.status.can_transition_to(next) {
            return Err(AppError::Conflict(format!(
                "Report cannot move from {} to {}",
                report.status, next
            )));
        }

        let notes = dto
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| default_note(next));

        let update = CreateReportUpdate {
            report_id: id,
            user_id: ctx.user_id.clone(),
            status: next,
            notes: Some(notes),
        };

        let moved = self
            .reports
            .apply_transition(report.status, &update)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("Report status changed concurrently, reload and retry".to_string())
            })?;

        Ok(moved.into())
    }

    /// Replace the set of agencies a report is assigned to (admin only;
    /// enforced by the route guard).
    pub async fn assign_agencies(
        &self,
        actor: &AccessContext,
        id: Uuid,
        agency_ids: Vec<Uuid>,
    ) -> Result<ReportResponseDto> {
        if !actor.has_admin_access() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        let mut unique = Vec::with_capacity(agency_ids.len());
        for agency_id in agency_ids {
            if !unique.contains(&agency_id) {
                unique.push(agency_id);
            }
        }

        let report = self.reports.set_agencies(id, &unique).await?;
        tracing::info!(
            "Report {} assigned to {} agencies by {}",
            id,
            unique.len(),
            actor.user_id
        );
        Ok(report.into())
    }

    /// Audit history, oldest first
    pub async fn updates(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
    ) -> Result<Vec<ReportUpdateResponseDto>> {
        let ctx = self.access.resolve(user).await?;
        self.find_in_scope(&ctx, id).await?;

        let updates = self.reports.list_updates(id).await?;
        Ok(updates.into_iter().map(Into::into).collect())
    }

    /// Reports outside the caller's scope are reported as missing
    async fn find_in_scope(&self, ctx: &AccessContext, id: Uuid) -> Result<Report> {
        let scope = ReportScope::for_access(ctx);
        self.reports
            .find_by_id(id)
            .await?
            .filter(|r| scope.includes(r))
            .ok_or_else(|| AppError::NotFound(format!("Report with id {} not found", id)))
    }
}

fn default_note(status: ReportStatus) -> String {
    format!("status changed to {}", status)
}
