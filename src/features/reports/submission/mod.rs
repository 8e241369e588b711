//! Citizen report submission.
//!
//! A submission runs four stages in order, each awaited before the next:
//!
//! 1. [`RoleGate`] - the caller must be an active citizen
//! 2. input validation ([`SubmitReportDto::into_validated`])
//! 3. [`AttachmentUploader`] - optional image, stored before the report
//! 4. [`ReportWriter`] - report row, then the initial audit entry
//!
//! The first failing stage ends the submission. Nothing is retried.

mod error;
mod role_gate;
mod uploader;
mod writer;

use std::sync::Arc;

use chrono::Utc;

use crate::core::config::ReportsConfig;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::reports::dtos::SubmitReportDto;
use crate::features::reports::models::{CreateReport, Report};
use crate::features::reports::repository::ReportRepository;
use crate::features::users::repository::ProfileRepository;
use crate::modules::storage::BlobStorage;

pub use error::SubmissionError;
pub use uploader::AttachmentInput;

use role_gate::RoleGate;
use uploader::AttachmentUploader;
use writer::ReportWriter;

pub struct SubmissionService {
    gate: RoleGate,
    uploader: AttachmentUploader,
    writer: ReportWriter,
    cleanup_orphaned_attachments: bool,
}

impl SubmissionService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        reports: Arc<dyn ReportRepository>,
        storage: Arc<dyn BlobStorage>,
        config: &ReportsConfig,
    ) -> Self {
        Self {
            gate: RoleGate::new(profiles),
            uploader: AttachmentUploader::new(storage),
            writer: ReportWriter::new(reports),
            cleanup_orphaned_attachments: config.cleanup_orphaned_attachments,
        }
    }

    pub async fn submit(
        &self,
        identity: Option<&AuthenticatedUser>,
        dto: SubmitReportDto,
        attachment: Option<AttachmentInput>,
    ) -> Result<Report, SubmissionError> {
        let user = identity.ok_or(SubmissionError::Authentication)?;

        self.gate.check(user).await?;

        let input = dto.into_validated().map_err(SubmissionError::Validation)?;

        let stored = self
            .uploader
            .upload(user.id(), attachment, Utc::now())
            .await?;

        let (latitude, longitude) = input.location.unzip();
        let data = CreateReport {
            user_id: user.id().to_string(),
            category_id: input.category_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            emergency_level: input.emergency_level,
            latitude,
            longitude,
            image_url: stored.as_ref().map(|s| s.url.clone()),
        };

        match self.writer.write(&data).await {
            Ok(report) => {
                tracing::info!(
                    "Report {} submitted by {} ({}, {})",
                    report.id,
                    report.user_id,
                    report.category_id,
                    report.priority.as_str()
                );
                Ok(report)
            }
            Err(e) => {
                if let Some(stored) = stored.as_ref() {
                    if self.cleanup_orphaned_attachments {
                        self.uploader.discard(stored).await;
                    } else {
                        tracing::warn!("Attachment {} left without a report", stored.key);
                    }
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reports::models::{Priority, ReportStatus};
    use crate::features::users::models::{Role, UserProfile};
    use crate::shared::constants::{MAX_ATTACHMENT_SIZE, SUBMISSION_NOTE};
    use crate::shared::test_helpers::{
        agency_profile, authenticated, profile, InMemoryBlobStorage, InMemoryProfileRepository,
        InMemoryReportRepository,
    };
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use tokio_test::assert_ok;
    use uuid::Uuid;

    struct Harness {
        reports: InMemoryReportRepository,
        storage: InMemoryBlobStorage,
        service: SubmissionService,
    }

    fn harness_with(profiles: Vec<UserProfile>, config: ReportsConfig) -> Harness {
        let reports = InMemoryReportRepository::default();
        let storage = InMemoryBlobStorage::default();
        let service = SubmissionService::new(
            Arc::new(InMemoryProfileRepository::with_profiles(profiles)),
            Arc::new(reports.clone()),
            Arc::new(storage.clone()),
            &config,
        );
        Harness {
            reports,
            storage,
            service,
        }
    }

    fn harness() -> Harness {
        harness_with(
            vec![
                profile("citizen", Role::Citizen),
                agency_profile("responder", Uuid::new_v4()),
            ],
            ReportsConfig::default(),
        )
    }

    fn fire_report() -> SubmitReportDto {
        SubmitReportDto {
            category_id: Some("fire".to_string()),
            description: Some("Smoke coming from the building".to_string()),
            priority: Some("high".to_string()),
            ..Default::default()
        }
    }

    fn image(content_type: &str, size: usize) -> Option<AttachmentInput> {
        Some(AttachmentInput {
            file_name: Some("scene.jpg".to_string()),
            content_type: content_type.to_string(),
            data: vec![7u8; size],
        })
    }

    #[tokio::test]
    async fn test_fire_report_is_saved_pending_with_one_audit_entry() {
        let h = harness();

        let report = assert_ok!(
            h.service
                .submit(Some(&authenticated("citizen")), fire_report(), None)
                .await
        );

        assert_eq!(report.status, ReportStatus::Pending);
        assert_eq!(report.priority, Priority::High);
        assert_eq!(report.category_id, "fire");
        assert_eq!(report.user_id, "citizen");
        assert_eq!(report.image_url, None);

        assert_eq!(h.reports.reports().len(), 1);
        let updates = h.reports.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].report_id, report.id);
        assert_eq!(updates[0].status, ReportStatus::Pending);
        assert_eq!(updates[0].notes.as_deref(), Some(SUBMISSION_NOTE));
    }

    #[tokio::test]
    async fn test_short_description_writes_nothing() {
        let h = harness();
        let dto = SubmitReportDto {
            description: Some("fire".to_string()),
            ..fire_report()
        };

        let err = h
            .service
            .submit(Some(&authenticated("citizen")), dto, image("image/png", 64))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SubmissionError::Validation(vec![
                "Description must be at least 10 characters long".to_string()
            ])
        );
        assert_eq!(err.to_string(), "Description must be at least 10 characters long");
        assert!(h.reports.reports().is_empty());
        assert!(h.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_point_outside_bounding_box_is_invalid() {
        let h = harness();
        let dto = SubmitReportDto {
            latitude: Some("22.5".to_string()),
            longitude: Some("121.0".to_string()),
            ..fire_report()
        };

        assert!(matches!(
            h.service
                .submit(Some(&authenticated("citizen")), dto, None)
                .await,
            Err(SubmissionError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_agency_is_refused_before_validation() {
        let h = harness();
        // Invalid payload: the role check must still come first
        let dto = SubmitReportDto::default();

        assert!(matches!(
            h.service
                .submit(Some(&authenticated("responder")), dto, None)
                .await,
            Err(SubmissionError::Authorization(_))
        ));
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_missing_identity_is_an_authentication_error() {
        let h = harness();
        assert_eq!(
            h.service.submit(None, fire_report(), None).await.unwrap_err(),
            SubmissionError::Authentication
        );
    }

    #[tokio::test]
    async fn test_oversized_or_wrong_type_attachment_writes_no_report() {
        let h = harness();

        for attachment in [
            image("image/jpeg", MAX_ATTACHMENT_SIZE + 1),
            image("image/gif", 128),
        ] {
            assert!(matches!(
                h.service
                    .submit(Some(&authenticated("citizen")), fire_report(), attachment)
                    .await,
                Err(SubmissionError::Attachment(_))
            ));
        }
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_attachment_url_is_stored_on_report() {
        let h = harness();

        let report = h
            .service
            .submit(
                Some(&authenticated("citizen")),
                fire_report(),
                image("image/webp", 2048),
            )
            .await
            .unwrap();

        let keys = h.storage.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("public/reports/citizen/"));
        assert!(keys[0].ends_with(".webp"));
        assert!(report.image_url.unwrap().ends_with(&keys[0]));
    }

    #[tokio::test]
    async fn test_upload_failure_aborts_before_report_write() {
        let h = harness();
        h.storage.fail_uploads();

        assert!(matches!(
            h.service
                .submit(
                    Some(&authenticated("citizen")),
                    fire_report(),
                    image("image/png", 16)
                )
                .await,
            Err(SubmissionError::Attachment(_))
        ));
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_same_payload_twice_creates_two_reports() {
        let h = harness();
        let detail: String = Sentence(3..6).fake();
        let dto = SubmitReportDto {
            description: Some(format!("Flood report: {}", detail)),
            ..fire_report()
        };

        let first = h
            .service
            .submit(Some(&authenticated("citizen")), dto.clone(), None)
            .await
            .unwrap();
        let second = h
            .service
            .submit(Some(&authenticated("citizen")), dto, None)
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(h.reports.reports().len(), 2);
        assert_eq!(h.reports.updates().len(), 2);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_submission() {
        let h = harness();
        h.reports.fail_update_inserts();

        let report = h
            .service
            .submit(Some(&authenticated("citizen")), fire_report(), None)
            .await
            .unwrap();

        assert_eq!(h.reports.reports()[0].id, report.id);
        assert!(h.reports.updates().is_empty());
    }

    #[tokio::test]
    async fn test_failed_report_insert_removes_uploaded_attachment() {
        let h = harness();
        h.reports.fail_report_inserts();

        let err = h
            .service
            .submit(
                Some(&authenticated("citizen")),
                fire_report(),
                image("image/png", 16),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Persistence(_)));
        assert!(h.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_validation_error() {
        let h = harness();
        h.reports.reject_category("fire");

        let err = h
            .service
            .submit(
                Some(&authenticated("citizen")),
                fire_report(),
                image("image/png", 16),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SubmissionError::Validation(vec!["Unknown category 'fire'".to_string()])
        );
        assert!(h.reports.reports().is_empty());
        assert!(h.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn test_failed_cleanup_keeps_persistence_error() {
        let h = harness();
        h.reports.fail_report_inserts();
        h.storage.fail_deletes();

        let err = h
            .service
            .submit(
                Some(&authenticated("citizen")),
                fire_report(),
                image("image/png", 16),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::Persistence(_)));
        assert_eq!(h.storage.keys().len(), 1);
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_orphan_cleanup_can_be_disabled() {
        let h = harness_with(
            vec![profile("citizen", Role::Citizen)],
            ReportsConfig {
                cleanup_orphaned_attachments: false,
            },
        );
        h.reports.fail_report_inserts();

        assert!(h
            .service
            .submit(
                Some(&authenticated("citizen")),
                fire_report(),
                image("image/png", 16),
            )
            .await
            .is_err());
        assert_eq!(h.storage.keys().len(), 1);
    }
}
