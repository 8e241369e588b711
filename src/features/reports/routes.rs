use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, put},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::ReportService;
use crate::features::reports::submission::SubmissionService;
use crate::shared::constants::MAX_ATTACHMENT_SIZE;

/// Room for the form fields plus an oversized image, so the size check
/// reports an attachment error instead of the transport rejecting the body
const SUBMISSION_BODY_LIMIT: usize = MAX_ATTACHMENT_SIZE * 2;

/// Report routes. Authentication is applied by the caller.
pub fn routes(
    report_service: Arc<ReportService>,
    submission_service: Arc<SubmissionService>,
) -> Router {
    let state = ReportState {
        report_service,
        submission_service,
    };

    Router::new()
        .route(
            "/api/reports",
            get(handlers::list_reports).post(handlers::submit_report),
        )
        .route(
            "/api/reports/{id}",
            get(handlers::get_report).patch(handlers::edit_report),
        )
        .route(
            "/api/reports/{id}/status",
            patch(handlers::update_report_status),
        )
        .route(
            "/api/reports/{id}/updates",
            get(handlers::list_report_updates),
        )
        .layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT))
        .with_state(state)
}

/// Admin report routes, nested under `/api/admin`
pub fn admin_routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/reports/{id}/agencies",
            put(handlers::assign_report_agencies),
        )
        .with_state(report_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ReportsConfig;
    use crate::features::reports::models::ReportStatus;
    use crate::features::users::models::Role;
    use crate::features::users::AccessResolver;
    use crate::shared::test_helpers::{
        agency_profile, profile, report, with_user, InMemoryBlobStorage,
        InMemoryProfileRepository, InMemoryReportRepository,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use uuid::Uuid;

    struct Harness {
        reports: InMemoryReportRepository,
        router: Router,
    }

    fn harness(seed: Vec<crate::features::reports::models::Report>) -> Harness {
        let profiles = Arc::new(InMemoryProfileRepository::with_profiles(vec![
            profile("citizen", Role::Citizen),
            agency_profile("responder", Uuid::new_v4()),
        ]));
        let reports = InMemoryReportRepository::with_reports(seed);
        let access = Arc::new(AccessResolver::new(profiles.clone()));

        let report_service = Arc::new(ReportService::new(Arc::new(reports.clone()), access));
        let submission_service = Arc::new(SubmissionService::new(
            profiles,
            Arc::new(reports.clone()),
            Arc::new(InMemoryBlobStorage::default()),
            &ReportsConfig::default(),
        ));

        Harness {
            reports,
            router: routes(report_service, submission_service),
        }
    }

    fn server_as(router: Router, user_id: &str) -> TestServer {
        TestServer::new(with_user(router, user_id)).unwrap()
    }

    fn fire_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("category_id", "fire")
            .add_text("description", "Smoke coming from the building")
            .add_text("priority", "high")
    }

    #[tokio::test]
    async fn test_citizen_submits_multipart_report() {
        let h = harness(vec![]);
        let server = server_as(h.router, "citizen");

        let form = fire_form().add_part(
            "image",
            Part::bytes(vec![1u8; 256])
                .file_name("scene.png")
                .mime_type("image/png"),
        );
        let response = server.post("/api/reports").multipart(form).await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["priority"], "high");
        assert!(body["data"]["image_url"].as_str().is_some());
        assert_eq!(h.reports.reports().len(), 1);
        assert_eq!(h.reports.updates().len(), 1);
    }

    #[tokio::test]
    async fn test_short_description_lists_message() {
        let h = harness(vec![]);
        let server = server_as(h.router, "citizen");

        let form = MultipartForm::new()
            .add_text("category_id", "fire")
            .add_text("description", "fire");
        let response = server.post("/api/reports").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["errors"],
            json!(["Description must be at least 10 characters long"])
        );
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_agency_cannot_submit() {
        let h = harness(vec![]);
        let server = server_as(h.router, "responder");

        let response = server.post("/api/reports").multipart(fire_form()).await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_anonymous_submission_is_unauthorized() {
        let h = harness(vec![]);
        let server = TestServer::new(h.router).unwrap();

        let response = server.post("/api/reports").multipart(fire_form()).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_gif_attachment_is_rejected() {
        let h = harness(vec![]);
        let server = server_as(h.router, "citizen");

        let form = fire_form().add_part(
            "image",
            Part::bytes(vec![1u8; 64])
                .file_name("scene.gif")
                .mime_type("image/gif"),
        );
        let response = server.post("/api/reports").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(h.reports.reports().is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_own_reports_with_meta() {
        let h = harness(vec![report("citizen"), report("citizen"), report("neighbor")]);
        let server = server_as(h.router, "citizen");

        let response = server.get("/api/reports").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_citizen_cancel_then_history() {
        let pending = report("citizen");
        let id = pending.id;
        let h = harness(vec![pending]);
        let server = server_as(h.router, "citizen");

        let response = server
            .patch(&format!("/api/reports/{}/status", id))
            .json(&json!({ "status": "cancelled" }))
            .await;
        response.assert_status_ok();
        assert_eq!(h.reports.reports()[0].status, ReportStatus::Cancelled);

        let history: Value = server
            .get(&format!("/api/reports/{}/updates", id))
            .await
            .json();
        assert_eq!(history["data"][0]["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_citizen_cannot_acknowledge() {
        let pending = report("citizen");
        let id = pending.id;
        let h = harness(vec![pending]);
        let server = server_as(h.router, "citizen");

        server
            .patch(&format!("/api/reports/{}/status", id))
            .json(&json!({ "status": "acknowledged" }))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_someone_elses_report_is_not_found() {
        let theirs = report("neighbor");
        let id = theirs.id;
        let h = harness(vec![theirs]);
        let server = server_as(h.router, "citizen");

        server
            .get(&format!("/api/reports/{}", id))
            .await
            .assert_status_not_found();
    }
}
