//! HTTP tests for the claim intake API
//!
//! The router runs against in-memory collaborators; requests go through
//! `axum-test` with real multipart bodies.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;

use core_kernel::ClaimId;
use domain_claims::ports::mock::{CaptionBehavior, MockCaptioner, MockClaimStore, MockNotifier};
use domain_claims::ClaimSubmission;
use interface_api::config::ApiConfig;
use interface_api::dto::claims::SUCCESS_MESSAGE;
use interface_api::{create_router, AppState};
use test_utils::{
    assert_record, CaptionFixtures, ClaimSubmissionBuilder, IntakeHarness, PhotoFixtures,
    SubmissionFixtures,
};

fn server(harness: &IntakeHarness, config: ApiConfig) -> TestServer {
    let state = AppState::new(harness.service(), config);
    TestServer::new(create_router(state)).unwrap()
}

fn default_server(harness: &IntakeHarness) -> TestServer {
    server(harness, ApiConfig::default())
}

/// Encodes a submission the way the intake form does
fn form(submission: ClaimSubmission) -> MultipartForm {
    let mut form = MultipartForm::new();
    if let Some(name) = submission.name {
        form = form.add_text("name", name);
    }
    if let Some(email) = submission.email {
        form = form.add_text("email", email);
    }
    if let Some(description) = submission.description {
        form = form.add_text("accidentDescription", description);
    }
    for photo in submission.photos {
        let mut part = Part::bytes(photo.bytes.to_vec());
        if let Some(filename) = photo.filename {
            part = part.file_name(filename);
        }
        part = part.mime_type("image/jpeg");
        form = form.add_part("carPhotos", part);
    }
    form
}

// ============================================================================
// Submission Tests
// ============================================================================

mod submit_tests {
    use super::*;

    #[tokio::test]
    async fn test_fender_bender_is_stored_and_forwarded() {
        let harness = IntakeHarness::new().with_captioner(MockCaptioner::new().on_image(
            PhotoFixtures::rear_bumper().bytes,
            CaptionBehavior::caption(CaptionFixtures::rear_bumper()),
        ));
        let server = default_server(&harness);

        let response = server
            .post("/submit-claim")
            .multipart(form(SubmissionFixtures::fender_bender()))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], SUCCESS_MESSAGE);

        let claim_id: ClaimId = body["claimId"].as_str().unwrap().parse().unwrap();
        let record = harness.store.get(claim_id).await.expect("record stored");
        assert_record(&record, "Ann", "a@x.com", "fender bender", &[CaptionFixtures::rear_bumper()]);

        let notifier = harness.notifier.as_ref().unwrap();
        assert_eq!(notifier.call_count(), 1);
        assert_eq!(notifier.delivered().await[0].id(), claim_id);
    }

    #[tokio::test]
    async fn test_submission_without_photos() {
        let harness = IntakeHarness::new();
        let server = default_server(&harness);

        let response = server
            .post("/submit-claim")
            .multipart(form(SubmissionFixtures::text_only()))
            .await;

        response.assert_status_ok();
        assert_eq!(harness.captioner.call_count(), 0);
        let records = harness.store.records().await;
        assert_eq!(records.len(), 1);
        assert!(records[0].photo_captions().is_empty());
    }

    #[tokio::test]
    async fn test_photos_are_captioned_in_upload_order() {
        let harness = IntakeHarness::new().with_captioner(
            MockCaptioner::new()
                .on_image(PhotoFixtures::rear_bumper().bytes, CaptionBehavior::caption("bumper"))
                .on_image(PhotoFixtures::unreadable().bytes, CaptionBehavior::Fail("bad image".into()))
                .on_image(PhotoFixtures::side_door().bytes, CaptionBehavior::caption("door")),
        );
        let server = default_server(&harness);

        let submission = ClaimSubmissionBuilder::new()
            .with_photo(PhotoFixtures::rear_bumper())
            .with_photo(PhotoFixtures::unreadable())
            .with_photo(PhotoFixtures::side_door())
            .build();
        let response = server.post("/submit-claim").multipart(form(submission)).await;

        response.assert_status_ok();
        assert_eq!(harness.captioner.call_count(), 3);
        let records = harness.store.records().await;
        assert_eq!(records[0].photo_captions(), ["bumper", "door"]);
    }

    #[tokio::test]
    async fn test_blank_photo_part_is_skipped() {
        let harness = IntakeHarness::new();
        let server = default_server(&harness);

        let submission = ClaimSubmissionBuilder::new().with_photo(PhotoFixtures::blank()).build();
        let response = server.post("/submit-claim").multipart(form(submission)).await;

        response.assert_status_ok();
        assert_eq!(harness.captioner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_fields_are_ignored() {
        let harness = IntakeHarness::new();
        let server = default_server(&harness);

        let multipart = form(SubmissionFixtures::text_only())
            .add_text("policyNumber", "P-123")
            .add_part("attachment", Part::bytes(b"ignored".to_vec()).file_name("notes.txt"));
        let response = server.post("/submit-claim").multipart(multipart).await;

        response.assert_status_ok();
        assert_eq!(harness.store.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_notification_failure_still_succeeds() {
        let harness = IntakeHarness::new().with_notifier(MockNotifier::failing("workflow disabled"));
        let server = default_server(&harness);

        let response = server
            .post("/submit-claim")
            .multipart(form(SubmissionFixtures::text_only()))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let claim_id: ClaimId = body["claimId"].as_str().unwrap().parse().unwrap();
        assert!(harness.store.get(claim_id).await.is_some());
    }

    #[tokio::test]
    async fn test_each_submission_gets_a_new_id() {
        let harness = IntakeHarness::new().without_notifier();
        let server = default_server(&harness);

        let mut ids = Vec::new();
        for _ in 0..5 {
            let response = server
                .post("/submit-claim")
                .multipart(form(ClaimSubmissionBuilder::new().build()))
                .await;
            let body: Value = response.json();
            ids.push(body["claimId"].as_str().unwrap().to_string());
        }

        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        test_utils::assert_unique_ids(&harness.store.records().await);
    }
}

// ============================================================================
// Failure Tests
// ============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_email_is_bad_request() {
        let harness = IntakeHarness::new();
        let server = default_server(&harness);

        let submission = ClaimSubmissionBuilder::new()
            .without_email()
            .with_photo(PhotoFixtures::rear_bumper())
            .build();
        let response = server.post("/submit-claim").multipart(form(submission)).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "Missing required field: email");
        assert_eq!(harness.external_calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_description_is_missing() {
        let harness = IntakeHarness::new();
        let server = default_server(&harness);

        let submission = ClaimSubmissionBuilder::new().with_description("   ").build();
        let response = server.post("/submit-claim").multipart(form(submission)).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "Missing required field: accidentDescription");
    }

    #[tokio::test]
    async fn test_legacy_status_reports_500() {
        let harness = IntakeHarness::new();
        let config = ApiConfig {
            legacy_error_status: true,
            ..ApiConfig::default()
        };
        let server = server(&harness, config);

        let submission = ClaimSubmissionBuilder::new().without_name().build();
        let response = server.post("/submit-claim").multipart(form(submission)).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Missing required field: name");
    }

    #[tokio::test]
    async fn test_store_failure_is_server_error() {
        let harness = IntakeHarness::new().with_store(MockClaimStore::failing("cosmos unavailable"));
        let server = default_server(&harness);

        let response = server
            .post("/submit-claim")
            .multipart(form(SubmissionFixtures::text_only()))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json();
        assert_eq!(body["error"], "persistence_error");
        assert!(body["message"].as_str().unwrap().contains("cosmos unavailable"));
        assert_eq!(harness.notifier.as_ref().unwrap().call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_multipart_body_is_bad_request() {
        let harness = IntakeHarness::new();
        let server = default_server(&harness);

        let response = server
            .post("/submit-claim")
            .json(&serde_json::json!({"name": "Ann", "email": "a@x.com"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
        assert_eq!(harness.external_calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let harness = IntakeHarness::new();
        let config = ApiConfig {
            body_limit_bytes: 1024,
            ..ApiConfig::default()
        };
        let server = server(&harness, config);

        let multipart = form(SubmissionFixtures::text_only())
            .add_part("carPhotos", Part::bytes(vec![0u8; 8 * 1024]).file_name("huge.jpg"));
        let response = server.post("/submit-claim").multipart(multipart).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(harness.store.upsert_count(), 0);
    }
}

// ============================================================================
// Form, Health and Middleware Tests
// ============================================================================

mod surface_tests {
    use super::*;

    #[tokio::test]
    async fn test_form_page_posts_to_submit_claim() {
        let server = default_server(&IntakeHarness::new());

        let response = server.get("/").await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("action=\"/submit-claim\""));
        assert!(html.contains("name=\"carPhotos\""));
        assert!(html.contains("name=\"accidentDescription\""));
    }

    #[tokio::test]
    async fn test_health() {
        let server = default_server(&IntakeHarness::new());

        let response = server.get("/health").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_when_store_is_healthy() {
        let server = default_server(&IntakeHarness::new());

        let response = server.get("/health/ready").await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["notifications_enabled"], true);
        assert_eq!(body["claim_store"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_not_ready_when_store_is_down() {
        let harness = IntakeHarness::new()
            .with_store(MockClaimStore::failing("unreachable"))
            .without_notifier();
        let server = default_server(&harness);

        let response = server.get("/health/ready").await;

        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert_eq!(body["notifications_enabled"], false);
        assert_eq!(body["claim_store"]["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let server = default_server(&IntakeHarness::new());
        let request_id = core_kernel::RequestId::new().to_string();

        let response = server
            .get("/health")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_str(&request_id).unwrap(),
            )
            .await;

        assert_eq!(response.header("x-request-id").to_str().unwrap(), request_id);
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let server = default_server(&IntakeHarness::new());

        let response = server.get("/health").await;

        let header = response.header("x-request-id");
        assert!(header.to_str().unwrap().parse::<core_kernel::RequestId>().is_ok());
    }
}
