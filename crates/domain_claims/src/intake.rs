//! Claim intake orchestration
//!
//! `ClaimIntakeService` turns one `ClaimSubmission` into one stored
//! `ClaimRecord`:
//!
//! ```text
//! validate -> ClaimId -> caption photos (fan-out, join) -> assemble -> upsert -> notify
//! ```
//!
//! Only validation and persistence can fail a submission. A photo whose
//! captioning fails or times out contributes no caption, and a failed
//! notification is logged and reported in the receipt.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{ClaimId, HealthCheckResult, OperationMetadata, PortError};

use crate::claim::{ClaimRecord, ClaimSubmission, PhotoCaption, PhotoUpload, ValidatedSubmission};
use crate::error::IntakeError;
use crate::ports::{CaptioningPort, ClaimStorePort, NotificationPort};

/// Outcome of one submission
pub type ClaimResult = Result<ClaimReceipt, IntakeError>;

/// Limits applied to each collaborator call
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Upper bound for one captioning call
    pub caption_timeout: Duration,
    /// Upper bound for the store upsert
    pub store_timeout: Duration,
    /// Upper bound for the notification call
    pub notify_timeout: Duration,
    /// Captioning calls allowed in flight at once for one submission
    pub max_concurrent_captions: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            caption_timeout: Duration::from_secs(15),
            store_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(10),
            max_concurrent_captions: 4,
        }
    }
}

/// A photo that produced no caption because the service call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionFailure {
    pub photo_index: usize,
    pub filename: String,
    pub message: String,
    pub timed_out: bool,
}

/// What happened to the downstream notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The sink accepted the record
    Delivered,
    /// No sink is configured
    Skipped,
    /// The sink rejected the record or did not answer in time
    Failed { message: String },
}

/// Successful submission
#[derive(Debug, Clone)]
pub struct ClaimReceipt {
    pub claim_id: ClaimId,
    pub record: ClaimRecord,
    pub caption_failures: Vec<CaptionFailure>,
    pub notification: NotificationOutcome,
}

/// Orchestrates claim submissions against the injected collaborators
pub struct ClaimIntakeService {
    captioner: Arc<dyn CaptioningPort>,
    store: Arc<dyn ClaimStorePort>,
    notifier: Option<Arc<dyn NotificationPort>>,
    config: IntakeConfig,
}

impl fmt::Debug for ClaimIntakeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClaimIntakeService")
            .field("config", &self.config)
            .field("notifications_enabled", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}

impl ClaimIntakeService {
    /// Creates a service without a notification sink
    pub fn new(
        captioner: Arc<dyn CaptioningPort>,
        store: Arc<dyn ClaimStorePort>,
        config: IntakeConfig,
    ) -> Self {
        Self {
            captioner,
            store,
            notifier: None,
            config,
        }
    }

    /// Attaches the notification sink
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationPort>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Returns the active limits
    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Returns true if stored records are forwarded downstream
    pub fn notifications_enabled(&self) -> bool {
        self.notifier.is_some()
    }

    /// Reports the health of the claim store
    pub async fn store_health(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    /// Processes one submission
    ///
    /// # Errors
    ///
    /// * `IntakeError::Validation` - a required field is missing; no
    ///   collaborator has been called
    /// * `IntakeError::Persistence` - the store rejected the record or timed
    ///   out; the notification sink has not been called
    #[instrument(skip_all, fields(claim_id = tracing::field::Empty, photos = submission.photos.len()))]
    pub async fn handle(&self, submission: ClaimSubmission) -> ClaimResult {
        let ValidatedSubmission {
            name,
            email,
            description,
            photos,
        } = submission.validate().inspect_err(|e| {
            info!(error = %e, "Rejected claim submission");
        })?;

        let claim_id = ClaimId::new();
        tracing::Span::current().record("claim_id", tracing::field::display(claim_id));

        let metadata = OperationMetadata::with_correlation_id(claim_id.to_string());

        let (captions, caption_failures) = self.caption_photos(photos, &metadata).await;

        let record = ClaimRecord::assemble(claim_id, name, email, description, captions);

        self.persist(&record, &metadata).await?;

        let notification = self.notify(&record, &metadata).await;

        info!(
            captions = record.photo_captions().len(),
            caption_failures = caption_failures.len(),
            notification = ?notification,
            "Claim submitted"
        );

        Ok(ClaimReceipt {
            claim_id,
            record,
            caption_failures,
            notification,
        })
    }

    /// Captions every photo, at most `max_concurrent_captions` at a time
    ///
    /// Returns once every call has completed, failed or timed out.
    async fn caption_photos(
        &self,
        photos: Vec<PhotoUpload>,
        metadata: &OperationMetadata,
    ) -> (Vec<PhotoCaption>, Vec<CaptionFailure>) {
        let limit = self.config.max_concurrent_captions.max(1);

        let outcomes: Vec<(PhotoCaption, Option<CaptionFailure>)> = stream::iter(photos.into_iter().enumerate())
            .map(|(index, photo)| self.caption_one(index, photo, metadata))
            .buffered(limit)
            .collect()
            .await;

        let mut captions = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (caption, failure) in outcomes {
            captions.push(caption);
            failures.extend(failure);
        }

        (captions, failures)
    }

    async fn caption_one(
        &self,
        photo_index: usize,
        photo: PhotoUpload,
        metadata: &OperationMetadata,
    ) -> (PhotoCaption, Option<CaptionFailure>) {
        let filename = photo.display_name(photo_index);
        let call = self.captioner.describe(photo.bytes, metadata);

        match bounded(self.config.caption_timeout, "describe_image", call).await {
            Ok(candidates) => {
                // First candidate only; a blank text counts as no caption
                let caption = candidates
                    .into_iter()
                    .next()
                    .map(|c| c.text)
                    .filter(|text| !text.trim().is_empty());

                debug!(photo_index, filename = %filename, captioned = caption.is_some(), "Captioned photo");
                (PhotoCaption { photo_index, caption }, None)
            }
            Err(e) => {
                warn!(photo_index, filename = %filename, error = %e, "Captioning failed, continuing without caption");
                let failure = CaptionFailure {
                    photo_index,
                    filename,
                    message: e.to_string(),
                    timed_out: e.is_timeout(),
                };
                (PhotoCaption { photo_index, caption: None }, Some(failure))
            }
        }
    }

    async fn persist(&self, record: &ClaimRecord, metadata: &OperationMetadata) -> Result<(), IntakeError> {
        let call = self.store.upsert_claim(record, metadata);

        bounded(self.config.store_timeout, "upsert_claim", call)
            .await
            .map_err(|source| {
                error!(error = %source, "Failed to store claim");
                IntakeError::Persistence {
                    claim_id: record.id(),
                    source,
                }
            })
    }

    async fn notify(&self, record: &ClaimRecord, metadata: &OperationMetadata) -> NotificationOutcome {
        let Some(notifier) = &self.notifier else {
            return NotificationOutcome::Skipped;
        };

        match bounded(self.config.notify_timeout, "notify_claim", notifier.notify(record, metadata)).await {
            Ok(()) => NotificationOutcome::Delivered,
            Err(e) => {
                warn!(error = %e, "Claim notification failed, claim remains stored");
                NotificationOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Runs a collaborator call under a deadline
async fn bounded<T, F>(limit: Duration, operation: &str, call: F) -> Result<T, PortError>
where
    F: Future<Output = Result<T, PortError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PortError::timeout(operation, limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{PhotoUpload, FIELD_DESCRIPTION, FIELD_EMAIL, FIELD_NAME};
    use crate::ports::Caption;
    use crate::ports::mock::{CaptionBehavior, MockCaptioner, MockClaimStore, MockNotifier};
    use proptest::prelude::*;
    use std::collections::HashSet;

    struct Harness {
        captioner: Arc<MockCaptioner>,
        store: Arc<MockClaimStore>,
        notifier: Arc<MockNotifier>,
        service: ClaimIntakeService,
    }

    fn harness_with(
        captioner: MockCaptioner,
        store: MockClaimStore,
        notifier: MockNotifier,
        config: IntakeConfig,
    ) -> Harness {
        let captioner = Arc::new(captioner);
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);
        let service = ClaimIntakeService::new(captioner.clone(), store.clone(), config)
            .with_notifier(notifier.clone());

        Harness {
            captioner,
            store,
            notifier,
            service,
        }
    }

    fn harness(captioner: MockCaptioner) -> Harness {
        harness_with(captioner, MockClaimStore::new(), MockNotifier::new(), IntakeConfig::default())
    }

    #[test]
    fn test_debug_shows_limits_and_notifier() {
        let service = harness(MockCaptioner::new()).service;
        let rendered = format!("{:?}", service);

        assert!(rendered.contains("max_concurrent_captions: 4"));
        assert!(rendered.contains("notifications_enabled: true"));
    }

    fn short_timeouts() -> IntakeConfig {
        IntakeConfig {
            caption_timeout: Duration::from_millis(50),
            store_timeout: Duration::from_millis(50),
            notify_timeout: Duration::from_millis(50),
            max_concurrent_captions: 4,
        }
    }

    fn photo(tag: &str) -> PhotoUpload {
        PhotoUpload::new(format!("{}.jpg", tag), tag.as_bytes().to_vec())
    }

    fn ann() -> ClaimSubmission {
        ClaimSubmission::new("Ann", "a@x.com", "fender bender")
    }

    #[tokio::test]
    async fn test_single_photo_example() {
        let h = harness(
            MockCaptioner::new().on_image(&b"photoA"[..], CaptionBehavior::caption("a dented rear bumper")),
        );

        let receipt = h.service.handle(ann().with_photo(photo("photoA"))).await.unwrap();

        let stored = h.store.get(receipt.claim_id).await.unwrap();
        assert_eq!(stored.name(), "Ann");
        assert_eq!(stored.email(), "a@x.com");
        assert_eq!(stored.description(), "fender bender");
        assert_eq!(stored.photo_captions(), ["a dented rear bumper".to_string()]);
        assert_eq!(receipt.notification, NotificationOutcome::Delivered);
        assert_eq!(h.notifier.delivered().await, vec![stored]);
    }

    #[tokio::test]
    async fn test_zero_photos_still_persists() {
        let h = harness(MockCaptioner::captioning_all("unused"));

        let receipt = h.service.handle(ann()).await.unwrap();

        assert!(receipt.record.photo_captions().is_empty());
        assert_eq!(h.captioner.call_count(), 0);
        assert_eq!(h.store.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_fields_make_no_external_calls() {
        let cases = [
            (ClaimSubmission { name: None, ..ann() }, FIELD_NAME),
            (ClaimSubmission { email: Some(String::new()), ..ann() }, FIELD_EMAIL),
            (ClaimSubmission { description: None, ..ann() }, FIELD_DESCRIPTION),
        ];

        for (submission, expected_field) in cases {
            let h = harness(MockCaptioner::captioning_all("a car"));
            let result = h.service.handle(submission.with_photo(photo("p"))).await;

            match result {
                Err(IntakeError::Validation { field }) => assert_eq!(field, expected_field),
                other => panic!("Expected validation error, got {:?}", other),
            }
            assert_eq!(h.captioner.call_count(), 0);
            assert_eq!(h.store.upsert_count(), 0);
            assert_eq!(h.notifier.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_failed_and_empty_captions_contribute_nothing() {
        let captioner = MockCaptioner::new()
            .on_image(&b"one"[..], CaptionBehavior::caption("a scratched hood"))
            .on_image(&b"two"[..], CaptionBehavior::Fail("vision 503".to_string()))
            .on_image(&b"three"[..], CaptionBehavior::Empty)
            .on_image(&b"four"[..], CaptionBehavior::caption("a broken headlight"))
            .on_image(&b"five"[..], CaptionBehavior::caption("   "));
        let h = harness(captioner);

        let submission = ["one", "two", "three", "four", "five"]
            .into_iter()
            .fold(ann(), |s, tag| s.with_photo(photo(tag)));
        let receipt = h.service.handle(submission).await.unwrap();

        assert_eq!(
            receipt.record.photo_captions(),
            ["a scratched hood".to_string(), "a broken headlight".to_string()]
        );
        assert_eq!(receipt.caption_failures.len(), 1);
        assert_eq!(receipt.caption_failures[0].photo_index, 1);
        assert_eq!(receipt.caption_failures[0].filename, "two.jpg");
        assert!(!receipt.caption_failures[0].timed_out);
        assert_eq!(h.captioner.call_count(), 5);
    }

    #[tokio::test]
    async fn test_only_first_caption_is_used() {
        let captioner = MockCaptioner::new().with_default(CaptionBehavior::Captions(vec![
            Caption::new("a red car", 0.8),
            Caption::new("a red vehicle parked", 0.4),
        ]));
        let h = harness(captioner);

        let receipt = h.service.handle(ann().with_photo(photo("x"))).await.unwrap();

        assert_eq!(receipt.record.photo_captions(), ["a red car".to_string()]);
    }

    #[tokio::test]
    async fn test_caption_timeout_is_absorbed() {
        let captioner = MockCaptioner::new()
            .on_image(&b"slow"[..], CaptionBehavior::Hang)
            .on_image(&b"fast"[..], CaptionBehavior::caption("a flat tyre"));
        let h = harness_with(captioner, MockClaimStore::new(), MockNotifier::new(), short_timeouts());

        let receipt = h
            .service
            .handle(ann().with_photo(photo("slow")).with_photo(photo("fast")))
            .await
            .unwrap();

        assert_eq!(receipt.record.photo_captions(), ["a flat tyre".to_string()]);
        assert!(receipt.caption_failures[0].timed_out);
        assert_eq!(h.store.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_captioning_respects_concurrency_bound() {
        let captioner = MockCaptioner::captioning_all("a car").with_latency(Duration::from_millis(20));
        let config = IntakeConfig {
            max_concurrent_captions: 2,
            ..IntakeConfig::default()
        };
        let h = harness_with(captioner, MockClaimStore::new(), MockNotifier::new(), config);

        let submission = (0..6).fold(ann(), |s, i| s.with_photo(photo(&format!("p{}", i))));
        let receipt = h.service.handle(submission).await.unwrap();

        assert_eq!(receipt.record.photo_captions().len(), 6);
        assert!(h.captioner.max_concurrency() <= 2);
        assert!(h.captioner.max_concurrency() >= 1);
    }

    #[tokio::test]
    async fn test_store_failure_skips_notification() {
        let h = harness_with(
            MockCaptioner::captioning_all("a car"),
            MockClaimStore::failing("cosmos unreachable"),
            MockNotifier::new(),
            IntakeConfig::default(),
        );

        let err = h.service.handle(ann().with_photo(photo("p"))).await.unwrap_err();

        assert_eq!(err.kind(), "persistence_error");
        assert!(err.to_string().contains("cosmos unreachable"));
        assert_eq!(h.store.upsert_count(), 1);
        assert_eq!(h.notifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_store_timeout_is_fatal() {
        let h = harness_with(
            MockCaptioner::new(),
            MockClaimStore::hanging(),
            MockNotifier::new(),
            short_timeouts(),
        );

        match h.service.handle(ann()).await {
            Err(IntakeError::Persistence { source, .. }) => assert!(source.is_timeout()),
            other => panic!("Expected persistence error, got {:?}", other),
        }
        assert_eq!(h.notifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_success() {
        let h = harness_with(
            MockCaptioner::new(),
            MockClaimStore::new(),
            MockNotifier::failing("logic app rejected"),
            IntakeConfig::default(),
        );

        let receipt = h.service.handle(ann()).await.unwrap();

        assert!(matches!(receipt.notification, NotificationOutcome::Failed { .. }));
        assert!(h.store.get(receipt.claim_id).await.is_some());
        assert_eq!(h.notifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_notification_timeout_keeps_success() {
        let h = harness_with(
            MockCaptioner::new(),
            MockClaimStore::new(),
            MockNotifier::hanging(),
            short_timeouts(),
        );

        let receipt = h.service.handle(ann()).await.unwrap();

        match receipt.notification {
            NotificationOutcome::Failed { message } => assert!(message.contains("Timeout")),
            other => panic!("Expected failed notification, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_without_notifier_is_skipped() {
        let store = Arc::new(MockClaimStore::new());
        let service = ClaimIntakeService::new(Arc::new(MockCaptioner::new()), store.clone(), IntakeConfig::default());

        let receipt = service.handle(ann()).await.unwrap();

        assert!(!service.notifications_enabled());
        assert_eq!(receipt.notification, NotificationOutcome::Skipped);
        assert_eq!(store.upsert_count(), 1);
    }

    #[tokio::test]
    async fn test_each_run_issues_fresh_id() {
        let h = harness(MockCaptioner::new());
        let mut seen = HashSet::new();

        for _ in 0..25 {
            let receipt = h.service.handle(ann()).await.unwrap();
            assert_eq!(receipt.record.id(), receipt.claim_id);
            assert!(seen.insert(receipt.claim_id));
        }

        assert_eq!(h.store.upsert_count(), 25);
        assert_eq!(h.store.records().await.len(), 25);
    }

    proptest! {
        #[test]
        fn prop_caption_count_matches_captioned_subset(outcomes in proptest::collection::vec(0u8..3, 0..12)) {
            // 0 = caption, 1 = empty, 2 = failure
            let mut captioner = MockCaptioner::new();
            let mut submission = ann();
            for (i, outcome) in outcomes.iter().enumerate() {
                let bytes = format!("photo-{}", i).into_bytes();
                let behavior = match outcome {
                    0 => CaptionBehavior::caption(format!("caption {}", i)),
                    1 => CaptionBehavior::Empty,
                    _ => CaptionBehavior::Fail("boom".to_string()),
                };
                captioner = captioner.on_image(bytes.clone(), behavior);
                submission = submission.with_photo(PhotoUpload::new(format!("{}.jpg", i), bytes));
            }
            let expected: Vec<String> = outcomes
                .iter()
                .enumerate()
                .filter(|(_, o)| **o == 0)
                .map(|(i, _)| format!("caption {}", i))
                .collect();

            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let h = harness(captioner);
            let receipt = runtime.block_on(h.service.handle(submission)).unwrap();

            prop_assert_eq!(receipt.record.photo_captions(), expected.as_slice());
            prop_assert_eq!(h.store.upsert_count(), 1);
        }
    }
}
