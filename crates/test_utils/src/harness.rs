//! Intake Test Harness
//!
//! Wires a `ClaimIntakeService` to the in-memory mock collaborators and
//! keeps handles on them for call-count assertions.

use std::sync::Arc;
use std::time::Duration;

use domain_claims::ports::mock::{MockCaptioner, MockClaimStore, MockNotifier};
use domain_claims::{ClaimIntakeService, IntakeConfig};

/// Limits short enough for timeout tests to finish quickly
pub fn fast_intake_config() -> IntakeConfig {
    IntakeConfig {
        caption_timeout: Duration::from_millis(100),
        store_timeout: Duration::from_millis(100),
        notify_timeout: Duration::from_millis(100),
        max_concurrent_captions: 4,
    }
}

/// Mock collaborators shared with the service under test
pub struct IntakeHarness {
    pub captioner: Arc<MockCaptioner>,
    pub store: Arc<MockClaimStore>,
    pub notifier: Option<Arc<MockNotifier>>,
    pub config: IntakeConfig,
}

impl Default for IntakeHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeHarness {
    /// Healthy collaborators: no captions, accepting store, accepting notifier
    pub fn new() -> Self {
        Self {
            captioner: Arc::new(MockCaptioner::new()),
            store: Arc::new(MockClaimStore::new()),
            notifier: Some(Arc::new(MockNotifier::new())),
            config: fast_intake_config(),
        }
    }

    pub fn with_captioner(mut self, captioner: MockCaptioner) -> Self {
        self.captioner = Arc::new(captioner);
        self
    }

    pub fn with_store(mut self, store: MockClaimStore) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn with_notifier(mut self, notifier: MockNotifier) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Runs without a notification sink
    pub fn without_notifier(mut self) -> Self {
        self.notifier = None;
        self
    }

    pub fn with_config(mut self, config: IntakeConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the service over the current collaborators
    pub fn service(&self) -> ClaimIntakeService {
        let service = ClaimIntakeService::new(
            self.captioner.clone(),
            self.store.clone(),
            self.config.clone(),
        );

        match &self.notifier {
            Some(notifier) => service.with_notifier(notifier.clone()),
            None => service,
        }
    }

    /// Total calls made to any collaborator
    pub fn external_calls(&self) -> usize {
        self.captioner.call_count()
            + self.store.upsert_count()
            + self.notifier.as_ref().map_or(0, |n| n.call_count())
    }
}
