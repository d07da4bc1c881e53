//! Claim Intake Ports
//!
//! This module defines the collaborator interfaces the intake service
//! depends on. Each is a remote service in production and an in-memory
//! double in tests:
//!
//! - **CaptioningPort**: describes an image in natural language
//! - **ClaimStorePort**: durable keyed upsert of claim records
//! - **NotificationPort**: fire-and-forget delivery of a stored record
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::ports::{CaptioningPort, ClaimStorePort};
//! use std::sync::Arc;
//!
//! let captioner: Arc<dyn CaptioningPort> = Arc::new(VisionCaptioner::new(vision_config)?);
//! let store: Arc<dyn ClaimStorePort> = Arc::new(CosmosClaimStore::new(cosmos_config)?);
//! let service = ClaimIntakeService::new(captioner, store, IntakeConfig::default());
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, HealthCheckable, OperationMetadata, PortError};

use crate::claim::ClaimRecord;

/// A caption candidate returned by the captioning service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub confidence: f64,
}

impl Caption {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Port for the image captioning service
#[async_trait]
pub trait CaptioningPort: DomainPort {
    /// Describes an image
    ///
    /// # Arguments
    ///
    /// * `image` - Raw image bytes
    /// * `metadata` - Correlation data for tracing
    ///
    /// # Returns
    ///
    /// Zero or more caption candidates, best first
    async fn describe(
        &self,
        image: Bytes,
        metadata: &OperationMetadata,
    ) -> Result<Vec<Caption>, PortError>;
}

/// Port for the durable claim store
#[async_trait]
pub trait ClaimStorePort: DomainPort + HealthCheckable {
    /// Inserts the record, or overwrites the one stored under the same id
    ///
    /// Repeating the call with the same record is harmless.
    async fn upsert_claim(
        &self,
        record: &ClaimRecord,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError>;
}

/// Port for the downstream notification sink
#[async_trait]
pub trait NotificationPort: DomainPort {
    /// Delivers a stored record downstream
    ///
    /// Callers do not retry; a failure only means this delivery was lost.
    async fn notify(
        &self,
        record: &ClaimRecord,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError>;
}

/// Mock implementations of the intake ports for testing
///
/// The doubles record every invocation so tests can assert call counts, and
/// can be scripted to fail or hang to exercise timeouts.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, ClaimId, HealthCheckResult};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::RwLock;

    /// Scripted response of the mock captioner for one image
    #[derive(Debug, Clone)]
    pub enum CaptionBehavior {
        /// Return these captions
        Captions(Vec<Caption>),
        /// Return an empty caption list
        Empty,
        /// Fail as if the service were unavailable
        Fail(String),
        /// Never complete
        Hang,
    }

    impl CaptionBehavior {
        /// A single caption with full confidence
        pub fn caption(text: impl Into<String>) -> Self {
            CaptionBehavior::Captions(vec![Caption::new(text, 0.99)])
        }
    }

    /// Scripted response of the mock store or notifier
    #[derive(Debug, Clone)]
    pub enum CallBehavior {
        Succeed,
        Fail(String),
        Hang,
    }

    impl Default for CallBehavior {
        fn default() -> Self {
            CallBehavior::Succeed
        }
    }

    async fn hang<T>() -> T {
        futures::future::pending::<T>().await
    }

    /// In-memory captioner keyed by image content
    #[derive(Debug)]
    pub struct MockCaptioner {
        by_image: HashMap<Bytes, CaptionBehavior>,
        default: CaptionBehavior,
        latency: Option<Duration>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Default for MockCaptioner {
        fn default() -> Self {
            Self {
                by_image: HashMap::new(),
                default: CaptionBehavior::Empty,
                latency: None,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }
    }

    impl MockCaptioner {
        /// Creates a captioner that returns no captions
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a captioner that returns `text` for every image
        pub fn captioning_all(text: impl Into<String>) -> Self {
            Self::new().with_default(CaptionBehavior::caption(text))
        }

        /// Sets the behavior for images without a specific script
        pub fn with_default(mut self, behavior: CaptionBehavior) -> Self {
            self.default = behavior;
            self
        }

        /// Scripts the behavior for one image
        pub fn on_image(mut self, image: impl Into<Bytes>, behavior: CaptionBehavior) -> Self {
            self.by_image.insert(image.into(), behavior);
            self
        }

        /// Delays every call, used to observe concurrency
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Number of describe calls received
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Highest number of describe calls that were in progress at once
        pub fn max_concurrency(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockCaptioner {}

    #[async_trait]
    impl CaptioningPort for MockCaptioner {
        async fn describe(
            &self,
            image: Bytes,
            _metadata: &OperationMetadata,
        ) -> Result<Vec<Caption>, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            let behavior = self.by_image.get(&image).unwrap_or(&self.default).clone();
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match behavior {
                CaptionBehavior::Captions(captions) => Ok(captions),
                CaptionBehavior::Empty => Ok(Vec::new()),
                CaptionBehavior::Fail(message) => Err(PortError::ServiceUnavailable {
                    service: message,
                }),
                CaptionBehavior::Hang => hang().await,
            }
        }
    }

    /// In-memory claim store
    #[derive(Debug, Default)]
    pub struct MockClaimStore {
        records: Arc<RwLock<HashMap<ClaimId, ClaimRecord>>>,
        behavior: CallBehavior,
        upserts: AtomicUsize,
    }

    impl MockClaimStore {
        /// Creates a store that accepts every upsert
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store whose upserts fail
        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                behavior: CallBehavior::Fail(message.into()),
                ..Self::default()
            }
        }

        /// Creates a store whose upserts never complete
        pub fn hanging() -> Self {
            Self {
                behavior: CallBehavior::Hang,
                ..Self::default()
            }
        }

        /// Number of upsert calls received, successful or not
        pub fn upsert_count(&self) -> usize {
            self.upserts.load(Ordering::SeqCst)
        }

        /// Returns the stored record with the given id
        pub async fn get(&self, id: ClaimId) -> Option<ClaimRecord> {
            self.records.read().await.get(&id).cloned()
        }

        /// Returns every stored record
        pub async fn records(&self) -> Vec<ClaimRecord> {
            self.records.read().await.values().cloned().collect()
        }
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl HealthCheckable for MockClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            let (status, message) = match &self.behavior {
                CallBehavior::Succeed => (AdapterHealth::Healthy, "Mock store accepting writes".to_string()),
                CallBehavior::Fail(message) => (AdapterHealth::Unhealthy, message.clone()),
                CallBehavior::Hang => (AdapterHealth::Unhealthy, "Mock store hanging".to_string()),
            };

            HealthCheckResult {
                adapter_id: "mock-claim-store".to_string(),
                status,
                latency_ms: 0,
                message: Some(message),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ClaimStorePort for MockClaimStore {
        async fn upsert_claim(
            &self,
            record: &ClaimRecord,
            _metadata: &OperationMetadata,
        ) -> Result<(), PortError> {
            self.upserts.fetch_add(1, Ordering::SeqCst);

            match &self.behavior {
                CallBehavior::Succeed => {
                    self.records.write().await.insert(record.id(), record.clone());
                    Ok(())
                }
                CallBehavior::Fail(message) => Err(PortError::connection(message.clone())),
                CallBehavior::Hang => hang().await,
            }
        }
    }

    /// In-memory notification sink
    #[derive(Debug, Default)]
    pub struct MockNotifier {
        delivered: Arc<RwLock<Vec<ClaimRecord>>>,
        behavior: CallBehavior,
        calls: AtomicUsize,
    }

    impl MockNotifier {
        /// Creates a notifier that accepts every delivery
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a notifier whose deliveries fail
        pub fn failing(message: impl Into<String>) -> Self {
            Self {
                behavior: CallBehavior::Fail(message.into()),
                ..Self::default()
            }
        }

        /// Creates a notifier whose deliveries never complete
        pub fn hanging() -> Self {
            Self {
                behavior: CallBehavior::Hang,
                ..Self::default()
            }
        }

        /// Number of notify calls received, successful or not
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Records delivered successfully
        pub async fn delivered(&self) -> Vec<ClaimRecord> {
            self.delivered.read().await.clone()
        }
    }

    impl DomainPort for MockNotifier {}

    #[async_trait]
    impl NotificationPort for MockNotifier {
        async fn notify(
            &self,
            record: &ClaimRecord,
            _metadata: &OperationMetadata,
        ) -> Result<(), PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            match &self.behavior {
                CallBehavior::Succeed => {
                    self.delivered.write().await.push(record.clone());
                    Ok(())
                }
                CallBehavior::Fail(message) => Err(PortError::from_http_status("webhook", 502, message)),
                CallBehavior::Hang => hang().await,
            }
        }
    }
}
