//! Webhook Notification Adapter
//!
//! Implements `NotificationPort` by POSTing the stored claim record as JSON
//! to a workflow trigger URL (e.g. a Logic App HTTP trigger). Any non-2xx
//! answer is a failure; there is no retry.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, OperationMetadata, PortError};
use domain_claims::{ClaimRecord, NotificationPort};

use crate::error::{build_client, ensure_http_url, ensure_success, transport_error, AdapterError};

const SERVICE: &str = "claim-webhook";

/// Header carrying the claim correlation id
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Configuration for the webhook adapter
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Trigger URL, including any signature query string
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Notification sink that posts records to a webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl WebhookNotifier {
    /// Creates the adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an http(s) URL or the HTTP client
    /// cannot be built. The URL is posted to as given, path and query intact.
    pub fn new(config: WebhookConfig) -> Result<Self, AdapterError> {
        let url = config.url.trim().to_string();
        ensure_http_url(SERVICE, &url)?;
        let client = build_client(config.timeout)?;

        Ok(Self {
            client,
            url,
            timeout: config.timeout,
        })
    }
}

impl DomainPort for WebhookNotifier {}

#[async_trait]
impl NotificationPort for WebhookNotifier {
    #[instrument(skip(self, record, metadata), fields(claim_id = %record.id()))]
    async fn notify(
        &self,
        record: &ClaimRecord,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError> {
        let mut request = self.client.post(&self.url).json(record);
        if let Some(correlation_id) = &metadata.correlation_id {
            request = request.header(CORRELATION_HEADER, correlation_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, "notify", self.timeout, e))?;
        let response = ensure_success(SERVICE, response).await?;

        debug!(status = response.status().as_u16(), "Claim notification delivered");
        Ok(())
    }
}
