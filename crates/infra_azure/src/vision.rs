//! Computer Vision Captioning Adapter
//!
//! Implements `CaptioningPort` against the Computer Vision `describe`
//! operation. The image is sent as the raw request body; the service answers
//! with ranked caption candidates.
//!
//! # Error Handling
//!
//! - 401/403 -> `PortError::Unauthorized`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - 400 (e.g. unsupported image format) -> `PortError::Rejected` with the service message
//! - Timeouts -> `PortError::Timeout`

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, OperationMetadata, PortError};
use domain_claims::{Caption, CaptioningPort};

use crate::error::{build_client, ensure_success, normalize_endpoint, transport_error, AdapterError};

const SERVICE: &str = "computer-vision";

/// Configuration for the captioning adapter
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Resource endpoint (e.g. "https://eastus.api.cognitive.microsoft.com")
    pub endpoint: String,
    /// Subscription key
    pub api_key: String,
    /// API version path segment
    pub api_version: String,
    /// Caption language
    pub language: String,
    /// Number of caption candidates requested
    pub max_candidates: u32,
    /// Request timeout
    pub timeout: Duration,
}

impl VisionConfig {
    /// Creates a configuration with default version, language and timeout
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_version: "v3.2".to_string(),
            language: "en".to_string(),
            max_candidates: 1,
            timeout: Duration::from_secs(15),
        }
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    description: Option<ImageDescription>,
}

#[derive(Debug, Deserialize)]
struct ImageDescription {
    #[serde(default)]
    captions: Vec<Caption>,
}

/// Captioning adapter backed by the Computer Vision REST API
#[derive(Debug, Clone)]
pub struct VisionCaptioner {
    client: reqwest::Client,
    describe_url: String,
    config: VisionConfig,
}

impl VisionCaptioner {
    /// Creates the adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an http(s) URL, the key is
    /// empty, or the HTTP client cannot be built.
    pub fn new(config: VisionConfig) -> Result<Self, AdapterError> {
        let endpoint = normalize_endpoint(SERVICE, &config.endpoint)?;
        if config.api_key.trim().is_empty() {
            return Err(AdapterError::invalid_credential(SERVICE, "subscription key is empty"));
        }

        let describe_url = format!("{}/vision/{}/describe", endpoint, config.api_version);
        let client = build_client(config.timeout)?;

        Ok(Self {
            client,
            describe_url,
            config,
        })
    }

    /// Returns the URL of the describe operation
    pub fn describe_url(&self) -> &str {
        &self.describe_url
    }
}

impl DomainPort for VisionCaptioner {}

#[async_trait]
impl CaptioningPort for VisionCaptioner {
    #[instrument(skip(self, image, metadata), fields(bytes = image.len(), correlation_id = ?metadata.correlation_id))]
    async fn describe(
        &self,
        image: Bytes,
        metadata: &OperationMetadata,
    ) -> Result<Vec<Caption>, PortError> {
        let max_candidates = self.config.max_candidates.to_string();

        let response = self
            .client
            .post(&self.describe_url)
            .query(&[
                ("maxCandidates", max_candidates.as_str()),
                ("language", self.config.language.as_str()),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.config.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, "describe", self.config.timeout, e))?;

        let response = ensure_success(SERVICE, response).await?;

        let parsed: DescribeResponse = response
            .json()
            .await
            .map_err(|e| transport_error(SERVICE, "describe", self.config.timeout, e))?;

        let captions = parsed.description.map(|d| d.captions).unwrap_or_default();
        debug!(candidates = captions.len(), "Received image captions");
        Ok(captions)
    }
}
