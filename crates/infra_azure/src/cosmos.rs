//! Cosmos DB Claim Store Adapter
//!
//! Implements `ClaimStorePort` with the Cosmos DB SQL API over REST. Each
//! claim is one document in the configured container, upserted under its
//! claim id. The container is expected to be partitioned on `/id`.
//!
//! # Authentication
//!
//! Requests carry a master-key token:
//!
//! ```text
//! sig   = base64(HMAC-SHA256(base64decode(key), "{verb}\n{resourceType}\n{resourceLink}\n{date}\n\n"))
//! token = urlencode("type=master&ver=1.0&sig={sig}")
//! ```
//!
//! where verb, resource type and date are lowercased.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Method;
use sha2::Sha256;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};
use domain_claims::{ClaimRecord, ClaimStorePort};

use crate::error::{build_client, ensure_success, normalize_endpoint, transport_error, AdapterError};

const SERVICE: &str = "cosmos-db";
const API_VERSION: &str = "2018-12-31";

type HmacSha256 = Hmac<Sha256>;

/// Configuration for the claim store adapter
#[derive(Debug, Clone)]
pub struct CosmosConfig {
    /// Account endpoint (e.g. "https://claims.documents.azure.com:443/")
    pub endpoint: String,
    /// Base64-encoded master key
    pub master_key: String,
    /// Database id
    pub database: String,
    /// Container id
    pub container: String,
    /// Request timeout
    pub timeout: Duration,
}

impl CosmosConfig {
    pub fn new(
        endpoint: impl Into<String>,
        master_key: impl Into<String>,
        database: impl Into<String>,
        container: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            master_key: master_key.into(),
            database: database.into(),
            container: container.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Claim store backed by a Cosmos DB container
#[derive(Debug, Clone)]
pub struct CosmosClaimStore {
    client: reqwest::Client,
    endpoint: String,
    key: Vec<u8>,
    collection_link: String,
    timeout: Duration,
}

impl CosmosClaimStore {
    /// Creates the adapter
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is invalid, the master key is not
    /// base64, the database or container name is empty, or the HTTP client
    /// cannot be built.
    pub fn new(config: CosmosConfig) -> Result<Self, AdapterError> {
        let endpoint = normalize_endpoint(SERVICE, &config.endpoint)?;

        let key = base64::engine::general_purpose::STANDARD
            .decode(config.master_key.trim())
            .map_err(|e| AdapterError::invalid_credential(SERVICE, format!("master key is not base64: {}", e)))?;
        if key.is_empty() {
            return Err(AdapterError::invalid_credential(SERVICE, "master key is empty"));
        }

        if config.database.trim().is_empty() || config.container.trim().is_empty() {
            return Err(AdapterError::invalid_endpoint(
                SERVICE,
                "database and container names are required",
            ));
        }

        let collection_link = format!("dbs/{}/colls/{}", config.database, config.container);
        let client = build_client(config.timeout)?;

        Ok(Self {
            client,
            endpoint,
            key,
            collection_link,
            timeout: config.timeout,
        })
    }

    /// Returns the resource link of the claims container
    pub fn collection_link(&self) -> &str {
        &self.collection_link
    }

    /// Computes the master-key authorization token for one request
    ///
    /// # Arguments
    ///
    /// * `verb` - HTTP method
    /// * `resource_type` - "docs", "colls", ...
    /// * `resource_link` - Link of the addressed resource (the parent collection for document creation)
    /// * `date` - The exact value sent in `x-ms-date`
    pub fn authorization_token(
        &self,
        verb: &Method,
        resource_type: &str,
        resource_link: &str,
        date: &str,
    ) -> Result<String, PortError> {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            verb.as_str().to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );

        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| PortError::internal(format!("Cannot sign {} request: {}", SERVICE, e)))?;
        mac.update(payload.as_bytes());
        let signature = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        let token = format!("type=master&ver=1.0&sig={}", signature);
        Ok(utf8_percent_encode(&token, NON_ALPHANUMERIC).to_string())
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        resource_type: &str,
        resource_link: &str,
    ) -> Result<reqwest::RequestBuilder, PortError> {
        let date = rfc1123_now();
        let token = self.authorization_token(&method, resource_type, resource_link, &date)?;

        Ok(self
            .client
            .request(method, format!("{}/{}", self.endpoint, path))
            .header(reqwest::header::AUTHORIZATION, token)
            .header("x-ms-date", date)
            .header("x-ms-version", API_VERSION))
    }
}

fn rfc1123_now() -> String {
    Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

impl DomainPort for CosmosClaimStore {}

#[async_trait]
impl HealthCheckable for CosmosClaimStore {
    /// Reads the claims container to verify credentials and reachability
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        let result = match self.request(Method::GET, &self.collection_link, "colls", &self.collection_link) {
            Ok(request) => match request.send().await {
                Ok(response) => ensure_success(SERVICE, response).await.map(|_| ()),
                Err(e) => Err(transport_error(SERVICE, "read_container", self.timeout, e)),
            },
            Err(e) => Err(e),
        };

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => HealthCheckResult {
                adapter_id: "cosmos-claim-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "cosmos-claim-store".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(e.to_string()),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ClaimStorePort for CosmosClaimStore {
    #[instrument(skip(self, record, metadata), fields(claim_id = %record.id()))]
    async fn upsert_claim(
        &self,
        record: &ClaimRecord,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError> {
        let path = format!("{}/docs", self.collection_link);
        let partition_key = serde_json::to_string(&[record.id().to_string()])
            .map_err(|e| PortError::Transformation { message: e.to_string() })?;

        let mut request = self
            .request(Method::POST, &path, "docs", &self.collection_link)?
            .header("x-ms-documentdb-is-upsert", "True")
            .header("x-ms-documentdb-partitionkey", partition_key)
            .json(record);

        if let Some(correlation_id) = &metadata.correlation_id {
            request = request.header("x-ms-activity-id", correlation_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, "upsert_claim", self.timeout, e))?;
        let response = ensure_success(SERVICE, response).await?;

        debug!(status = response.status().as_u16(), "Claim document upserted");
        Ok(())
    }
}
