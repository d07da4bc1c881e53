//! Adapter error types
//!
//! Construction-time failures (bad endpoint, undecodable key) are reported as
//! `AdapterError`. Failures during a call are always reported as `PortError`
//! so the intake service sees one error type regardless of the adapter.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use thiserror::Error;

use core_kernel::PortError;

/// Errors raised while building an adapter
#[derive(Debug, Error)]
pub enum AdapterError {
    /// An endpoint is missing or is not an absolute http(s) URL
    #[error("Invalid endpoint for {service}: {message}")]
    InvalidEndpoint { service: String, message: String },

    /// A credential is missing or malformed
    #[error("Invalid credential for {service}: {message}")]
    InvalidCredential { service: String, message: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl AdapterError {
    pub fn invalid_endpoint(service: &str, message: impl Into<String>) -> Self {
        AdapterError::InvalidEndpoint {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_credential(service: &str, message: impl Into<String>) -> Self {
        AdapterError::InvalidCredential {
            service: service.to_string(),
            message: message.into(),
        }
    }
}

impl From<AdapterError> for PortError {
    fn from(error: AdapterError) -> Self {
        PortError::internal(error.to_string())
    }
}

/// Maps a reqwest transport failure onto a port error
///
/// # Arguments
///
/// * `service` - Remote service name used in messages
/// * `operation` - The call being made
/// * `limit` - The client timeout, reported when the call timed out
/// * `error` - The transport error
pub(crate) fn transport_error(
    service: &str,
    operation: &str,
    limit: Duration,
    error: reqwest::Error,
) -> PortError {
    if error.is_timeout() {
        PortError::timeout(format!("{} {}", service, operation), limit)
    } else if error.is_connect() {
        PortError::Connection {
            message: format!("{} unreachable during {}", service, operation),
            source: Some(Box::new(error)),
        }
    } else if error.is_decode() {
        PortError::Transformation {
            message: format!("Invalid {} response to {}: {}", service, operation, error),
        }
    } else {
        PortError::Internal {
            message: format!("{} {} failed", service, operation),
            source: Some(Box::new(error)),
        }
    }
}

/// Passes through 2xx responses and converts everything else to a port error
///
/// A 429 honours `x-ms-retry-after-ms` or `retry-after` when present.
pub(crate) async fn ensure_success(service: &str, response: Response) -> Result<Response, PortError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        if let Some(retry_after_secs) = retry_after_secs(&response) {
            return Err(PortError::RateLimited { retry_after_secs });
        }
    }

    let body = response.text().await.unwrap_or_default();
    Err(PortError::from_http_status(service, status.as_u16(), &body))
}

fn retry_after_secs(response: &Response) -> Option<u64> {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
    };

    header("x-ms-retry-after-ms")
        .map(|ms| ms.div_ceil(1000).max(1))
        .or_else(|| header("retry-after"))
}

/// Validates that a base endpoint is an absolute http(s) URL and strips trailing slashes
///
/// Only for endpoints that get request paths appended.
pub(crate) fn normalize_endpoint(service: &str, endpoint: &str) -> Result<String, AdapterError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    ensure_http_url(service, trimmed)?;
    Ok(trimmed.to_string())
}

/// Validates that a URL is absolute http(s), leaving it unchanged
pub(crate) fn ensure_http_url(service: &str, url: &str) -> Result<(), AdapterError> {
    if url.is_empty() {
        return Err(AdapterError::invalid_endpoint(service, "endpoint is empty"));
    }

    let parsed = reqwest::Url::parse(url)
        .map_err(|e| AdapterError::invalid_endpoint(service, format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AdapterError::invalid_endpoint(
            service,
            format!("unsupported scheme '{}'", other),
        )),
    }
}

/// Builds the shared HTTP client for one adapter
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, AdapterError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(concat!("claim-intake/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
