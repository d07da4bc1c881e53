//! API configuration

use std::time::Duration;

use core_kernel::CoreError;
use domain_claims::IntakeConfig;
use serde::Deserialize;

/// Default request body cap (25 MiB)
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 25 * 1024 * 1024;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Maximum accepted request body in bytes
    pub body_limit_bytes: usize,
    /// Answer every failure with 500, as the legacy service did
    pub legacy_error_status: bool,
    /// Timeout of one captioning call in milliseconds
    pub caption_timeout_ms: u64,
    /// Timeout of the store upsert in milliseconds
    pub store_timeout_ms: u64,
    /// Timeout of the notification call in milliseconds
    pub notify_timeout_ms: u64,
    /// Captioning calls in flight per submission
    pub max_concurrent_captions: usize,
    /// Prefix prepended to secret environment variables
    pub secret_prefix: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_json: false,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            legacy_error_status: false,
            caption_timeout_ms: 15_000,
            store_timeout_ms: 10_000,
            notify_timeout_ms: 10_000,
            max_concurrent_captions: 4,
            secret_prefix: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Rejects values the server cannot run with
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` naming the offending setting.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.body_limit_bytes == 0 {
            return Err(CoreError::configuration("body_limit_bytes must be greater than zero"));
        }
        let timeouts = [
            ("caption_timeout_ms", self.caption_timeout_ms),
            ("store_timeout_ms", self.store_timeout_ms),
            ("notify_timeout_ms", self.notify_timeout_ms),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, ms)| *ms == 0) {
            return Err(CoreError::configuration(format!("{name} must be greater than zero")));
        }
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the orchestrator limits
    pub fn intake_config(&self) -> IntakeConfig {
        IntakeConfig {
            caption_timeout: Duration::from_millis(self.caption_timeout_ms),
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            notify_timeout: Duration::from_millis(self.notify_timeout_ms),
            max_concurrent_captions: self.max_concurrent_captions.max(1),
        }
    }
}
