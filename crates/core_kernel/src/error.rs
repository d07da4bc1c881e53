//! Core error types used across the system

use thiserror::Error;

use crate::secrets::SecretError;

/// Startup error raised while assembling the service
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn configuration(message: impl Into<String>) -> Self {
        CoreError::Configuration(message.into())
    }
}
