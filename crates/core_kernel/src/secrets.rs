//! Secret resolution
//!
//! Credentials for the captioning service, the claim store and the
//! notification webhook are resolved once at process startup through the
//! `SecretProvider` port. Secret names follow the vault naming convention
//! (`COMPUTER-VISION-KEY`); the environment-backed provider maps them to
//! environment variables (`COMPUTER_VISION_KEY`).

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while resolving a secret
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret {name} is empty")]
    Empty { name: String },

    #[error("Secret provider unavailable: {0}")]
    Unavailable(String),
}

/// Port for resolving named configuration secrets
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Resolves a required secret by name
    ///
    /// # Errors
    ///
    /// Returns `SecretError::NotFound` if the secret does not exist and
    /// `SecretError::Empty` if it exists but holds no value.
    async fn get_secret(&self, name: &str) -> Result<String, SecretError>;
}

/// Convenience methods available on every secret provider
#[async_trait]
pub trait SecretProviderExt: SecretProvider {
    /// Resolves a secret that may legitimately be absent
    ///
    /// Missing and empty secrets both yield `Ok(None)`; other failures are
    /// propagated.
    async fn get_optional_secret(&self, name: &str) -> Result<Option<String>, SecretError> {
        match self.get_secret(name).await {
            Ok(value) => Ok(Some(value)),
            Err(SecretError::NotFound(_)) | Err(SecretError::Empty { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<T: SecretProvider + ?Sized> SecretProviderExt for T {}

/// Secret provider backed by process environment variables
///
/// `COSMOS-DB-NAME` is looked up as `COSMOS_DB_NAME`, optionally prefixed
/// (`CLAIMS_COSMOS_DB_NAME` with prefix `CLAIMS`).
#[derive(Debug, Clone, Default)]
pub struct EnvSecretProvider {
    prefix: Option<String>,
}

impl EnvSecretProvider {
    /// Creates a provider reading unprefixed environment variables
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Creates a provider reading variables under `prefix`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Returns the environment variable consulted for a secret name
    pub fn variable_name(&self, secret_name: &str) -> String {
        let base = secret_name.replace('-', "_").to_ascii_uppercase();
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}_{}", prefix, base),
            _ => base,
        }
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        let variable = self.variable_name(name);
        match std::env::var(&variable) {
            Ok(value) if value.trim().is_empty() => Err(SecretError::Empty {
                name: name.to_string(),
            }),
            Ok(value) => {
                tracing::debug!(secret = %name, variable = %variable, "Resolved secret from environment");
                Ok(value)
            }
            Err(std::env::VarError::NotPresent) => Err(SecretError::NotFound(name.to_string())),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::Unavailable(format!(
                "{} is not valid unicode",
                variable
            ))),
        }
    }
}

/// In-memory secret provider, used for tests and local wiring
#[derive(Debug, Clone, Default)]
pub struct StaticSecretProvider {
    secrets: HashMap<String, String>,
}

impl StaticSecretProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret, replacing any previous value
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretProvider for StaticSecretProvider {
    async fn get_secret(&self, name: &str) -> Result<String, SecretError> {
        match self.secrets.get(name) {
            Some(value) if value.trim().is_empty() => Err(SecretError::Empty {
                name: name.to_string(),
            }),
            Some(value) => Ok(value.clone()),
            None => Err(SecretError::NotFound(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_name_mapping() {
        let provider = EnvSecretProvider::new();
        assert_eq!(provider.variable_name("COMPUTER-VISION-KEY"), "COMPUTER_VISION_KEY");

        let prefixed = EnvSecretProvider::with_prefix("CLAIMS");
        assert_eq!(prefixed.variable_name("cosmos-key"), "CLAIMS_COSMOS_KEY");
    }

    #[tokio::test]
    async fn test_static_provider_lookup() {
        let provider = StaticSecretProvider::new()
            .with_secret("COSMOS-KEY", "abc")
            .with_secret("LOGIC-APP-WEBHOOK-URL", "");

        assert_eq!(provider.get_secret("COSMOS-KEY").await.unwrap(), "abc");
        assert!(matches!(
            provider.get_secret("MISSING").await,
            Err(SecretError::NotFound(_))
        ));
        assert!(matches!(
            provider.get_secret("LOGIC-APP-WEBHOOK-URL").await,
            Err(SecretError::Empty { .. })
        ));
    }

    #[tokio::test]
    async fn test_optional_secret_absorbs_missing_and_empty() {
        let provider = StaticSecretProvider::new().with_secret("LOGIC-APP-WEBHOOK-URL", "  ");

        assert_eq!(provider.get_optional_secret("LOGIC-APP-WEBHOOK-URL").await.unwrap(), None);
        assert_eq!(provider.get_optional_secret("NOPE").await.unwrap(), None);
    }
}
