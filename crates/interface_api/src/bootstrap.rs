//! Service assembly
//!
//! Resolves the collaborator secrets once and builds the remote adapters
//! into a `ClaimIntakeService`.

use std::sync::Arc;

use core_kernel::{CoreError, SecretProvider, SecretProviderExt};
use domain_claims::ClaimIntakeService;
use infra_azure::{
    AdapterError, CosmosClaimStore, CosmosConfig, VisionCaptioner, VisionConfig, WebhookConfig,
    WebhookNotifier,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::ApiConfig;

pub const VISION_KEY: &str = "COMPUTER-VISION-KEY";
pub const VISION_ENDPOINT: &str = "COMPUTER-VISION-ENDPOINT";
pub const COSMOS_ENDPOINT: &str = "COSMOS-ENDPOINT";
pub const COSMOS_KEY: &str = "COSMOS-KEY";
pub const COSMOS_DATABASE: &str = "COSMOS-DB-NAME";
pub const COSMOS_CONTAINER: &str = "COSMOS-CONTAINER-NAME";
pub const WEBHOOK_URL: &str = "LOGIC-APP-WEBHOOK-URL";

/// Failure while assembling the service
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

async fn required_secret(secrets: &impl SecretProvider, name: &str) -> Result<String, CoreError> {
    Ok(secrets.get_secret(name).await?)
}

/// Builds the intake service from configuration and secrets
///
/// The webhook secret is optional; without it notifications are disabled.
///
/// # Errors
///
/// Returns `BootstrapError::Core` if a required secret is missing or empty,
/// and `BootstrapError::Adapter` if an adapter rejects its endpoint or
/// credential.
pub async fn build_intake_service(
    config: &ApiConfig,
    secrets: &impl SecretProvider,
) -> Result<ClaimIntakeService, BootstrapError> {
    let intake_config = config.intake_config();

    let vision = VisionConfig::new(
        required_secret(secrets, VISION_ENDPOINT).await?,
        required_secret(secrets, VISION_KEY).await?,
    )
    .with_timeout(intake_config.caption_timeout);
    let captioner = VisionCaptioner::new(vision)?;

    let cosmos = CosmosConfig::new(
        required_secret(secrets, COSMOS_ENDPOINT).await?,
        required_secret(secrets, COSMOS_KEY).await?,
        required_secret(secrets, COSMOS_DATABASE).await?,
        required_secret(secrets, COSMOS_CONTAINER).await?,
    )
    .with_timeout(intake_config.store_timeout);
    let store = CosmosClaimStore::new(cosmos)?;

    let webhook_url = secrets
        .get_optional_secret(WEBHOOK_URL)
        .await
        .map_err(CoreError::from)?;
    let notify_timeout = intake_config.notify_timeout;

    info!(
        describe_url = captioner.describe_url(),
        collection = store.collection_link(),
        "Remote adapters configured"
    );

    let service = ClaimIntakeService::new(Arc::new(captioner), Arc::new(store), intake_config);

    match webhook_url {
        Some(url) => {
            let notifier = WebhookNotifier::new(WebhookConfig::new(url).with_timeout(notify_timeout))?;
            Ok(service.with_notifier(Arc::new(notifier)))
        }
        None => {
            warn!("{WEBHOOK_URL} is not set, claim notifications are disabled");
            Ok(service)
        }
    }
}
