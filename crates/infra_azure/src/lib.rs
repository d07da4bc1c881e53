//! Remote Service Adapters
//!
//! This crate provides the production implementations of the claim intake
//! ports, each talking to a remote service over HTTPS:
//!
//! - **VisionCaptioner**: `CaptioningPort` via the Computer Vision describe API
//! - **CosmosClaimStore**: `ClaimStorePort` via the Cosmos DB SQL REST API
//! - **WebhookNotifier**: `NotificationPort` via a workflow HTTP trigger
//!
//! Each adapter owns one `reqwest::Client` with a client-level timeout and
//! reports every call failure as a `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_azure::{CosmosClaimStore, CosmosConfig, VisionCaptioner, VisionConfig};
//!
//! let captioner = VisionCaptioner::new(VisionConfig::new(endpoint, key))?;
//! let store = CosmosClaimStore::new(CosmosConfig::new(uri, master_key, "claims", "submissions"))?;
//! ```

pub mod error;
pub mod vision;
pub mod cosmos;
pub mod webhook;

pub use error::AdapterError;
pub use vision::{VisionCaptioner, VisionConfig};
pub use cosmos::{CosmosClaimStore, CosmosConfig};
pub use webhook::{WebhookConfig, WebhookNotifier};
