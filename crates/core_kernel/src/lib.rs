//! Core Kernel - Foundational types for the claim intake service
//!
//! This crate provides the building blocks shared by the domain, adapter and
//! interface crates:
//! - Strongly-typed identifiers
//! - Port error type and adapter health reporting
//! - Secret resolution

pub mod identifiers;
pub mod error;
pub mod ports;
pub mod secrets;

pub use identifiers::{ClaimId, RequestId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use secrets::{
    SecretProvider, SecretProviderExt, SecretError, EnvSecretProvider, StaticSecretProvider,
};
