//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claim intake test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built submissions, photos and captions
//! - `builders`: Builder for claim submissions
//! - `harness`: Intake service wired to in-memory collaborators
//! - `assertions`: Custom assertion helpers for intake results
//! - `generators`: Fake data and property-based test generators

pub mod fixtures;
pub mod builders;
pub mod harness;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use harness::*;
pub use assertions::*;
pub use generators::*;
