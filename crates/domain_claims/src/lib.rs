//! Claim Intake Domain
//!
//! This crate turns an end-user claim submission into a stored claim record.
//!
//! # Intake Pipeline
//!
//! ```text
//! Submission -> Validation -> Photo Captioning -> ClaimRecord -> Store -> Notification
//! ```
//!
//! The collaborators (captioning service, claim store, notification sink)
//! are reached only through the traits in [`ports`], so the pipeline runs
//! unchanged against remote adapters or the in-memory doubles enabled by the
//! `mock` feature.

pub mod claim;
pub mod ports;
pub mod intake;
pub mod error;

pub use claim::{ClaimRecord, ClaimSubmission, PhotoCaption, PhotoUpload, ValidatedSubmission};
pub use ports::{Caption, CaptioningPort, ClaimStorePort, NotificationPort};
pub use intake::{
    CaptionFailure, ClaimIntakeService, ClaimReceipt, ClaimResult, IntakeConfig, NotificationOutcome,
};
pub use error::IntakeError;
