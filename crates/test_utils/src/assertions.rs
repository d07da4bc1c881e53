//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for intake results that give
//! more meaningful error messages than standard assertions.

use std::collections::HashSet;

use domain_claims::{ClaimReceipt, ClaimRecord, ClaimResult, IntakeError};

/// Asserts that a submission succeeded and returns the receipt
///
/// # Panics
///
/// Panics with the intake error if the submission failed
pub fn assert_accepted(result: ClaimResult) -> ClaimReceipt {
    match result {
        Ok(receipt) => receipt,
        Err(err) => panic!("Expected accepted claim, got {} error: {}", err.kind(), err),
    }
}

/// Asserts that a submission was rejected for the given missing field
pub fn assert_missing_field(result: &ClaimResult, expected: &str) {
    match result {
        Err(IntakeError::Validation { field }) => assert_eq!(
            *field, expected,
            "Expected missing field {}, got {}",
            expected, field
        ),
        other => panic!("Expected validation error for {}, got {:?}", expected, other),
    }
}

/// Asserts that a submission failed in the store
pub fn assert_persistence_failure(result: &ClaimResult) {
    assert!(
        matches!(result, Err(IntakeError::Persistence { .. })),
        "Expected persistence error, got {:?}",
        result
    );
}

/// Asserts that a record carries the expected text fields and captions
pub fn assert_record(record: &ClaimRecord, name: &str, email: &str, description: &str, captions: &[&str]) {
    assert_eq!(record.name(), name, "name mismatch");
    assert_eq!(record.email(), email, "email mismatch");
    assert_eq!(record.description(), description, "description mismatch");
    assert_eq!(record.photo_captions(), captions, "photo caption mismatch");
}

/// Asserts that no two records share an identifier
pub fn assert_unique_ids(records: &[ClaimRecord]) {
    let mut seen = HashSet::new();
    for record in records {
        assert!(seen.insert(record.id()), "Duplicate claim id {}", record.id());
    }
}
