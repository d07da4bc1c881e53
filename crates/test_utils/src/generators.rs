//! Fake Data and Property-Based Test Generators
//!
//! `fake`-backed helpers produce realistic claimant data; proptest
//! strategies generate inputs that exercise the intake invariants.

use bytes::Bytes;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;

/// Random claimant name
pub fn fake_name() -> String {
    Name().fake()
}

/// Random claimant email
pub fn fake_email() -> String {
    SafeEmail().fake()
}

/// Random accident description
pub fn fake_description() -> String {
    Sentence(4..12).fake()
}

/// Strategy for non-blank single-line text values
pub fn text_value_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 .,@-]{0,40}"
}

/// Strategy for values that count as missing
pub fn blank_value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[ \t\r\n]{1,8}"]
}

/// Strategy for photo content (never empty)
pub fn photo_bytes_strategy() -> impl Strategy<Value = Bytes> {
    proptest::collection::vec(any::<u8>(), 1..256).prop_map(Bytes::from)
}

/// Strategy for which of up to `max` photos receive a caption
pub fn caption_outcomes_strategy(max: usize) -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), 0..=max)
}
