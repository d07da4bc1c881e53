//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the claim intake pipeline.
//! These fixtures are designed to be consistent and predictable for unit tests.

use bytes::Bytes;
use domain_claims::{ClaimSubmission, PhotoUpload};

/// Fixture for uploaded photos
///
/// Each photo has distinct content so mock captioners can script
/// responses per image.
pub struct PhotoFixtures;

impl PhotoFixtures {
    /// Start-of-image marker followed by a tag, enough to look like a JPEG
    pub fn jpeg_bytes(tag: &str) -> Bytes {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
        bytes.extend_from_slice(tag.as_bytes());
        Bytes::from(bytes)
    }

    /// Photo of a damaged rear bumper
    pub fn rear_bumper() -> PhotoUpload {
        PhotoUpload::new("rear-bumper.jpg", Self::jpeg_bytes("rear-bumper"))
    }

    /// Photo of a damaged door
    pub fn side_door() -> PhotoUpload {
        PhotoUpload::new("side-door.jpg", Self::jpeg_bytes("side-door"))
    }

    /// Photo the captioning service cannot read
    pub fn unreadable() -> PhotoUpload {
        PhotoUpload::new("blurry.png", Self::jpeg_bytes("blurry"))
    }

    /// Numbered photo with unique content
    pub fn numbered(index: usize) -> PhotoUpload {
        let name = format!("photo-{index}.jpg");
        PhotoUpload::new(name.clone(), Self::jpeg_bytes(&name))
    }

    /// Empty part a browser sends when no file was chosen
    pub fn blank() -> PhotoUpload {
        PhotoUpload::new("", Bytes::new())
    }
}

/// Fixture for caption texts
pub struct CaptionFixtures;

impl CaptionFixtures {
    pub fn rear_bumper() -> &'static str {
        "a dented rear bumper"
    }

    pub fn side_door() -> &'static str {
        "a scratched car door"
    }
}

/// Fixture for whole submissions
pub struct SubmissionFixtures;

impl SubmissionFixtures {
    /// Ann's fender bender with one photo of the rear bumper
    pub fn fender_bender() -> ClaimSubmission {
        ClaimSubmission::new("Ann", "a@x.com", "fender bender").with_photo(PhotoFixtures::rear_bumper())
    }

    /// Valid submission without photos
    pub fn text_only() -> ClaimSubmission {
        ClaimSubmission::new("Bob", "bob@example.com", "hit a pothole on the highway")
    }
}
