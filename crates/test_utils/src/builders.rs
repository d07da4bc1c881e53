//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use domain_claims::{ClaimSubmission, PhotoUpload};

use crate::generators::{fake_description, fake_email, fake_name};

/// Builder for constructing claim submissions
///
/// Text fields default to fake but valid values.
pub struct ClaimSubmissionBuilder {
    name: Option<String>,
    email: Option<String>,
    description: Option<String>,
    photos: Vec<PhotoUpload>,
}

impl Default for ClaimSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSubmissionBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            name: Some(fake_name()),
            email: Some(fake_email()),
            description: Some(fake_description()),
            photos: Vec::new(),
        }
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the accident description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Omits the name
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Omits the email
    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    /// Omits the accident description
    pub fn without_description(mut self) -> Self {
        self.description = None;
        self
    }

    /// Appends a photo
    pub fn with_photo(mut self, photo: PhotoUpload) -> Self {
        self.photos.push(photo);
        self
    }

    /// Appends several photos
    pub fn with_photos(mut self, photos: impl IntoIterator<Item = PhotoUpload>) -> Self {
        self.photos.extend(photos);
        self
    }

    /// Builds the submission
    pub fn build(self) -> ClaimSubmission {
        ClaimSubmission {
            name: self.name,
            email: self.email,
            description: self.description,
            photos: self.photos,
        }
    }
}
