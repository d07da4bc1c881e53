//! Claim submission and claim record
//!
//! A `ClaimSubmission` is what arrives from the intake form. It is validated
//! into a `ValidatedSubmission`, its photos are captioned, and the result is
//! assembled into the immutable `ClaimRecord` that gets stored and forwarded.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use core_kernel::ClaimId;
use crate::error::IntakeError;

/// Wire name of the claimant name field
pub const FIELD_NAME: &str = "name";
/// Wire name of the claimant email field
pub const FIELD_EMAIL: &str = "email";
/// Wire name of the accident description field
pub const FIELD_DESCRIPTION: &str = "accidentDescription";
/// Wire name of the photo file parts
pub const FIELD_PHOTOS: &str = "carPhotos";

/// One uploaded photo, buffered in memory for the lifetime of the request
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    /// Filename hint supplied by the client
    pub filename: Option<String>,
    /// Raw image bytes
    pub bytes: Bytes,
}

impl PhotoUpload {
    /// Creates a photo with a filename hint
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: Some(filename.into()),
            bytes: bytes.into(),
        }
    }

    /// Returns true for the empty part a browser sends when no file was chosen
    pub fn is_blank(&self) -> bool {
        self.bytes.is_empty()
            && self.filename.as_deref().map_or(true, |name| name.trim().is_empty())
    }

    /// Returns the sanitized filename, or a positional fallback
    pub fn display_name(&self, index: usize) -> String {
        self.filename
            .as_deref()
            .map(sanitize_filename)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("photo-{}", index + 1))
    }
}

/// Reduces a client-supplied filename to a safe, log-friendly form
///
/// Directory components are dropped, whitespace becomes `_`, and anything
/// other than ASCII alphanumerics, `.`, `-` and `_` is removed. Leading dots
/// are stripped so the result can never name a hidden or parent directory.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();

    cleaned.trim_start_matches('.').trim_matches('_').to_string()
}

/// An incoming claim submission
///
/// Text fields are optional because the form may omit them; presence is
/// checked by [`ClaimSubmission::validate`].
#[derive(Debug, Clone, Default)]
pub struct ClaimSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub photos: Vec<PhotoUpload>,
}

impl ClaimSubmission {
    /// Creates a submission with all text fields present and no photos
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            description: Some(description.into()),
            photos: Vec::new(),
        }
    }

    /// Appends a photo
    pub fn with_photo(mut self, photo: PhotoUpload) -> Self {
        self.photos.push(photo);
        self
    }

    /// Checks that the required text fields are present
    ///
    /// Fields are checked in the order name, email, description. A field is
    /// missing when absent, empty, or whitespace only. Blank photo parts are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Validation` naming the first missing field.
    pub fn validate(self) -> Result<ValidatedSubmission, IntakeError> {
        let name = require(self.name, FIELD_NAME)?;
        let email = require(self.email, FIELD_EMAIL)?;
        let description = require(self.description, FIELD_DESCRIPTION)?;

        let photos = self
            .photos
            .into_iter()
            .filter(|photo| !photo.is_blank())
            .collect();

        Ok(ValidatedSubmission {
            name,
            email,
            description,
            photos,
        })
    }
}

fn require(value: Option<String>, field: &'static str) -> Result<String, IntakeError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(IntakeError::Validation { field }),
    }
}

/// A submission whose required fields are known to be present
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: String,
    pub description: String,
    pub photos: Vec<PhotoUpload>,
}

/// Result of captioning one photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCaption {
    /// Position of the photo in the submission
    pub photo_index: usize,
    /// Caption text, absent when the service produced none or failed
    pub caption: Option<String>,
}

/// The durable claim record
///
/// Built once after captioning has resolved and never mutated afterwards.
/// Serializes to the stored document layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRecord {
    id: ClaimId,
    name: String,
    email: String,
    description: String,
    photo_captions: Vec<String>,
}

impl ClaimRecord {
    /// Assembles a record from validated fields and per-photo captions
    ///
    /// Captions are kept in photo order; photos without a caption contribute
    /// nothing.
    pub fn assemble(
        id: ClaimId,
        name: String,
        email: String,
        description: String,
        mut captions: Vec<PhotoCaption>,
    ) -> Self {
        captions.sort_by_key(|c| c.photo_index);
        let photo_captions = captions.into_iter().filter_map(|c| c.caption).collect();

        Self {
            id,
            name,
            email,
            description,
            photo_captions,
        }
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn photo_captions(&self) -> &[String] {
        &self.photo_captions
    }
}
