//! Claims handlers

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
    Json,
};
use tracing::{debug, warn};

use domain_claims::claim::{FIELD_DESCRIPTION, FIELD_EMAIL, FIELD_NAME, FIELD_PHOTOS};
use domain_claims::{ClaimSubmission, PhotoUpload};

use crate::dto::claims::SubmitClaimResponse;
use crate::{error::ApiError, AppState};

/// Accepts a multipart claim submission
///
/// Reads `name`, `email`, `accidentDescription` and any number of
/// `carPhotos` parts, then runs the intake pipeline. Errors are rendered
/// with the configured status policy.
pub async fn submit_claim(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitClaimResponse>, Response> {
    let legacy = state.config.legacy_error_status;

    let submission = match multipart {
        Ok(multipart) => read_submission(multipart).await,
        Err(rejection) => Err(ApiError::from(rejection)),
    }
    .map_err(|err| {
        warn!(error = %err, "Rejected malformed claim submission");
        err.render(legacy)
    })?;

    let receipt = state
        .intake
        .handle(submission)
        .await
        .map_err(|err| ApiError::from(err).render(legacy))?;

    Ok(Json(SubmitClaimResponse::success(receipt.claim_id)))
}

/// Buffers the multipart body into a submission
///
/// Unknown fields are skipped. When a text field repeats, the last value wins.
async fn read_submission(mut multipart: Multipart) -> Result<ClaimSubmission, ApiError> {
    let mut submission = ClaimSubmission::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            FIELD_NAME => submission.name = Some(field.text().await?),
            FIELD_EMAIL => submission.email = Some(field.text().await?),
            FIELD_DESCRIPTION => submission.description = Some(field.text().await?),
            FIELD_PHOTOS => {
                let filename = field.file_name().map(str::to_owned);
                let bytes = field.bytes().await?;

                let photo = PhotoUpload { filename, bytes };
                debug!(
                    photo_index = submission.photos.len(),
                    filename = %photo.display_name(submission.photos.len()),
                    bytes = photo.bytes.len(),
                    "Received photo"
                );
                submission.photos.push(photo);
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(submission)
}
