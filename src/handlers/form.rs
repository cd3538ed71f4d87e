// handlers/form.rs - multipart decoding shared by the API and the HTML form
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;

use crate::error::ApiError;
use crate::services::school_service::MAX_IMAGE_BYTES;
use crate::services::{ImageUpload, SchoolSubmission};

/// Read every part of a school submission.
///
/// Text parts are matched by name; unknown parts are ignored. The `image`
/// part is read chunk by chunk and stops being buffered once it passes
/// [`MAX_IMAGE_BYTES`], so an oversized upload is measured but never held in
/// memory or written anywhere. If the request body limit cuts the image off,
/// the submission read so far is returned with the image marked oversized.
pub async fn read_submission(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<SchoolSubmission, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected non-multipart submission: {}", e);
        ApiError::bad_request("Invalid form submission")
    })?;
    let mut submission = SchoolSubmission::default();

    while let Some(mut field) = multipart.next_field().await.map_err(invalid_form)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            let mut upload = ImageUpload {
                file_name: field.file_name().unwrap_or_default().to_owned(),
                content_type: field.content_type().map(str::to_owned),
                ..ImageUpload::default()
            };

            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => {
                        upload.size += chunk.len();
                        if upload.size <= MAX_IMAGE_BYTES {
                            upload.bytes.extend_from_slice(&chunk);
                        } else if !upload.bytes.is_empty() {
                            upload.bytes = Vec::new();
                        }
                    }
                    Ok(None) => break,
                    Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                        // The body limit cut the image off; keep what was read
                        // so validation still reports missing fields first
                        upload.size = upload.size.max(MAX_IMAGE_BYTES + 1);
                        upload.bytes = Vec::new();
                        submission.image = Some(upload);
                        return Ok(submission);
                    }
                    Err(e) => return Err(invalid_form(e)),
                }
            }

            submission.image = Some(upload);
            continue;
        }

        let value = field.text().await.map_err(invalid_form)?;
        if !submission.set_field(&name, value) {
            tracing::debug!("Ignoring unknown form field: {}", name);
        }
    }

    Ok(submission)
}

fn invalid_form(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Form body over the request limit: {}", err);
        return ApiError::bad_request("Request body too large");
    }
    tracing::debug!("Malformed multipart body: {}", err);
    ApiError::bad_request("Invalid form submission")
}
