//! Axum route handlers for the Review API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::review::extract::{SubmissionInput, UploadedFile};
use crate::review::models::Review;
use crate::review::service::review_submission;
use crate::state::AppState;

const TEXT_FIELD: &str = "text";
const FILE_FIELD: &str = "file";

/// POST /api/v1/review
///
/// Multipart form with an optional `text` part and an optional `file` part.
/// The file wins when both are sent.
#[tracing::instrument(skip_all, fields(request_id = %Uuid::new_v4()))]
pub async fn handle_review(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Review>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        AppError::Validation(format!("Expected a multipart form: {}", e.body_text()))
    })?;

    let input = read_submission(&mut multipart).await?;
    let review = review_submission(state.reviewer.as_ref(), input).await?;

    Ok(Json(review))
}

async fn read_submission(multipart: &mut Multipart) -> Result<SubmissionInput, AppError> {
    let mut input = SubmissionInput::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(TEXT_FIELD) => {
                input.raw_text = Some(field.text().await.map_err(form_error)?);
            }
            Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let declared_mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(form_error)?;

                // Browsers post an empty, unnamed part when no file was picked.
                if file_name.is_empty() && bytes.is_empty() {
                    debug!("Ignoring empty file part");
                    continue;
                }

                let file = UploadedFile {
                    bytes,
                    declared_mime_type,
                    file_name,
                };
                info!(
                    file_name = %file.file_name,
                    mime = %file.declared_mime_type,
                    bytes = file.size_bytes(),
                    "Received CV upload"
                );
                input.uploaded_file = Some(file);
            }
            other => debug!(field = ?other, "Ignoring unknown form field"),
        }
    }

    Ok(input)
}

fn form_error(err: MultipartError) -> AppError {
    AppError::Validation(format!("Could not read the form data: {}", err.body_text()))
}
