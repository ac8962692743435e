//! Proof submission handler.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use commupath_models::VerificationResponse;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::services::verification::{self, ProofUpload};

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File too large. Maximum size is 10 MB".into())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// Read the `quest_id`, `image` and `description` fields.
async fn read_upload(mut multipart: Multipart) -> AppResult<ProofUpload> {
    let mut quest_id = None;
    let mut image = None;
    let mut description = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("quest_id") => quest_id = Some(field.text().await.map_err(multipart_error)?),
            Some("description") => {
                description = Some(field.text().await.map_err(multipart_error)?)
            }
            Some("image") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                image = Some((bytes.to_vec(), content_type));
            }
            _ => {}
        }
    }

    let quest_id = quest_id
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("quest_id is required".into()))?;
    Ok(ProofUpload {
        quest_id,
        image,
        description,
    })
}

/// `POST /api/verify-quest-proof`: multipart proof upload.
pub async fn verify_proof_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> AppResult<Json<VerificationResponse>> {
    let upload = read_upload(multipart).await?;
    let verdict = verification::verify_proof(&state, user.id(), upload).await?;
    Ok(Json(verdict))
}
