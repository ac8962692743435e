//! Proof submission: store the image, ask the verifier, apply the verdict.

use std::path::Path;

use commupath_core::auth::queries::award_points;
use commupath_core::models::submission::NewSubmission;
use commupath_core::quests::{self, queries, submissions};
use commupath_core::uploads::{self, ValidatedImage};
use commupath_models::{Quest, QuestStatus, VerificationResponse, VerificationResult};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// A parsed `POST /api/verify-quest-proof` form.
#[derive(Debug)]
pub struct ProofUpload {
    pub quest_id: String,
    pub image: Option<(Vec<u8>, Option<String>)>,
    pub description: Option<String>,
}

/// Points credited for a verdict. Only verified proofs earn anything.
pub fn points_for(verdict: &VerificationResponse) -> i64 {
    match verdict.verification_result {
        VerificationResult::Verified => verdict.suggested_points,
        VerificationResult::Rejected | VerificationResult::Unclear => 0,
    }
}

pub async fn verify_proof(
    state: &AppState,
    user_id: &str,
    upload: ProofUpload,
) -> AppResult<VerificationResponse> {
    let (bytes, declared) = upload
        .image
        .ok_or_else(|| AppError::Validation("An image file is required".into()))?;
    let image: ValidatedImage = uploads::validate_image(bytes, declared.as_deref())?;

    let quest = queries::require_quest(&state.pool, &upload.quest_id).await?;
    quests::check_can_submit_proof(&quest, user_id)?;

    let path = uploads::save_image(&state.config.upload_dir, &quest.quest_id, &image).await?;
    let description = upload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    let mut verdict = state.verifier.verify(&quest, &image, description).await;
    match record_verdict(state, &quest, user_id, &path, description, &verdict).await {
        Ok(submission_id) => {
            verdict.submission_id = Some(submission_id);
            Ok(verdict)
        }
        Err(e) => {
            uploads::remove_image(&path).await;
            Err(e)
        }
    }
}

/// Store the submission and apply the verdict in one transaction.
async fn record_verdict(
    state: &AppState,
    quest: &Quest,
    user_id: &str,
    path: &Path,
    description: Option<&str>,
    verdict: &VerificationResponse,
) -> AppResult<String> {
    let points = points_for(verdict);
    let image_path = path.to_string_lossy();

    let mut tx = state.pool.begin().await?;
    let row = submissions::create_submission(
        &mut tx,
        &NewSubmission {
            quest_id: &quest.quest_id,
            user_id,
            image_path: &image_path,
            description,
            confidence_score: verdict.confidence_score,
            verification_result: verdict.verification_result.as_str(),
            ai_reasoning: &verdict.reasoning,
            points_awarded: points,
        },
    )
    .await?;

    if verdict.verification_result == VerificationResult::Verified {
        if queries::complete_tx(&mut tx, &quest.quest_id).await?.is_none() {
            return Err(AppError::Validation("Quest is already completed".into()));
        }
        let user = award_points(&mut tx, user_id, points, true).await?;
        info!(
            quest_id = %quest.quest_id,
            points,
            total = user.points,
            "quest completed"
        );
    } else if quest.status != QuestStatus::InProgress {
        queries::update_status_tx(&mut tx, &quest.quest_id, QuestStatus::InProgress).await?;
    }
    tx.commit().await?;
    Ok(row.id)
}
