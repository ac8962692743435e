//! Proof submission queries.

use commupath_models::Submission;
use sqlx::{PgPool, Postgres, Transaction};

use super::QuestError;
use crate::ids::uuidv7;
use crate::models::submission::{NewSubmission, SubmissionRow};

const SUBMISSION_COLUMNS: &str = "id::text AS id, quest_id, user_id::text AS user_id, \
     image_path, description, confidence_score, verification_result, ai_reasoning, \
     points_awarded, submitted_at";

/// Record a verified (or not) proof submission inside the caller's transaction.
pub async fn create_submission(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewSubmission<'_>,
) -> Result<SubmissionRow, QuestError> {
    let row = sqlx::query_as::<_, SubmissionRow>(&format!(
        r#"
        INSERT INTO quest_submissions (
            id, quest_id, user_id, image_path, description, confidence_score,
            verification_result, ai_reasoning, points_awarded
        )
        VALUES ($1, $2, $3::uuid, $4, $5, $6, $7, $8, $9)
        RETURNING {SUBMISSION_COLUMNS}
        "#
    ))
    .bind(uuidv7())
    .bind(new.quest_id)
    .bind(new.user_id)
    .bind(new.image_path)
    .bind(new.description)
    .bind(new.confidence_score)
    .bind(new.verification_result)
    .bind(new.ai_reasoning)
    .bind(new.points_awarded)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// All submissions for a quest, newest first.
pub async fn list_by_quest(pool: &PgPool, quest_id: &str) -> Result<Vec<Submission>, QuestError> {
    let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM quest_submissions WHERE quest_id = $1 \
         ORDER BY submitted_at DESC"
    ))
    .bind(quest_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter()
        .map(|r| Submission::try_from(r).map_err(QuestError::from))
        .collect()
}
