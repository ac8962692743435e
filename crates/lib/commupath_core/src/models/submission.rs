//! Proof submission rows.

use chrono::{DateTime, Utc};
use commupath_models::{ParseLabelError, Submission};

/// Database row for `quest_submissions`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    pub id: String,
    pub quest_id: String,
    pub user_id: String,
    pub image_path: String,
    pub description: Option<String>,
    pub confidence_score: f64,
    pub verification_result: String,
    pub ai_reasoning: Option<String>,
    pub points_awarded: i64,
    pub submitted_at: DateTime<Utc>,
}

/// Values needed to record a new submission.
#[derive(Debug, Clone)]
pub struct NewSubmission<'a> {
    pub quest_id: &'a str,
    pub user_id: &'a str,
    pub image_path: &'a str,
    pub description: Option<&'a str>,
    pub confidence_score: f64,
    pub verification_result: &'a str,
    pub ai_reasoning: &'a str,
    pub points_awarded: i64,
}

impl TryFrom<SubmissionRow> for Submission {
    type Error = ParseLabelError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        Ok(Submission {
            verification_result: row.verification_result.parse()?,
            id: row.id,
            quest_id: row.quest_id,
            user_id: row.user_id,
            description: row.description,
            confidence_score: row.confidence_score,
            ai_reasoning: row.ai_reasoning,
            points_awarded: row.points_awarded,
            submitted_at: row.submitted_at,
        })
    }
}
