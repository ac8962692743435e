//! Quest persistence and lifecycle rules.
//!
//! Every status transition is decided here, on the server. Clients only
//! mirror what these functions return.

pub mod queries;
pub mod submissions;

use commupath_models::{ParseLabelError, Quest, QuestStatus};
use thiserror::Error;

/// Quest errors.
#[derive(Debug, Error)]
pub enum QuestError {
    #[error("Quest not found: {0}")]
    NotFound(String),

    #[error("Quest already claimed: {0}")]
    AlreadyClaimed(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("Corrupt quest row: {0}")]
    Corrupt(#[from] ParseLabelError),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Check that `user_id` may move `quest` to `next` via the status endpoint.
///
/// Only the assignee may change status. Completion is reserved for proof
/// verification, which is the only path that awards points.
pub fn check_status_transition(
    quest: &Quest,
    user_id: &str,
    next: QuestStatus,
) -> Result<(), QuestError> {
    if quest.assigned_to.as_deref() != Some(user_id) {
        return Err(QuestError::Forbidden(
            "Only the assigned user can update this quest".into(),
        ));
    }
    if quest.status == QuestStatus::Completed {
        return Err(QuestError::Validation("Quest is already completed".into()));
    }
    if next == QuestStatus::Completed {
        return Err(QuestError::Validation(
            "Quests are completed by submitting proof".into(),
        ));
    }
    Ok(())
}

/// Check that `user_id` may submit proof for `quest`.
pub fn check_can_submit_proof(quest: &Quest, user_id: &str) -> Result<(), QuestError> {
    if quest.assigned_to.as_deref() != Some(user_id) {
        return Err(QuestError::Forbidden(
            "Claim this quest before submitting proof".into(),
        ));
    }
    if quest.status == QuestStatus::Completed {
        return Err(QuestError::Validation("Quest is already completed".into()));
    }
    Ok(())
}

/// Check that `user_id` may flip the public flag of `quest`.
pub fn check_can_toggle_public(quest: &Quest, user_id: &str) -> Result<(), QuestError> {
    if quest.created_by.as_deref() != Some(user_id) {
        return Err(QuestError::Forbidden(
            "Only the creator can change quest visibility".into(),
        ));
    }
    if let Some(assignee) = quest.assigned_to.as_deref()
        && assignee != user_id
    {
        return Err(QuestError::AlreadyClaimed(quest.quest_id.clone()));
    }
    if quest.status == QuestStatus::Completed {
        return Err(QuestError::Validation("Quest is already completed".into()));
    }
    Ok(())
}
