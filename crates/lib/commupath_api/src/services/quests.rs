//! Quest service: generation and lifecycle actions.

use commupath_core::agents::architect::quest_from_draft;
use commupath_core::quests::{self, queries, submissions};
use commupath_models::{Quest, QuestFilter, QuestRequest, QuestStatus, Submission};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Generate a quest near the requested coordinates and store it.
///
/// Public quests are stored unassigned; private ones are assigned to the
/// creator.
pub async fn generate(state: &AppState, user_id: &str, req: &QuestRequest) -> AppResult<Quest> {
    if !req.coordinates.is_valid() {
        return Err(AppError::Validation("Coordinates out of range".into()));
    }

    let draft = state
        .architect
        .draft(
            req.coordinates,
            req.resolution_category,
            req.user_preferences.as_deref(),
        )
        .await;
    let location = state
        .locations
        .place_quest(req.coordinates, req.resolution_category)
        .await;

    let mut quest = quest_from_draft(draft, req.resolution_category, location);
    quest.created_by = Some(user_id.to_string());
    quest.assigned_to = (!req.make_public).then(|| user_id.to_string());

    let stored = queries::create_quest(&state.pool, &quest).await?;
    info!(
        quest_id = %stored.quest_id,
        category = %stored.category,
        public = req.make_public,
        "quest created"
    );
    Ok(stored)
}

pub async fn my_quests(state: &AppState, user_id: &str) -> AppResult<Vec<Quest>> {
    Ok(queries::list_assigned_to(&state.pool, user_id).await?)
}

pub async fn all_quests(state: &AppState, filter: &QuestFilter) -> AppResult<Vec<Quest>> {
    Ok(queries::list_all(&state.pool, filter).await?)
}

pub async fn community_quests(state: &AppState, filter: &QuestFilter) -> AppResult<Vec<Quest>> {
    Ok(queries::list_community(&state.pool, filter).await?)
}

pub async fn created_by(state: &AppState, user_id: &str) -> AppResult<Vec<Quest>> {
    Ok(queries::list_created_by(&state.pool, user_id).await?)
}

/// Move an assigned quest to a non-terminal status.
pub async fn update_status(
    state: &AppState,
    user_id: &str,
    quest_id: &str,
    status: QuestStatus,
) -> AppResult<Quest> {
    let quest = queries::require_quest(&state.pool, quest_id).await?;
    quests::check_status_transition(&quest, user_id, status)?;
    if quest.status == status {
        return Ok(quest);
    }
    let updated = queries::update_status(&state.pool, quest_id, status).await?;
    info!(quest_id, %status, "quest status updated");
    Ok(updated)
}

pub async fn claim(state: &AppState, user_id: &str, quest_id: &str) -> AppResult<Quest> {
    let quest = queries::claim(&state.pool, quest_id, user_id).await?;
    info!(quest_id, user_id, "quest claimed");
    Ok(quest)
}

pub async fn toggle_public(
    state: &AppState,
    user_id: &str,
    quest_id: &str,
    make_public: bool,
) -> AppResult<Quest> {
    let quest = queries::require_quest(&state.pool, quest_id).await?;
    quests::check_can_toggle_public(&quest, user_id)?;
    let updated = queries::set_public(&state.pool, quest_id, make_public).await?;
    info!(quest_id, make_public, "quest visibility changed");
    Ok(updated)
}

/// Submissions for a quest, visible to its creator and assignee.
pub async fn list_submissions(
    state: &AppState,
    user_id: &str,
    quest_id: &str,
) -> AppResult<Vec<Submission>> {
    let quest = queries::require_quest(&state.pool, quest_id).await?;
    let involved = [quest.created_by.as_deref(), quest.assigned_to.as_deref()]
        .contains(&Some(user_id));
    if !involved {
        return Err(AppError::Forbidden(
            "Only the creator or assignee can view submissions".into(),
        ));
    }
    Ok(submissions::list_by_quest(&state.pool, quest_id).await?)
}
