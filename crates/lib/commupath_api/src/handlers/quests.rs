//! Quest listing and lifecycle handlers.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use commupath_models::{Quest, QuestFilter, StatusUpdateRequest, Submission, TogglePublicRequest};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::quests;

/// `GET /api/quests/my`: quests assigned to the caller.
pub async fn my_quests_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Quest>>> {
    Ok(Json(quests::my_quests(&state, user.id()).await?))
}

/// `GET /api/quests/all`
pub async fn all_quests_handler(
    State(state): State<AppState>,
    Query(filter): Query<QuestFilter>,
) -> AppResult<Json<Vec<Quest>>> {
    Ok(Json(quests::all_quests(&state, &filter).await?))
}

/// `GET /api/quests/community`: unassigned quests open for claiming.
pub async fn community_quests_handler(
    State(state): State<AppState>,
    Query(filter): Query<QuestFilter>,
) -> AppResult<Json<Vec<Quest>>> {
    Ok(Json(quests::community_quests(&state, &filter).await?))
}

/// `GET /api/quests/created-by-me`
pub async fn created_by_me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Quest>>> {
    Ok(Json(quests::created_by(&state, user.id()).await?))
}

/// `PUT /api/quests/{id}/status`
pub async fn update_status_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quest_id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> AppResult<Json<Quest>> {
    let quest = quests::update_status(&state, user.id(), &quest_id, body.status).await?;
    Ok(Json(quest))
}

/// `POST /api/quests/{id}/claim`
pub async fn claim_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quest_id): Path<String>,
) -> AppResult<Json<Quest>> {
    Ok(Json(quests::claim(&state, user.id(), &quest_id).await?))
}

/// `POST /api/quests/{id}/toggle-public`
pub async fn toggle_public_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quest_id): Path<String>,
    Json(body): Json<TogglePublicRequest>,
) -> AppResult<Json<Quest>> {
    let quest = quests::toggle_public(&state, user.id(), &quest_id, body.make_public).await?;
    Ok(Json(quest))
}

/// `GET /api/quests/{id}/submissions`
pub async fn submissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(quest_id): Path<String>,
) -> AppResult<Json<Vec<Submission>>> {
    Ok(Json(quests::list_submissions(&state, user.id(), &quest_id).await?))
}
