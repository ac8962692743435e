//! Quest generation handler.

use axum::extract::State;
use axum::{Extension, Json};
use commupath_models::{Quest, QuestRequest};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::quests;

/// `POST /api/generate-quest`
pub async fn generate_quest_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<QuestRequest>,
) -> AppResult<Json<Quest>> {
    let quest = quests::generate(&state, user.id(), &body).await?;
    Ok(Json(quest))
}
