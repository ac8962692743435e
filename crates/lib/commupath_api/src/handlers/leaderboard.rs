//! Leaderboard handler.

use axum::Json;
use axum::extract::{Query, State};
use commupath_core::leaderboard;
use commupath_models::{LeaderboardEntry, LeaderboardQuery};

use crate::AppState;
use crate::error::AppResult;

/// `GET /api/leaderboard?limit=N`
pub async fn leaderboard_handler(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Json<Vec<LeaderboardEntry>>> {
    let limit = leaderboard::clamp_limit(query.limit);
    Ok(Json(leaderboard::top_users(&state.pool, limit).await?))
}
