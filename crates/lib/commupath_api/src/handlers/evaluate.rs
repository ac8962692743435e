//! Quest evaluation handler.

use axum::Json;
use axum::extract::State;
use commupath_models::{EvaluationResponse, Quest};

use crate::AppState;

/// `POST /api/evaluate-quest`: LLM-as-judge safety and appropriateness.
pub async fn evaluate_quest_handler(
    State(state): State<AppState>,
    Json(quest): Json<Quest>,
) -> Json<EvaluationResponse> {
    Json(state.judge.evaluate(&quest).await)
}
