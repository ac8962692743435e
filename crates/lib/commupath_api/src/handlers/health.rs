//! Service metadata endpoints.

use axum::Json;
use axum::extract::State;
use commupath_models::HealthResponse;
use serde_json::{Value, json};

use crate::AppState;

/// `GET /`: service banner.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "CommuPath API - AI-Powered Community Impact",
        "version": commupath_core::version(),
    }))
}

/// `GET /api/health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        service: "CommuPath API".into(),
        gemini_configured: state.config.gemini_api_key.is_some(),
    })
}
