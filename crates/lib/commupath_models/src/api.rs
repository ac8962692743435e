//! Request and response bodies of the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quest::{Category, Coordinates, QuestStatus, VerificationResult};

// =============================================================================
// Auth
// =============================================================================

/// `POST /api/auth/register` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// `POST /api/auth/login` form fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// `POST /api/auth/login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

// =============================================================================
// Quests
// =============================================================================

/// `POST /api/generate-quest` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestRequest {
    pub coordinates: Coordinates,
    pub resolution_category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_preferences: Option<String>,
    /// Public quests are stored unassigned and show up on the community board.
    #[serde(default)]
    pub make_public: bool,
}

/// `PUT /api/quests/{id}/status` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: QuestStatus,
}

/// `POST /api/quests/{id}/toggle-public` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TogglePublicRequest {
    pub make_public: bool,
}

/// `GET /api/leaderboard` query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// `POST /api/verify-quest-proof` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub verification_result: VerificationResult,
    pub suggested_points: i64,
    pub confidence_score: f64,
    pub reasoning: String,
    #[serde(default)]
    pub key_observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<String>,
}

/// A stored proof submission, as listed by `GET /api/quests/{id}/submissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    pub quest_id: String,
    pub user_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub confidence_score: f64,
    pub verification_result: VerificationResult,
    #[serde(default)]
    pub ai_reasoning: Option<String>,
    pub points_awarded: i64,
    pub submitted_at: DateTime<Utc>,
}

// =============================================================================
// Evaluation
// =============================================================================

/// A single LLM-as-judge score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScore {
    pub score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluations {
    pub safety: EvaluationScore,
    pub appropriateness: EvaluationScore,
}

/// `POST /api/evaluate-quest` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub quest_id: String,
    pub evaluations: Evaluations,
    pub overall_score: f64,
    pub passed: bool,
}

// =============================================================================
// Misc
// =============================================================================

/// `GET /api/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub gemini_configured: bool,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
