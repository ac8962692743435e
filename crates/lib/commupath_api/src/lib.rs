//! # commupath_api
//!
//! HTTP API library for CommuPath.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use commupath_core::agents::{GeminiClient, ProofVerifier, QuestArchitect, QuestJudge};
use commupath_core::auth::jwt::JwtKeys;
use commupath_core::location::LocationService;
use commupath_core::uploads::MAX_UPLOAD_BYTES;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{auth, evaluate, generate, health, leaderboard, quests, verify};

/// Room for multipart framing and the text fields around the image.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Token keys derived from `config.jwt_secret`.
    pub jwt: JwtKeys,
    pub architect: QuestArchitect,
    pub verifier: ProofVerifier,
    pub judge: QuestJudge,
    pub locations: Arc<LocationService>,
}

impl AppState {
    /// Build the state and the external-service clients described by `config`.
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        let http = reqwest::Client::new();
        let gemini = Arc::new(GeminiClient::new(http.clone(), config.gemini_api_key.clone()));
        if !gemini.is_configured() {
            warn!("GEMINI_API_KEY not set - agents will use fallback responses");
        }
        Self {
            jwt: JwtKeys::from_secret(config.jwt_secret.as_bytes()),
            architect: QuestArchitect::new(gemini.clone(), config.gemini_model.clone()),
            verifier: ProofVerifier::new(gemini.clone(), config.gemini_vision_model.clone()),
            judge: QuestJudge::new(gemini, config.gemini_model.clone()),
            locations: Arc::new(LocationService::new(
                http,
                config.google_maps_api_key.clone(),
            )),
            pool,
            config,
        }
    }
}

/// Run embedded database migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    commupath_core::migrate::migrate(pool).await
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => layer.allow_origin(AllowOrigin::exact(value)),
        Some(Err(_)) => {
            warn!("CORS_ORIGIN is not a valid header value - allowing any origin");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    // Public routes (no auth required)
    let public = Router::new()
        .route("/", get(health::root_handler))
        .route("/api/health", get(health::health_handler))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .route("/api/leaderboard", get(leaderboard::leaderboard_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/auth/me", get(auth::me_handler))
        .route("/api/generate-quest", post(generate::generate_quest_handler))
        .route("/api/evaluate-quest", post(evaluate::evaluate_quest_handler))
        .route("/api/quests/my", get(quests::my_quests_handler))
        .route("/api/quests/all", get(quests::all_quests_handler))
        .route("/api/quests/community", get(quests::community_quests_handler))
        .route("/api/quests/created-by-me", get(quests::created_by_me_handler))
        .route("/api/quests/{id}/status", put(quests::update_status_handler))
        .route("/api/quests/{id}/claim", post(quests::claim_handler))
        .route(
            "/api/quests/{id}/toggle-public",
            post(quests::toggle_public_handler),
        )
        .route(
            "/api/quests/{id}/submissions",
            get(quests::submissions_handler),
        )
        .route(
            "/api/verify-quest-proof",
            post(verify::verify_proof_handler)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
