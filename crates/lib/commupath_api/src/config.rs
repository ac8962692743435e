//! API server configuration.

use std::path::PathBuf;

use commupath_core::agents::{DEFAULT_TEXT_MODEL, DEFAULT_VISION_MODEL};
use commupath_core::auth::jwt::resolve_jwt_secret;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub pg_connection_url: String,
    /// JWT signing secret.
    pub jwt_secret: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_vision_model: String,
    pub google_maps_api_key: Option<String>,
    /// Root directory for proof images.
    pub upload_dir: PathBuf,
    /// Allowed browser origin. `None` allows any origin.
    pub cors_origin: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable              | Default                                  |
    /// |-----------------------|------------------------------------------|
    /// | `BIND_ADDR`           | `127.0.0.1:8000`                         |
    /// | `DATABASE_URL`        | `postgres://localhost:5432/commupath`    |
    /// | `JWT_SECRET` / `SECRET_KEY` | generated & persisted to file      |
    /// | `GEMINI_API_KEY`      | unset (agents use fallbacks)             |
    /// | `GEMINI_MODEL`        | `gemini-2.0-flash`                       |
    /// | `GEMINI_VISION_MODEL` | `gemini-2.5-pro`                         |
    /// | `GOOGLE_MAPS_API_KEY` | unset (no location snapping)             |
    /// | `UPLOAD_DIR`          | `uploads`                                |
    /// | `CORS_ORIGIN`         | unset (any origin)                       |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into()),
            pg_connection_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/commupath".into()),
            jwt_secret: resolve_jwt_secret(),
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            gemini_model: non_empty_var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.into()),
            gemini_vision_model: non_empty_var("GEMINI_VISION_MODEL")
                .unwrap_or_else(|| DEFAULT_VISION_MODEL.into()),
            google_maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
            upload_dir: non_empty_var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            cors_origin: non_empty_var("CORS_ORIGIN"),
        }
    }

    /// Configuration for tests: fixed secret, no external services.
    pub fn for_tests(upload_dir: PathBuf) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: "postgres://localhost:5432/commupath_test".into(),
            jwt_secret: "test-secret".into(),
            gemini_api_key: None,
            gemini_model: DEFAULT_TEXT_MODEL.into(),
            gemini_vision_model: DEFAULT_VISION_MODEL.into(),
            google_maps_api_key: None,
            upload_dir,
            cors_origin: None,
        }
    }
}
