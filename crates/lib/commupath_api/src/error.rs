//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use commupath_core::auth::AuthError;
use commupath_core::quests::QuestError;
use commupath_core::uploads::UploadError;
use commupath_models::ErrorResponse;
use thiserror::Error;
use tracing::error;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
///
/// Every variant renders as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// Business rule conflicts such as claiming a taken quest.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("Database unavailable: {0}")]
    DbUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::DbUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                "Internal server error".to_string()
            }
            AppError::DbUnavailable(msg) => {
                error!(error = %msg, "database unavailable");
                "Database unavailable".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Not found".into()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::DbUnavailable(e.to_string())
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::CredentialError => AppError::Unauthorized(e.to_string()),
            AuthError::TokenError(msg) => AppError::Unauthorized(msg),
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<QuestError> for AppError {
    fn from(e: QuestError) -> Self {
        match e {
            QuestError::NotFound(_) => AppError::NotFound("Quest not found".into()),
            QuestError::AlreadyClaimed(_) => {
                AppError::Conflict("Quest has already been claimed".into())
            }
            QuestError::Forbidden(msg) => AppError::Forbidden(msg),
            QuestError::Validation(msg) => AppError::Validation(msg),
            QuestError::Corrupt(e) => AppError::Internal(e.to_string()),
            QuestError::Db(e) => AppError::from(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Empty => AppError::Validation(e.to_string()),
            UploadError::TooLarge => AppError::PayloadTooLarge(e.to_string()),
            UploadError::UnsupportedType => AppError::UnsupportedMediaType(e.to_string()),
            UploadError::Io(e) => AppError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn errors_render_as_detail() {
        let (status, body) = body_of(AppError::Validation("Username already registered".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Username already registered");
    }

    #[tokio::test]
    async fn internal_message_is_hidden() {
        let (status, body) = body_of(AppError::Internal("secret stack trace".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "Internal server error");
    }

    #[test]
    fn quest_errors_map_to_statuses() {
        let cases = [
            (QuestError::NotFound("q".into()), StatusCode::NOT_FOUND),
            (QuestError::AlreadyClaimed("q".into()), StatusCode::BAD_REQUEST),
            (QuestError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (QuestError::Validation("bad".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn upload_errors_map_to_statuses() {
        assert_eq!(AppError::from(UploadError::Empty).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::from(UploadError::TooLarge).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::from(UploadError::UnsupportedType).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let err = AppError::from(AuthError::CredentialError);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Incorrect username or password");
    }
}
