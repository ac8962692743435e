//! Authentication request handlers.

use axum::extract::State;
use axum::{Extension, Form, Json};
use commupath_models::{LoginForm, RegisterRequest, TokenResponse, User};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::services::auth;

/// `POST /api/auth/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<User>> {
    let user = auth::register(&state.pool, &body).await?;
    Ok(Json(user))
}

/// `POST /api/auth/login`: form-encoded username + password.
pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(
        &state.pool,
        &form.username,
        &form.password,
        &state.jwt,
    )
    .await?;
    Ok(Json(resp))
}

/// `GET /api/auth/me`: profile of the bearer.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<User>> {
    let profile = auth::current_user(&state.pool, user.id()).await?;
    Ok(Json(profile))
}
