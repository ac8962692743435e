//! Authentication service: login and registration flows delegating to
//! `commupath_core::auth`.

use commupath_core::auth::jwt::JwtKeys;
use commupath_core::auth::{AuthError, password, queries};
use commupath_models::{RegisterRequest, TokenResponse, User};
use sqlx::PgPool;
use tracing::info;

use crate::error::{AppError, AppResult};

const MIN_PASSWORD_LEN: usize = 6;

/// Check registration input before touching the database.
pub fn validate_registration(req: &RegisterRequest) -> AppResult<()> {
    let username = req.username.trim();
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(AppError::Validation(
            "Username must be between 3 and 50 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '.', '_' and '-'".into(),
        ));
    }
    if !is_plausible_email(req.email.trim()) {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !email.chars().any(char::is_whitespace)
}

/// Register a new account and return its profile.
pub async fn register(pool: &PgPool, req: &RegisterRequest) -> AppResult<User> {
    validate_registration(req)?;
    let username = req.username.trim();
    let email = req.email.trim().to_lowercase();

    if queries::username_exists(pool, username).await? {
        return Err(AppError::Validation("Username already registered".into()));
    }
    if queries::email_exists(pool, &email).await? {
        return Err(AppError::Validation("Email already registered".into()));
    }

    let hash = password::hash_password(&req.password)?;
    let full_name = req
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let row = match queries::create_user(pool, username, &email, full_name, &hash).await {
        Ok(row) => row,
        // lost a race with a concurrent registration
        Err(AuthError::DbError(sqlx::Error::Database(db))) if db.is_unique_violation() => {
            return Err(AppError::Validation(
                "Username or email already registered".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };
    info!(username, "user registered");
    Ok(row.into())
}

/// Authenticate with username + password.
pub async fn login(
    pool: &PgPool,
    username: &str,
    password: &str,
    keys: &JwtKeys,
) -> AppResult<TokenResponse> {
    let found = queries::find_user_by_username(pool, username.trim())
        .await?
        .ok_or(AuthError::CredentialError)?;

    if !password::verify_password(password, &found.password_hash)? {
        return Err(AuthError::CredentialError.into());
    }

    let access_token = keys.issue(&found.user.id, &found.user.username)?;
    info!(username = %found.user.username, "user logged in");
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    })
}

/// Profile of the authenticated user.
pub async fn current_user(pool: &PgPool, user_id: &str) -> AppResult<User> {
    queries::get_user_by_id(pool, user_id)
        .await?
        .map(User::from)
        // token outlived its account
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}
