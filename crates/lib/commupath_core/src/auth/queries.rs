//! User database queries.

use commupath_models::ImpactLevel;
use sqlx::{PgPool, Postgres, Transaction};

use super::AuthError;
use crate::models::user::{UserRow, UserWithPassword};

const USER_COLUMNS: &str = "id::text AS id, username, email, full_name, impact_level, \
                            points, completed_quests, created_at";

/// Fetch a user (with password hash) by username.
pub async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, UserWithPassword>(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a user by ID.
pub async fn get_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<UserRow>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1::uuid"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Check whether a username is already taken.
pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Check whether an email is already registered.
pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, AuthError> {
    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// Create a new user, returning the stored row.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    full_name: Option<&str>,
    password_hash: &str,
) -> Result<UserRow, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (username, email, full_name, password_hash, impact_level) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(email)
    .bind(full_name)
    .bind(password_hash)
    .bind(ImpactLevel::Novice.as_str())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Add points (and optionally one completed quest) to a user and recompute
/// the impact level, inside the caller's transaction.
pub async fn award_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    points: i64,
    completed_quest: bool,
) -> Result<UserRow, AuthError> {
    let total = sqlx::query_scalar::<_, i64>(
        "UPDATE users SET points = points + $2, \
             completed_quests = completed_quests + $3, \
             updated_at = now() \
         WHERE id = $1::uuid RETURNING points",
    )
    .bind(user_id)
    .bind(points)
    .bind(if completed_quest { 1_i64 } else { 0 })
    .fetch_one(&mut **tx)
    .await?;

    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET impact_level = $2 WHERE id = $1::uuid RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(ImpactLevel::from_points(total).as_str())
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}
