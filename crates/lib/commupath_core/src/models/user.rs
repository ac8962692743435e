//! User rows.

use chrono::{DateTime, Utc};
use commupath_models::{ImpactLevel, User};

/// Database row for `users` (without the password hash).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub impact_level: String,
    pub points: i64,
    pub completed_quests: i64,
    pub created_at: DateTime<Utc>,
}

/// User row plus password hash, for the login flow.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: UserRow,
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        // Unknown labels fall back to the points tier.
        let impact_level = row
            .impact_level
            .parse()
            .unwrap_or_else(|_| ImpactLevel::from_points(row.points));
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            full_name: row.full_name,
            impact_level,
            points: row.points,
            completed_quests: row.completed_quests,
            created_at: Some(row.created_at),
        }
    }
}
