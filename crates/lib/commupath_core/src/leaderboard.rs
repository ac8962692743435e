//! Leaderboard projection.

use commupath_models::{ImpactLevel, LeaderboardEntry};
use sqlx::PgPool;

/// Default number of leaderboard rows.
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound on the requested number of rows.
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, sqlx::FromRow)]
struct LeaderboardRow {
    username: String,
    points: i64,
    completed_quests: i64,
    impact_level: String,
}

/// Clamp a requested limit into `1..=MAX_LIMIT`, defaulting when absent.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Top users by points. Ties break on completed quests, then username.
pub async fn top_users(pool: &PgPool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LeaderboardRow>(
        "SELECT username, points, completed_quests, impact_level FROM users \
         ORDER BY points DESC, completed_quests DESC, username ASC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rank(rows))
}

fn rank(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(i, r)| LeaderboardEntry {
            rank: i as u32 + 1,
            impact_level: r
                .impact_level
                .parse()
                .unwrap_or_else(|_| ImpactLevel::from_points(r.points)),
            username: r.username,
            points: r.points,
            completed_quests: r.completed_quests,
        })
        .collect()
}
