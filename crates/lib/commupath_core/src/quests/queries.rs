//! Quest database queries.

use commupath_models::{Quest, QuestFilter, QuestStatus};
use sqlx::{PgPool, Postgres, Transaction};

use super::QuestError;
use crate::models::quest::QuestRow;

const QUEST_COLUMNS: &str = "quest_id, title, description, category, difficulty, impact_metric, \
     estimated_time, community_benefit, location_lat, location_lng, location_name, \
     location_address, status, created_by::text AS created_by, \
     assigned_to::text AS assigned_to, created_at, completed_at";

fn into_quests(rows: Vec<QuestRow>) -> Result<Vec<Quest>, QuestError> {
    rows.into_iter()
        .map(|r| Quest::try_from(r).map_err(QuestError::from))
        .collect()
}

fn filter_binds(filter: &QuestFilter) -> (Option<&'static str>, Option<&'static str>) {
    (
        filter.category.map(|c| c.as_str()),
        filter.difficulty.map(|d| d.as_str()),
    )
}

/// Insert a freshly generated quest.
pub async fn create_quest(pool: &PgPool, quest: &Quest) -> Result<Quest, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        r#"
        INSERT INTO quests (
            quest_id, title, description, category, difficulty, impact_metric,
            estimated_time, community_benefit, location_lat, location_lng,
            location_name, location_address, status, created_by, assigned_to
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14::uuid, $15::uuid)
        RETURNING {QUEST_COLUMNS}
        "#
    ))
    .bind(&quest.quest_id)
    .bind(&quest.title)
    .bind(&quest.description)
    .bind(quest.category.as_str())
    .bind(quest.difficulty.as_str())
    .bind(&quest.impact_metric)
    .bind(&quest.estimated_time)
    .bind(&quest.community_benefit)
    .bind(quest.location.lat)
    .bind(quest.location.lng)
    .bind(&quest.location.name)
    .bind(&quest.location.address)
    .bind(quest.status.as_str())
    .bind(&quest.created_by)
    .bind(&quest.assigned_to)
    .fetch_one(pool)
    .await?;
    Ok(Quest::try_from(row)?)
}

/// Get a quest by ID.
pub async fn get_quest(pool: &PgPool, quest_id: &str) -> Result<Option<Quest>, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests WHERE quest_id = $1"
    ))
    .bind(quest_id)
    .fetch_optional(pool)
    .await?;
    row.map(Quest::try_from).transpose().map_err(QuestError::from)
}

/// Get a quest by ID or fail with `NotFound`.
pub async fn require_quest(pool: &PgPool, quest_id: &str) -> Result<Quest, QuestError> {
    get_quest(pool, quest_id)
        .await?
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))
}

/// Quests assigned to a user, newest first.
pub async fn list_assigned_to(pool: &PgPool, user_id: &str) -> Result<Vec<Quest>, QuestError> {
    let rows = sqlx::query_as::<_, QuestRow>(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests WHERE assigned_to = $1::uuid \
         ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    into_quests(rows)
}

/// All quests from all users (community map), newest first.
pub async fn list_all(pool: &PgPool, filter: &QuestFilter) -> Result<Vec<Quest>, QuestError> {
    let (category, difficulty) = filter_binds(filter);
    let rows = sqlx::query_as::<_, QuestRow>(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests \
         WHERE ($1::text IS NULL OR category = $1) \
           AND ($2::text IS NULL OR difficulty = $2) \
         ORDER BY created_at DESC"
    ))
    .bind(category)
    .bind(difficulty)
    .fetch_all(pool)
    .await?;
    into_quests(rows)
}

/// Public quests (`assigned_to IS NULL`) available to claim, newest first.
pub async fn list_community(
    pool: &PgPool,
    filter: &QuestFilter,
) -> Result<Vec<Quest>, QuestError> {
    let (category, difficulty) = filter_binds(filter);
    let rows = sqlx::query_as::<_, QuestRow>(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests \
         WHERE assigned_to IS NULL \
           AND ($1::text IS NULL OR category = $1) \
           AND ($2::text IS NULL OR difficulty = $2) \
         ORDER BY created_at DESC"
    ))
    .bind(category)
    .bind(difficulty)
    .fetch_all(pool)
    .await?;
    into_quests(rows)
}

/// Quests created by a user, newest first.
pub async fn list_created_by(pool: &PgPool, user_id: &str) -> Result<Vec<Quest>, QuestError> {
    let rows = sqlx::query_as::<_, QuestRow>(&format!(
        "SELECT {QUEST_COLUMNS} FROM quests WHERE created_by = $1::uuid \
         ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    into_quests(rows)
}

/// Set a quest's status. `completed_at` is stamped when moving to Completed.
pub async fn update_status(
    pool: &PgPool,
    quest_id: &str,
    status: QuestStatus,
) -> Result<Quest, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "UPDATE quests SET status = $2, \
             completed_at = CASE WHEN $2 = 'Completed' THEN now() ELSE completed_at END \
         WHERE quest_id = $1 RETURNING {QUEST_COLUMNS}"
    ))
    .bind(quest_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;
    row.map(Quest::try_from)
        .transpose()?
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))
}

/// Same as [`update_status`], inside the caller's transaction.
pub async fn update_status_tx(
    tx: &mut Transaction<'_, Postgres>,
    quest_id: &str,
    status: QuestStatus,
) -> Result<Quest, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "UPDATE quests SET status = $2, \
             completed_at = CASE WHEN $2 = 'Completed' THEN now() ELSE completed_at END \
         WHERE quest_id = $1 RETURNING {QUEST_COLUMNS}"
    ))
    .bind(quest_id)
    .bind(status.as_str())
    .fetch_optional(&mut **tx)
    .await?;
    row.map(Quest::try_from)
        .transpose()?
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))
}

/// Mark a quest Completed inside the caller's transaction.
///
/// Matches only while the quest is not yet completed; `None` means another
/// submission got there first.
pub async fn complete_tx(
    tx: &mut Transaction<'_, Postgres>,
    quest_id: &str,
) -> Result<Option<Quest>, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "UPDATE quests SET status = 'Completed', completed_at = now() \
         WHERE quest_id = $1 AND status <> 'Completed' RETURNING {QUEST_COLUMNS}"
    ))
    .bind(quest_id)
    .fetch_optional(&mut **tx)
    .await?;
    row.map(Quest::try_from).transpose().map_err(QuestError::from)
}

/// Claim a public quest for `user_id`.
///
/// The update only matches while `assigned_to IS NULL`, so two concurrent
/// claims cannot both win.
pub async fn claim(pool: &PgPool, quest_id: &str, user_id: &str) -> Result<Quest, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "UPDATE quests SET assigned_to = $2::uuid \
         WHERE quest_id = $1 AND assigned_to IS NULL AND status <> 'Completed' \
         RETURNING {QUEST_COLUMNS}"
    ))
    .bind(quest_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(r) => Ok(Quest::try_from(r)?),
        None => match get_quest(pool, quest_id).await? {
            None => Err(QuestError::NotFound(quest_id.to_string())),
            Some(_) => Err(QuestError::AlreadyClaimed(quest_id.to_string())),
        },
    }
}

/// Make a quest public (unassigned) or private (assigned to its creator).
pub async fn set_public(
    pool: &PgPool,
    quest_id: &str,
    make_public: bool,
) -> Result<Quest, QuestError> {
    let row = sqlx::query_as::<_, QuestRow>(&format!(
        "UPDATE quests SET assigned_to = CASE WHEN $2 THEN NULL ELSE created_by END \
         WHERE quest_id = $1 RETURNING {QUEST_COLUMNS}"
    ))
    .bind(quest_id)
    .bind(make_public)
    .fetch_optional(pool)
    .await?;
    row.map(Quest::try_from)
        .transpose()?
        .ok_or_else(|| QuestError::NotFound(quest_id.to_string()))
}
