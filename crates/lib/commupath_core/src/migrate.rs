//! Schema migrations embedded from `migrations/`.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use tracing::info;

/// Every migration shipped with this crate.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply outstanding migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    let version = MIGRATOR.iter().map(|m| m.version).max().unwrap_or(0);
    info!(version, "database schema up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered_and_cover_core_tables() {
        let versions: Vec<i64> = MIGRATOR.iter().map(|m| m.version).collect();
        assert!(!versions.is_empty());
        assert!(versions.windows(2).all(|w| w[0] < w[1]));

        let sql: String = MIGRATOR.iter().map(|m| m.sql.to_string()).collect();
        for table in ["users", "quests", "quest_submissions"] {
            assert!(sql.contains(table), "no migration mentions {table}");
        }
    }
}
