//! Identifier helpers.

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable), used for submission rows.
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}

/// Generate a quest identifier of the form `quest_<8 hex chars>`.
pub fn quest_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("quest_{}", &hex[..8])
}
