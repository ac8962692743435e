//! # commupath_models
//!
//! Wire models shared by the CommuPath API server and its clients.
//!
//! Field names follow the JSON contract of the REST API (`snake_case`,
//! status labels such as `"In Progress"`), so the same types serialize on
//! the server and deserialize on the client.

pub mod api;
pub mod quest;
pub mod user;

use thiserror::Error;

pub use api::*;
pub use quest::{
    Category, Coordinates, Difficulty, LeaderboardEntry, Location, Quest, QuestFilter,
    QuestStatus, VerificationResult,
};
pub use user::{ImpactLevel, User};

/// Error returned when a label does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
