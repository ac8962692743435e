//! # commupath_core
//!
//! Core domain logic for CommuPath: persistence, authentication primitives,
//! the Gemini-backed quest agents, location lookup and upload handling.

pub mod agents;
pub mod auth;
pub mod ids;
pub mod leaderboard;
pub mod location;
pub mod migrate;
pub mod models;
pub mod quests;
pub mod uploads;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
