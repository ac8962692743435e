//! Request handlers.

pub mod auth;
pub mod evaluate;
pub mod generate;
pub mod health;
pub mod leaderboard;
pub mod quests;
pub mod verify;
