//! Business logic behind the handlers.

pub mod auth;
pub mod quests;
pub mod verification;
