//! Internal domain models.
//!
//! Database row structs and auth claims. The API-facing types live in
//! `commupath_models`; rows convert into them.

pub mod auth;
pub mod quest;
pub mod submission;
pub mod user;
