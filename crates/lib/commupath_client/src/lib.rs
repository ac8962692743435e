//! # commupath_client
//!
//! Typed client for the CommuPath API together with the client-side state
//! a front end needs: session, local quest store, generation and proof
//! flows, route guard and page controllers.

pub mod app;
pub mod error;
pub mod feed;
pub mod generation;
pub mod guard;
pub mod http;
pub mod notify;
pub mod pages;
pub mod proof;
pub mod quests;
pub mod router;
pub mod session;
pub mod storage;

pub use app::{AppContext, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use http::{ApiClient, ProofImage};
pub use router::Route;
pub use storage::{CredentialStore, FileStorage, MemoryStorage};
