//! Gemini-backed agents.
//!
//! - [`architect::QuestArchitect`] turns a location and category into a quest
//! - [`verifier::ProofVerifier`] judges a proof photo against a quest
//! - [`judge::QuestJudge`] scores a quest for safety and appropriateness
//!
//! Every agent degrades to a deterministic fallback when the model is
//! unreachable, so callers never see an [`AgentError`] from the agent APIs.

pub mod architect;
pub mod gemini;
pub mod judge;
pub mod verifier;

use thiserror::Error;

pub use architect::QuestArchitect;
pub use gemini::GeminiClient;
pub use judge::QuestJudge;
pub use verifier::ProofVerifier;

/// Default model for text generation and judging.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";

/// Default model for image verification.
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.5-pro";

/// Errors talking to the model API.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("GEMINI_API_KEY is not configured")]
    NotConfigured,

    #[error("Gemini request failed: {0}")]
    Request(String),

    #[error("Gemini returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Gemini returned no content")]
    EmptyResponse,

    #[error("Gemini response parse error: {0}")]
    Parse(String),
}
