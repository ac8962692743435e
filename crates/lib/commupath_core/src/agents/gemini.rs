//! Minimal Gemini `generateContent` client with JSON response mode.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::AgentError;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";

/// One part of a user turn.
#[derive(Debug, Clone)]
pub enum Part {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
}

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text { text: &'a str },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn first_text(resp: GenerateResponse) -> Result<String, AgentError> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .filter(|t| !t.trim().is_empty())
        .ok_or(AgentError::EmptyResponse)
}

/// Parse a JSON reply, tolerating a surrounding markdown code fence.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, AgentError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).map_err(|e| AgentError::Parse(e.to_string()))
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

/// Shared Gemini REST client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    /// Override the API origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one `generateContent` call and decode the JSON reply as `T`.
    pub async fn generate_json<T: DeserializeOwned>(
        &self,
        model: &str,
        parts: &[Part],
        schema: &Value,
        temperature: Option<f32>,
    ) -> Result<T, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::NotConfigured)?;

        let wire_parts = parts
            .iter()
            .map(|p| match p {
                Part::Text(text) => WirePart::Text { text },
                Part::Image { mime_type, data } => WirePart::Inline {
                    inline_data: InlineData {
                        mime_type,
                        data: STANDARD.encode(data),
                    },
                },
            })
            .collect();

        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: wire_parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
                temperature,
            },
        };

        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);
        debug!(model, "calling Gemini generateContent");
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(AgentError::Api { status, body });
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;
        parse_json_reply(&first_text(data)?)
    }
}
