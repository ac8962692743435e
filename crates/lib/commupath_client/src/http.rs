//! Typed HTTP client for the CommuPath API.
//!
//! Authenticated calls attach the stored bearer token. A 401 on any of them
//! clears the token, sends the navigator to the login page and runs the
//! registered unauthorized hooks. Without a token, authenticated calls fail
//! locally with [`ClientError::Auth`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use commupath_models::{
    EvaluationResponse, HealthResponse, LeaderboardEntry, LeaderboardQuery, LoginForm, Quest,
    QuestFilter, QuestRequest, QuestStatus, RegisterRequest, StatusUpdateRequest, Submission,
    TogglePublicRequest, TokenResponse, User, VerificationResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult, GENERIC_NETWORK_MESSAGE, extract_detail};
use crate::router::{Navigator, Route};
use crate::storage::TokenSlot;

/// Called after a 401 has cleared the token.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Image attached to a proof submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ProofImage {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Guess the MIME type from the file extension.
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            "gif" => "image/gif",
            _ => "application/octet-stream",
        };
        Self::new(file_name, mime_type, bytes)
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: TokenSlot,
    navigator: Navigator,
    hooks: Arc<Mutex<Vec<UnauthorizedHook>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        token: TokenSlot,
        navigator: Navigator,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            navigator,
            hooks: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> &TokenSlot {
        &self.token
    }

    pub fn on_unauthorized(&self, hook: UnauthorizedHook) {
        if let Ok(mut hooks) = self.hooks.lock() {
            hooks.push(hook);
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let token = self
            .token
            .get()
            .ok_or_else(|| ClientError::Auth("Not authenticated".into()))?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    fn handle_unauthorized(&self) {
        warn!("session rejected by server, clearing token");
        self.token.clear();
        if self.navigator.current() != Route::Login {
            self.navigator.redirect(Route::auth_failure_redirect());
        }
        let hooks = self.hooks.lock().map(|h| h.clone()).unwrap_or_default();
        for hook in hooks {
            hook();
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder, authed: bool) -> ClientResult<T> {
        let resp = req.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            ClientError::Network(GENERIC_NETWORK_MESSAGE.into())
        })?;
        let status = resp.status();
        debug!(url = %resp.url(), status = status.as_u16(), "response");

        if status.is_success() {
            return resp.json::<T>().await.map_err(|e| {
                warn!(error = %e, "unexpected response body");
                ClientError::Network("Invalid response from server".into())
            });
        }

        if authed && status == reqwest::StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ClientError::from_status(status.as_u16(), extract_detail(&body)))
    }

    // -- Auth ---------------------------------------------------------------

    pub async fn register(&self, req: &RegisterRequest) -> ClientResult<User> {
        let builder = self.request(Method::POST, "/api/auth/register").json(req);
        self.send(builder, false).await
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        let builder = self.request(Method::POST, "/api/auth/login").form(&form);
        self.send(builder, false).await
    }

    pub async fn me(&self) -> ClientResult<User> {
        let builder = self.authed(Method::GET, "/api/auth/me")?;
        self.send(builder, true).await
    }

    // -- Quests -------------------------------------------------------------

    pub async fn generate_quest(&self, req: &QuestRequest) -> ClientResult<Quest> {
        let builder = self.authed(Method::POST, "/api/generate-quest")?.json(req);
        self.send(builder, true).await
    }

    pub async fn my_quests(&self) -> ClientResult<Vec<Quest>> {
        let builder = self.authed(Method::GET, "/api/quests/my")?;
        self.send(builder, true).await
    }

    pub async fn all_quests(&self, filter: &QuestFilter) -> ClientResult<Vec<Quest>> {
        let builder = self.authed(Method::GET, "/api/quests/all")?.query(filter);
        self.send(builder, true).await
    }

    pub async fn community_quests(&self, filter: &QuestFilter) -> ClientResult<Vec<Quest>> {
        let builder = self.authed(Method::GET, "/api/quests/community")?.query(filter);
        self.send(builder, true).await
    }

    pub async fn created_by_me(&self) -> ClientResult<Vec<Quest>> {
        let builder = self.authed(Method::GET, "/api/quests/created-by-me")?;
        self.send(builder, true).await
    }

    pub async fn update_quest_status(&self, quest_id: &str, status: QuestStatus) -> ClientResult<Quest> {
        let builder = self
            .authed(Method::PUT, &format!("/api/quests/{quest_id}/status"))?
            .json(&StatusUpdateRequest { status });
        self.send(builder, true).await
    }

    pub async fn claim_quest(&self, quest_id: &str) -> ClientResult<Quest> {
        let builder = self.authed(Method::POST, &format!("/api/quests/{quest_id}/claim"))?;
        self.send(builder, true).await
    }

    pub async fn toggle_public(&self, quest_id: &str, make_public: bool) -> ClientResult<Quest> {
        let builder = self
            .authed(Method::POST, &format!("/api/quests/{quest_id}/toggle-public"))?
            .json(&TogglePublicRequest { make_public });
        self.send(builder, true).await
    }

    pub async fn quest_submissions(&self, quest_id: &str) -> ClientResult<Vec<Submission>> {
        let builder = self.authed(Method::GET, &format!("/api/quests/{quest_id}/submissions"))?;
        self.send(builder, true).await
    }

    /// Upload a proof photo for verification. One multipart request, no retry.
    pub async fn verify_proof(
        &self,
        quest_id: &str,
        image: &ProofImage,
        description: Option<&str>,
    ) -> ClientResult<VerificationResponse> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|_| ClientError::Validation(format!("Invalid image type: {}", image.mime_type)))?;
        let mut form = Form::new()
            .text("quest_id", quest_id.to_string())
            .part("image", part);
        if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
            form = form.text("description", description.to_string());
        }
        let builder = self
            .authed(Method::POST, "/api/verify-quest-proof")?
            .multipart(form);
        self.send(builder, true).await
    }

    pub async fn evaluate_quest(&self, quest: &Quest) -> ClientResult<EvaluationResponse> {
        let builder = self.authed(Method::POST, "/api/evaluate-quest")?.json(quest);
        self.send(builder, true).await
    }

    // -- Public -------------------------------------------------------------

    pub async fn leaderboard(&self, limit: Option<i64>) -> ClientResult<Vec<LeaderboardEntry>> {
        let builder = self
            .request(Method::GET, "/api/leaderboard")
            .query(&LeaderboardQuery { limit });
        self.send(builder, false).await
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let builder = self.request(Method::GET, "/api/health");
        self.send(builder, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client() -> ApiClient {
        let token = TokenSlot::new(Arc::new(MemoryStorage::new()));
        ApiClient::new(
            "http://127.0.0.1:9/",
            Duration::from_secs(1),
            token,
            Navigator::new(Route::Map),
        )
        .unwrap()
    }

    #[test]
    fn base_url_is_trimmed() {
        assert_eq!(client().base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(ProofImage::from_file_name("a.JPG", vec![]).mime_type, "image/jpeg");
        assert_eq!(ProofImage::from_file_name("a.webp", vec![]).mime_type, "image/webp");
        assert_eq!(
            ProofImage::from_file_name("notes", vec![]).mime_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn missing_token_fails_locally() {
        let err = client().me().await.unwrap_err();
        assert_eq!(err, ClientError::Auth("Not authenticated".into()));
    }

    #[test]
    fn unauthorized_clears_token_and_redirects() {
        let c = client();
        c.token().set("stale");
        let fired = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = fired.clone();
        c.on_unauthorized(Arc::new(move || {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }));
        c.handle_unauthorized();
        assert!(!c.token().is_present());
        assert_eq!(c.navigator.current(), Route::Login);
        assert!(fired.load(std::sync::atomic::Ordering::SeqCst));
    }
}
