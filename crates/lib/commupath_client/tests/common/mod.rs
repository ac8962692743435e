//! Minimal in-process stand-in for the CommuPath API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use commupath_client::{AppContext, ClientConfig, MemoryStorage};
use commupath_models::{
    ImpactLevel, LeaderboardEntry, LoginForm, Quest, QuestFilter, QuestRequest, QuestStatus,
    RegisterRequest, StatusUpdateRequest, TokenResponse, User, VerificationResponse,
    VerificationResult,
};
use serde_json::json;

#[derive(Default)]
pub struct FakeState {
    pub requests: AtomicUsize,
    /// Delay applied to `/api/quests/all` when filtering by category.
    pub slow_filtered_all_ms: AtomicU64,
    pub fail_me: AtomicBool,
    /// Delay applied to `/api/auth/me`.
    pub slow_me_ms: AtomicU64,
    pub verdict: Mutex<Option<VerificationResult>>,
    next_id: AtomicUsize,
    users: Mutex<HashMap<String, (String, User)>>,
    tokens: Mutex<HashMap<String, String>>,
    quests: Mutex<Vec<Quest>>,
}

impl FakeState {
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Invalidate every issued token.
    pub fn revoke_tokens(&self) {
        self.tokens.lock().unwrap().clear();
    }

    pub fn insert_quest(&self, quest: Quest) {
        self.quests.lock().unwrap().push(quest);
    }

    pub fn quest(&self, id: &str) -> Option<Quest> {
        self.quests.lock().unwrap().iter().find(|q| q.quest_id == id).cloned()
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<User> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?
            .to_string();
        let username = self.tokens.lock().unwrap().get(&token)?.clone();
        self.users
            .lock()
            .unwrap()
            .get(&username)
            .map(|(_, u)| u.clone())
    }
}

pub struct FakeServer {
    pub url: String,
    pub state: Arc<FakeState>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/auth/register", post(register))
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .route("/api/generate-quest", post(generate))
            .route("/api/quests/my", get(my_quests))
            .route("/api/quests/all", get(all_quests))
            .route("/api/quests/community", get(community_quests))
            .route("/api/quests/{id}/status", put(update_status))
            .route("/api/quests/{id}/claim", post(claim))
            .route("/api/verify-quest-proof", post(verify))
            .route("/api/leaderboard", get(leaderboard))
            .layer(axum::middleware::from_fn_with_state(state.clone(), count))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn context(&self) -> AppContext {
        let config = ClientConfig {
            api_url: self.url.clone(),
            timeout: Duration::from_secs(5),
        };
        AppContext::new(config, Arc::new(MemoryStorage::new())).unwrap()
    }
}

/// Accepts connections and never answers them.
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

pub fn quest(id: &str, assigned_to: Option<&str>) -> Quest {
    serde_json::from_value(json!({
        "quest_id": id,
        "title": "Clean Up Bodija Market Drains",
        "description": "Clear the blocked drains around Bodija market with neighbours.",
        "category": "Environment",
        "difficulty": "Medium",
        "impact_metric": "Clear 50 meters of drainage",
        "location": {"lat": 7.4336, "lng": 3.9057},
        "assigned_to": assigned_to,
    }))
    .unwrap()
}

fn detail(status: StatusCode, msg: &str) -> Response {
    (status, Json(json!({ "detail": msg }))).into_response()
}

async fn count(State(state): State<Arc<FakeState>>, req: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    next.run(req).await
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy", "service": "CommuPath API", "gemini_configured": false}))
}

async fn register(
    State(state): State<Arc<FakeState>>,
    Json(req): Json<RegisterRequest>,
) -> Response {
    let mut users = state.users.lock().unwrap();
    if users.contains_key(&req.username) {
        return detail(StatusCode::BAD_REQUEST, "Username already registered");
    }
    let n = state.next_id.fetch_add(1, Ordering::SeqCst);
    let user = User {
        id: format!("user-{n}"),
        username: req.username.clone(),
        email: req.email,
        full_name: req.full_name,
        impact_level: ImpactLevel::Novice,
        points: 0,
        completed_quests: 0,
        created_at: None,
    };
    users.insert(req.username, (req.password, user.clone()));
    Json(user).into_response()
}

async fn login(State(state): State<Arc<FakeState>>, Form(form): Form<LoginForm>) -> Response {
    let ok = state
        .users
        .lock()
        .unwrap()
        .get(&form.username)
        .is_some_and(|(pw, _)| *pw == form.password);
    if !ok {
        return detail(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }
    let n = state.next_id.fetch_add(1, Ordering::SeqCst);
    let token = format!("token-{n}");
    state
        .tokens
        .lock()
        .unwrap()
        .insert(token.clone(), form.username);
    Json(TokenResponse {
        access_token: token,
        token_type: "bearer".into(),
    })
    .into_response()
}

async fn me(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if state.fail_me.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    let ms = state.slow_me_ms.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(ms)).await;
    match state.user_for(&headers) {
        Some(user) => Json(user).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"),
    }
}

async fn generate(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(req): Json<QuestRequest>,
) -> Response {
    let Some(user) = state.user_for(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let n = state.next_id.fetch_add(1, Ordering::SeqCst);
    let mut q = quest(&format!("quest_{n:08x}"), None);
    q.category = req.resolution_category;
    q.location.lat = req.coordinates.lat;
    q.location.lng = req.coordinates.lng;
    q.created_by = Some(user.id.clone());
    q.assigned_to = (!req.make_public).then(|| user.id.clone());
    state.insert_quest(q.clone());
    Json(q).into_response()
}

async fn my_quests(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    let Some(user) = state.user_for(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let quests: Vec<Quest> = state
        .quests
        .lock()
        .unwrap()
        .iter()
        .filter(|q| q.assigned_to.as_deref() == Some(user.id.as_str()))
        .cloned()
        .collect();
    Json(quests).into_response()
}

async fn all_quests(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(filter): Query<QuestFilter>,
) -> Response {
    if state.user_for(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    if filter.category.is_some() {
        let ms = state.slow_filtered_all_ms.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
    let quests: Vec<Quest> = state
        .quests
        .lock()
        .unwrap()
        .iter()
        .filter(|q| filter.matches(q))
        .cloned()
        .collect();
    Json(quests).into_response()
}

async fn community_quests(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(filter): Query<QuestFilter>,
) -> Response {
    if state.user_for(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let quests: Vec<Quest> = state
        .quests
        .lock()
        .unwrap()
        .iter()
        .filter(|q| q.assigned_to.is_none() && filter.matches(q))
        .cloned()
        .collect();
    Json(quests).into_response()
}

async fn update_status(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Response {
    if state.user_for(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let mut quests = state.quests.lock().unwrap();
    match quests.iter_mut().find(|q| q.quest_id == id) {
        Some(q) => {
            q.status = body.status;
            Json(q.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Quest not found"),
    }
}

async fn claim(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Some(user) = state.user_for(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    };
    let mut quests = state.quests.lock().unwrap();
    match quests.iter_mut().find(|q| q.quest_id == id) {
        Some(q) if q.assigned_to.is_some() => {
            detail(StatusCode::BAD_REQUEST, "Quest has already been claimed")
        }
        Some(q) => {
            q.assigned_to = Some(user.id);
            Json(q.clone()).into_response()
        }
        None => detail(StatusCode::NOT_FOUND, "Quest not found"),
    }
}

async fn verify(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if state.user_for(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let mut quest_id = None;
    let mut has_image = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("quest_id") => quest_id = field.text().await.ok(),
            Some("image") => has_image = field.bytes().await.is_ok_and(|b| !b.is_empty()),
            _ => {}
        }
    }
    if quest_id.is_none() || !has_image {
        return detail(StatusCode::BAD_REQUEST, "An image file is required");
    }
    let verdict = state
        .verdict
        .lock()
        .unwrap()
        .unwrap_or(VerificationResult::Verified);
    let verified = verdict == VerificationResult::Verified;
    if let Some(id) = &quest_id
        && let Some(q) = state.quests.lock().unwrap().iter_mut().find(|q| &q.quest_id == id)
    {
        q.status = if verified {
            QuestStatus::Completed
        } else {
            QuestStatus::InProgress
        };
    }
    Json(VerificationResponse {
        verification_result: verdict,
        suggested_points: if verified { 40 } else { 0 },
        confidence_score: if verified { 0.92 } else { 0.3 },
        reasoning: "Photo shows cleared drains".into(),
        key_observations: vec!["clean drain".into()],
        submission_id: Some("sub-1".into()),
    })
    .into_response()
}

async fn leaderboard() -> Json<Vec<LeaderboardEntry>> {
    Json(vec![LeaderboardEntry {
        rank: 1,
        username: "tunde".into(),
        points: 520,
        completed_quests: 9,
        impact_level: ImpactLevel::Hero,
    }])
}
