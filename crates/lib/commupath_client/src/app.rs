//! Client composition root.

use std::sync::Arc;
use std::time::Duration;

use crate::error::ClientResult;
use crate::feed::QuestFeed;
use crate::generation::GenerationFlow;
use crate::guard::RouteGuard;
use crate::http::ApiClient;
use crate::notify::Notifier;
use crate::pages::{
    CommunityBoardPage, CreatorDashboardPage, LeaderboardPage, MapPage, QuestHubPage, Viewport,
};
use crate::proof::ProofFlow;
use crate::quests::QuestStore;
use crate::router::{Navigator, Route};
use crate::session::SessionStore;
use crate::storage::{CredentialStore, TokenSlot};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// `COMMUPATH_API_URL` or the local default.
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("COMMUPATH_API_URL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ..Self::default()
        }
    }
}

/// Every shared store and service, built once and handed to pages.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub navigator: Navigator,
    pub notifier: Notifier,
    pub api: ApiClient,
    pub session: SessionStore,
    pub quests: QuestStore,
    pub feed: QuestFeed,
    pub viewport: Viewport,
    pub generation: GenerationFlow,
    pub proof: ProofFlow,
}

impl AppContext {
    pub fn new(config: ClientConfig, store: Arc<dyn CredentialStore>) -> ClientResult<Self> {
        let token = TokenSlot::new(store);
        let navigator = Navigator::new(Route::default());
        let notifier = Notifier::new();
        let api = ApiClient::new(&config.api_url, config.timeout, token, navigator.clone())?;
        let quests = QuestStore::new();
        let session = SessionStore::new(api.clone(), quests.clone());
        let feed = QuestFeed::new(api.clone());
        let viewport = Viewport::default();
        let generation =
            GenerationFlow::new(api.clone(), quests.clone(), notifier.clone(), viewport.clone());
        let proof = ProofFlow::new(api.clone(), quests.clone(), notifier.clone());
        Ok(Self {
            config,
            navigator,
            notifier,
            api,
            session,
            quests,
            feed,
            viewport,
            generation,
            proof,
        })
    }

    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone(), self.navigator.clone())
    }

    pub fn map_page(&self) -> MapPage {
        MapPage::new(
            self.feed.clone(),
            self.quests.clone(),
            self.notifier.clone(),
            self.viewport.clone(),
        )
    }

    pub fn quest_hub(&self) -> QuestHubPage {
        QuestHubPage::new(
            self.api.clone(),
            self.feed.clone(),
            self.quests.clone(),
            self.proof.clone(),
            self.session.clone(),
            self.notifier.clone(),
        )
    }

    pub fn community_board(&self) -> CommunityBoardPage {
        CommunityBoardPage::new(
            self.api.clone(),
            self.feed.clone(),
            self.quests.clone(),
            self.notifier.clone(),
        )
    }

    pub fn creator_dashboard(&self) -> CreatorDashboardPage {
        CreatorDashboardPage::new(self.api.clone(), self.feed.clone(), self.notifier.clone())
    }

    pub fn leaderboard_page(&self) -> LeaderboardPage {
        LeaderboardPage::new(self.feed.clone(), self.notifier.clone())
    }
}
