//! Page controllers.
//!
//! Each page owns a [`PageState`] and reloads it from the server. Fetch
//! failures become an error notification plus [`PageState::Failed`].

use std::sync::{Arc, Mutex};

use commupath_models::{Coordinates, LeaderboardEntry, Quest, QuestFilter, QuestStatus};
use tracing::warn;

use crate::error::{ClientError, ClientResult};
use crate::feed::{FetchOutcome, QuestFeed};
use crate::http::{ApiClient, ProofImage};
use crate::notify::Notifier;
use crate::proof::{ProofFlow, ProofOutcome};
use crate::quests::{QuestStore, merge_quests};
use crate::session::SessionStore;

/// Ibadan city centre.
pub const DEFAULT_CENTER: Coordinates = Coordinates {
    lat: 7.3775,
    lng: 3.9470,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PageState<T> {
    #[default]
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> PageState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PageState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

/// Shared map centre.
#[derive(Debug, Clone)]
pub struct Viewport {
    center: Arc<Mutex<Coordinates>>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER)
    }
}

impl Viewport {
    pub fn new(center: Coordinates) -> Self {
        Self {
            center: Arc::new(Mutex::new(center)),
        }
    }

    pub fn center(&self) -> Coordinates {
        self.center.lock().map(|c| *c).unwrap_or(DEFAULT_CENTER)
    }

    pub fn recenter(&self, to: Coordinates) {
        if let Ok(mut center) = self.center.lock() {
            *center = to;
        }
    }
}

/// Apply a fetch result to a page. Superseded responses leave it untouched.
fn apply<T>(
    state: &mut PageState<T>,
    notifier: &Notifier,
    result: ClientResult<FetchOutcome<T>>,
) {
    match result {
        Ok(FetchOutcome::Fresh(value)) => *state = PageState::Ready(value),
        Ok(FetchOutcome::Superseded) => {}
        Err(e) => {
            notifier.error(e.message());
            *state = PageState::Failed(e.message().to_string());
        }
    }
}

fn replace_quest(state: &mut PageState<Vec<Quest>>, quest: &Quest) {
    if let PageState::Ready(quests) = state
        && let Some(slot) = quests.iter_mut().find(|q| q.quest_id == quest.quest_id)
    {
        *slot = quest.clone();
    }
}

// -- Map ----------------------------------------------------------------------

#[derive(Debug)]
pub struct MapPage {
    feed: QuestFeed,
    quests: QuestStore,
    notifier: Notifier,
    viewport: Viewport,
    pub filter: QuestFilter,
    pub state: PageState<Vec<Quest>>,
}

impl MapPage {
    pub fn new(feed: QuestFeed, quests: QuestStore, notifier: Notifier, viewport: Viewport) -> Self {
        Self {
            feed,
            quests,
            notifier,
            viewport,
            filter: QuestFilter::default(),
            state: PageState::Loading,
        }
    }

    pub fn center(&self) -> Coordinates {
        self.viewport.center()
    }

    /// All quests from the server plus the ones generated this session.
    pub async fn load(&mut self) -> &PageState<Vec<Quest>> {
        let result = self.feed.all_quests(self.filter).await;
        let local: Vec<Quest> = self
            .quests
            .snapshot()
            .into_iter()
            .filter(|q| self.filter.matches(q))
            .collect();
        let result = result.map(|outcome| match outcome {
            FetchOutcome::Fresh(server) => FetchOutcome::Fresh(merge_quests(local, server)),
            FetchOutcome::Superseded => FetchOutcome::Superseded,
        });
        apply(&mut self.state, &self.notifier, result);
        &self.state
    }
}

// -- Quest hub ----------------------------------------------------------------

#[derive(Debug)]
pub struct QuestHubPage {
    api: ApiClient,
    feed: QuestFeed,
    quests: QuestStore,
    proof: ProofFlow,
    session: SessionStore,
    notifier: Notifier,
    pub state: PageState<Vec<Quest>>,
}

impl QuestHubPage {
    pub fn new(
        api: ApiClient,
        feed: QuestFeed,
        quests: QuestStore,
        proof: ProofFlow,
        session: SessionStore,
        notifier: Notifier,
    ) -> Self {
        Self {
            api,
            feed,
            quests,
            proof,
            session,
            notifier,
            state: PageState::Loading,
        }
    }

    pub async fn load(&mut self) -> &PageState<Vec<Quest>> {
        let result = self.feed.my_quests().await;
        if let Ok(FetchOutcome::Fresh(quests)) = &result {
            self.quests.merge(quests.clone());
        }
        apply(&mut self.state, &self.notifier, result);
        &self.state
    }

    /// Mark a quest as started once the server accepts it.
    pub async fn start(&mut self, quest_id: &str) -> ClientResult<Quest> {
        match self
            .api
            .update_quest_status(quest_id, QuestStatus::InProgress)
            .await
        {
            Ok(quest) => {
                self.quests.update_quest_status(quest_id, quest.status);
                replace_quest(&mut self.state, &quest);
                self.notifier.info(format!("Started: {}", quest.title));
                Ok(quest)
            }
            Err(e) => {
                self.notifier.error(e.message());
                Err(e)
            }
        }
    }

    pub async fn submit_proof(
        &mut self,
        quest_id: &str,
        image: Option<&ProofImage>,
        description: Option<&str>,
    ) -> ProofOutcome {
        let outcome = self.proof.submit(quest_id, image, description).await;
        let status = match &outcome {
            ProofOutcome::Verified(_) => Some(QuestStatus::Completed),
            ProofOutcome::Inconclusive(_) => Some(QuestStatus::InProgress),
            _ => None,
        };
        if let Some(status) = status
            && let PageState::Ready(quests) = &mut self.state
        {
            for quest in quests.iter_mut().filter(|q| q.quest_id == quest_id) {
                quest.status = status;
            }
        }
        if matches!(outcome, ProofOutcome::Verified(_))
            && let Err(e) = self.session.refresh_user().await
        {
            warn!(error = %e, "could not refresh profile after verification");
        }
        outcome
    }
}

// -- Community board ----------------------------------------------------------

#[derive(Debug)]
pub struct CommunityBoardPage {
    api: ApiClient,
    feed: QuestFeed,
    quests: QuestStore,
    notifier: Notifier,
    pub filter: QuestFilter,
    pub state: PageState<Vec<Quest>>,
}

impl CommunityBoardPage {
    pub fn new(api: ApiClient, feed: QuestFeed, quests: QuestStore, notifier: Notifier) -> Self {
        Self {
            api,
            feed,
            quests,
            notifier,
            filter: QuestFilter::default(),
            state: PageState::Loading,
        }
    }

    pub async fn load(&mut self) -> &PageState<Vec<Quest>> {
        let result = self.feed.community_quests(self.filter).await;
        apply(&mut self.state, &self.notifier, result);
        &self.state
    }

    /// Claim a public quest.
    ///
    /// A quest the board already shows as assigned is refused locally.
    pub async fn claim(&mut self, quest_id: &str) -> ClientResult<Quest> {
        let displayed = self
            .state
            .ready()
            .and_then(|qs| qs.iter().find(|q| q.quest_id == quest_id));
        if let Some(quest) = displayed
            && !quest.is_claimable()
        {
            let err = ClientError::Business("This quest has already been claimed".into());
            self.notifier.error(err.message());
            return Err(err);
        }

        match self.api.claim_quest(quest_id).await {
            Ok(claimed) => {
                if let PageState::Ready(quests) = &mut self.state {
                    quests.retain(|q| q.quest_id != quest_id);
                }
                self.quests.add_quest(claimed.clone());
                self.notifier
                    .success(format!("Quest claimed: {}", claimed.title));
                Ok(claimed)
            }
            Err(e) => {
                let e = e.into_business();
                self.notifier.error(e.message());
                Err(e)
            }
        }
    }
}

// -- Creator dashboard --------------------------------------------------------

#[derive(Debug)]
pub struct CreatorDashboardPage {
    api: ApiClient,
    feed: QuestFeed,
    notifier: Notifier,
    pub state: PageState<Vec<Quest>>,
}

impl CreatorDashboardPage {
    pub fn new(api: ApiClient, feed: QuestFeed, notifier: Notifier) -> Self {
        Self {
            api,
            feed,
            notifier,
            state: PageState::Loading,
        }
    }

    pub async fn load(&mut self) -> &PageState<Vec<Quest>> {
        let result = self.feed.created_by_me().await;
        apply(&mut self.state, &self.notifier, result);
        &self.state
    }

    pub async fn toggle_public(&mut self, quest_id: &str, make_public: bool) -> ClientResult<Quest> {
        match self.api.toggle_public(quest_id, make_public).await {
            Ok(quest) => {
                replace_quest(&mut self.state, &quest);
                let label = if make_public { "public" } else { "private" };
                self.notifier
                    .success(format!("\"{}\" is now {label}", quest.title));
                Ok(quest)
            }
            Err(e) => {
                self.notifier.error(e.message());
                Err(e)
            }
        }
    }
}

// -- Leaderboard --------------------------------------------------------------

#[derive(Debug)]
pub struct LeaderboardPage {
    feed: QuestFeed,
    notifier: Notifier,
    pub limit: Option<i64>,
    pub state: PageState<Vec<LeaderboardEntry>>,
}

impl LeaderboardPage {
    pub fn new(feed: QuestFeed, notifier: Notifier) -> Self {
        Self {
            feed,
            notifier,
            limit: None,
            state: PageState::Loading,
        }
    }

    pub async fn load(&mut self) -> &PageState<Vec<LeaderboardEntry>> {
        let result = self.feed.leaderboard(self.limit).await;
        apply(&mut self.state, &self.notifier, result);
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_recenters() {
        let v = Viewport::default();
        assert_eq!(v.center(), DEFAULT_CENTER);
        let shared = v.clone();
        shared.recenter(Coordinates::new(6.5244, 3.3792));
        assert_eq!(v.center(), Coordinates::new(6.5244, 3.3792));
    }

    #[test]
    fn failed_fetch_becomes_notification_and_failed_state() {
        let notifier = Notifier::new();
        let mut state: PageState<Vec<Quest>> = PageState::Loading;
        apply(
            &mut state,
            &notifier,
            Err(ClientError::Network("offline".into())),
        );
        assert_eq!(state, PageState::Failed("offline".into()));
        assert_eq!(notifier.drain().len(), 1);
    }

    #[test]
    fn superseded_fetch_leaves_state_alone() {
        let notifier = Notifier::new();
        let mut state: PageState<Vec<u8>> = PageState::Ready(vec![1]);
        apply(&mut state, &notifier, Ok(FetchOutcome::Superseded));
        assert_eq!(state, PageState::Ready(vec![1]));
        assert!(notifier.drain().is_empty());
    }
}
