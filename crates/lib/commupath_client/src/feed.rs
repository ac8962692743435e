//! Sequence-guarded quest retrieval.
//!
//! Every fetch for a view takes the next sequence number for that view and
//! aborts the request it supersedes. A response is handed back as
//! [`FetchOutcome::Fresh`] only if no newer fetch for the same view started
//! while it was in flight.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use commupath_models::{LeaderboardEntry, Quest, QuestFilter};
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::http::ApiClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Mine,
    All,
    Community,
    CreatedByMe,
    Leaderboard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fresh(T),
    /// A newer fetch for the same view replaced this one.
    Superseded,
}

impl<T> FetchOutcome<T> {
    pub fn fresh(self) -> Option<T> {
        match self {
            FetchOutcome::Fresh(v) => Some(v),
            FetchOutcome::Superseded => None,
        }
    }
}

#[derive(Debug, Default)]
struct ViewSlot {
    latest: u64,
    inflight: Option<AbortHandle>,
}

#[derive(Debug, Clone)]
pub struct QuestFeed {
    api: ApiClient,
    views: Arc<Mutex<HashMap<ViewKey, ViewSlot>>>,
}

impl QuestFeed {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            views: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Latest sequence number issued for `view`.
    pub fn latest(&self, view: ViewKey) -> u64 {
        self.views
            .lock()
            .ok()
            .and_then(|v| v.get(&view).map(|s| s.latest))
            .unwrap_or(0)
    }

    pub async fn fetch<T, F, Fut>(&self, view: ViewKey, request: F) -> ClientResult<FetchOutcome<T>>
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::spawn(request(self.api.clone()));
        let seq = {
            let mut views = self
                .views
                .lock()
                .map_err(|_| ClientError::Network("Quest feed state poisoned".into()))?;
            let slot = views.entry(view).or_default();
            slot.latest += 1;
            if let Some(previous) = slot.inflight.replace(task.abort_handle()) {
                previous.abort();
            }
            slot.latest
        };

        let result = task.await;

        let is_latest = {
            let mut views = self
                .views
                .lock()
                .map_err(|_| ClientError::Network("Quest feed state poisoned".into()))?;
            let slot = views.entry(view).or_default();
            let is_latest = slot.latest == seq;
            if is_latest {
                slot.inflight = None;
            }
            is_latest
        };

        if !is_latest {
            debug!(?view, seq, "discarding superseded response");
            return Ok(FetchOutcome::Superseded);
        }
        match result {
            Ok(res) => res.map(FetchOutcome::Fresh),
            Err(e) if e.is_cancelled() => Ok(FetchOutcome::Superseded),
            Err(e) => Err(ClientError::Network(format!("Request task failed: {e}"))),
        }
    }

    pub async fn my_quests(&self) -> ClientResult<FetchOutcome<Vec<Quest>>> {
        self.fetch(ViewKey::Mine, |api| async move { api.my_quests().await })
            .await
    }

    pub async fn all_quests(&self, filter: QuestFilter) -> ClientResult<FetchOutcome<Vec<Quest>>> {
        self.fetch(ViewKey::All, move |api| async move { api.all_quests(&filter).await })
            .await
    }

    pub async fn community_quests(
        &self,
        filter: QuestFilter,
    ) -> ClientResult<FetchOutcome<Vec<Quest>>> {
        self.fetch(ViewKey::Community, move |api| async move {
            api.community_quests(&filter).await
        })
        .await
    }

    pub async fn created_by_me(&self) -> ClientResult<FetchOutcome<Vec<Quest>>> {
        self.fetch(ViewKey::CreatedByMe, |api| async move {
            api.created_by_me().await
        })
        .await
    }

    pub async fn leaderboard(
        &self,
        limit: Option<i64>,
    ) -> ClientResult<FetchOutcome<Vec<LeaderboardEntry>>> {
        self.fetch(ViewKey::Leaderboard, move |api| async move {
            api.leaderboard(limit).await
        })
        .await
    }
}
