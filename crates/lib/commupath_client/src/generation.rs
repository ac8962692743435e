//! Quest generation flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use commupath_models::{Quest, QuestRequest};
use tokio::sync::watch;

use crate::error::ClientError;
use crate::http::ApiClient;
use crate::notify::Notifier;
use crate::pages::Viewport;
use crate::quests::QuestStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Generating,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Generated(Quest),
    Failed(ClientError),
    /// A generation was already running.
    Ignored,
}

/// Resets the trigger when the request finishes or is dropped.
pub(crate) struct BusyGuard<'a, S: Default> {
    pub(crate) busy: &'a AtomicBool,
    pub(crate) state: &'a watch::Sender<S>,
}

impl<S: Default> Drop for BusyGuard<'_, S> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
        self.state.send_replace(S::default());
    }
}

#[derive(Debug, Clone)]
pub struct GenerationFlow {
    api: ApiClient,
    quests: QuestStore,
    notifier: Notifier,
    viewport: Viewport,
    busy: Arc<AtomicBool>,
    state: Arc<watch::Sender<GenerationState>>,
}

impl GenerationFlow {
    pub fn new(api: ApiClient, quests: QuestStore, notifier: Notifier, viewport: Viewport) -> Self {
        let (tx, _) = watch::channel(GenerationState::Idle);
        Self {
            api,
            quests,
            notifier,
            viewport,
            busy: Arc::new(AtomicBool::new(false)),
            state: Arc::new(tx),
        }
    }

    pub fn state(&self) -> GenerationState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn generate(&self, req: QuestRequest) -> GenerationOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return GenerationOutcome::Ignored;
        }
        self.state.send_replace(GenerationState::Generating);
        let _guard = BusyGuard {
            busy: &self.busy,
            state: &self.state,
        };

        match self.api.generate_quest(&req).await {
            Ok(quest) => {
                self.quests.merge(vec![quest.clone()]);
                self.viewport.recenter(quest.location.coordinates());
                self.notifier
                    .success(format!("New quest generated: {}", quest.title));
                GenerationOutcome::Generated(quest)
            }
            Err(e) => {
                self.notifier.error(e.message());
                GenerationOutcome::Failed(e)
            }
        }
    }
}
