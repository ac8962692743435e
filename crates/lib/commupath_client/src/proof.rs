//! Proof submission flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use commupath_models::{QuestStatus, VerificationResponse, VerificationResult};
use tokio::sync::watch;

use crate::error::ClientError;
use crate::generation::BusyGuard;
use crate::http::{ApiClient, ProofImage};
use crate::notify::Notifier;
use crate::quests::QuestStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProofState {
    #[default]
    Idle,
    Verifying,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProofOutcome {
    Verified(VerificationResponse),
    /// Rejected or unclear; the quest stays in progress.
    Inconclusive(VerificationResponse),
    Failed(ClientError),
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ProofFlow {
    api: ApiClient,
    quests: QuestStore,
    notifier: Notifier,
    busy: Arc<AtomicBool>,
    state: Arc<watch::Sender<ProofState>>,
}

impl ProofFlow {
    pub fn new(api: ApiClient, quests: QuestStore, notifier: Notifier) -> Self {
        let (tx, _) = watch::channel(ProofState::Idle);
        Self {
            api,
            quests,
            notifier,
            busy: Arc::new(AtomicBool::new(false)),
            state: Arc::new(tx),
        }
    }

    pub fn state(&self) -> ProofState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProofState> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub async fn submit(
        &self,
        quest_id: &str,
        image: Option<&ProofImage>,
        description: Option<&str>,
    ) -> ProofOutcome {
        let Some(image) = image.filter(|i| !i.bytes.is_empty()) else {
            return ProofOutcome::Failed(ClientError::Validation(
                "Please attach a photo as proof".into(),
            ));
        };
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return ProofOutcome::Ignored;
        }
        self.state.send_replace(ProofState::Verifying);
        let _guard = BusyGuard {
            busy: &self.busy,
            state: &self.state,
        };

        match self.api.verify_proof(quest_id, image, description).await {
            Ok(resp) if resp.verification_result == VerificationResult::Verified => {
                self.quests
                    .update_quest_status(quest_id, QuestStatus::Completed);
                self.notifier.success(format!(
                    "Quest verified! +{} points (confidence {:.0}%)",
                    resp.suggested_points,
                    resp.confidence_score * 100.0
                ));
                ProofOutcome::Verified(resp)
            }
            Ok(resp) => {
                self.quests
                    .update_quest_status(quest_id, QuestStatus::InProgress);
                self.notifier.warning(format!(
                    "Verification {}: {}",
                    resp.verification_result.as_str().to_lowercase(),
                    resp.reasoning
                ));
                ProofOutcome::Inconclusive(resp)
            }
            Err(e) => {
                self.notifier.error(e.message());
                ProofOutcome::Failed(e)
            }
        }
    }
}
