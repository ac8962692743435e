//! Session store: the signed-in user and the authentication lifecycle.

use std::sync::Arc;

use commupath_models::{RegisterRequest, User};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::quests::QuestStore;
use crate::storage::TokenSlot;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// True until [`SessionStore::hydrate`] has finished.
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }
}

impl SessionState {
    fn signed_in(user: User) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }

    fn signed_out() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            is_loading: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    api: ApiClient,
    token: TokenSlot,
    quests: QuestStore,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    /// Create the store and hook it into the client's 401 handling.
    pub fn new(api: ApiClient, quests: QuestStore) -> Self {
        let (tx, _) = watch::channel(SessionState::default());
        let state = Arc::new(tx);

        let on_401 = state.clone();
        api.on_unauthorized(Arc::new(move || {
            on_401.send_modify(|s| {
                s.user = None;
                s.is_authenticated = false;
            });
        }));

        Self {
            token: api.token().clone(),
            api,
            quests,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Restore a persisted session.
    ///
    /// Any failure leaves the session signed out with the token cleared.
    pub async fn hydrate(&self) {
        if !self.token.is_present() {
            self.state.send_replace(SessionState::signed_out());
            return;
        }
        match self.api.me().await {
            Ok(user) => {
                info!(username = %user.username, "session restored");
                self.state.send_replace(SessionState::signed_in(user));
            }
            Err(e) => {
                warn!(error = %e, "could not restore session");
                self.token.clear();
                self.state.send_replace(SessionState::signed_out());
            }
        }
    }

    pub async fn wait_until_loaded(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|s| !s.is_loading).await;
    }

    /// Exchange credentials for a token, then load the profile.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let token = self.api.login(username, password).await?;
        self.token.set(&token.access_token);
        match self.api.me().await {
            Ok(user) => {
                info!(username = %user.username, "logged in");
                self.state.send_replace(SessionState::signed_in(user.clone()));
                Ok(user)
            }
            Err(e) => {
                self.token.clear();
                self.state.send_replace(SessionState::signed_out());
                Err(e)
            }
        }
    }

    /// Create an account and sign straight into it.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> ClientResult<User> {
        let req = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            full_name: full_name.map(str::to_string),
        };
        self.api.register(&req).await?;
        info!(username, "registered");
        self.login(username, password).await
    }

    /// Forget the user and token. Safe to call repeatedly.
    pub fn logout(&self) {
        self.token.clear();
        self.quests.clear();
        self.state.send_replace(SessionState::signed_out());
    }

    /// Re-fetch the profile. Does nothing without a token.
    pub async fn refresh_user(&self) -> ClientResult<Option<User>> {
        if !self.token.is_present() {
            return Ok(None);
        }
        let user = self.api.me().await?;
        self.state.send_modify(|s| {
            s.user = Some(user.clone());
            s.is_authenticated = true;
            s.is_loading = false;
        });
        Ok(Some(user))
    }
}
