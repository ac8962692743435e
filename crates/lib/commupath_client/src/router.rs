//! Application routes and navigation.

use std::fmt::Display;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::debug;

/// Every screen the client can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Login,
    Register,
    Map,
    Quests,
    Community,
    Dashboard,
    Leaderboard,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" | "/login" => Self::Login,
            "/register" => Self::Register,
            "/map" => Self::Map,
            "/quests" => Self::Quests,
            "/community" => Self::Community,
            "/dashboard" => Self::Dashboard,
            "/leaderboard" => Self::Leaderboard,
            _ => Self::NotFound,
        }
    }

    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Map => "/map",
            Self::Quests => "/quests",
            Self::Community => "/community",
            Self::Dashboard => "/dashboard",
            Self::Leaderboard => "/leaderboard",
            Self::NotFound => "/404",
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Map | Self::Quests | Self::Community | Self::Dashboard | Self::Leaderboard
        )
    }

    /// Authenticated visitors leave these routes.
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    pub fn auth_success_redirect() -> Self {
        Self::Map
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// Current location plus a push/replace history.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Arc<watch::Sender<Route>>,
    history: Arc<Mutex<Vec<Route>>>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        let (tx, _) = watch::channel(initial);
        Self {
            current: Arc::new(tx),
            history: Arc::new(Mutex::new(vec![initial])),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    /// Push `route` onto the history.
    pub fn navigate(&self, route: Route) {
        debug!(%route, "navigate");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
        self.current.send_replace(route);
    }

    /// Replace the current history entry with `route`.
    pub fn redirect(&self, route: Route) {
        debug!(from = %self.current(), to = %route, "redirect");
        if let Ok(mut history) = self.history.lock() {
            match history.last_mut() {
                Some(last) => *last = route,
                None => history.push(route),
            }
        }
        self.current.send_replace(route);
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}
