//! Route guard.

use tracing::debug;

use crate::router::{Navigator, Route};
use crate::session::{SessionState, SessionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session still hydrating.
    Loading,
    Render,
    Redirect(Route),
}

/// Decide what to show for `route` given the session.
pub fn decide(route: Route, session: &SessionState) -> GuardDecision {
    if session.is_loading {
        return GuardDecision::Loading;
    }
    if route.requires_auth() && !session.is_authenticated {
        return GuardDecision::Redirect(Route::auth_failure_redirect());
    }
    if route.should_redirect_when_authenticated() && session.is_authenticated {
        return GuardDecision::Redirect(Route::auth_success_redirect());
    }
    GuardDecision::Render
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: SessionStore,
    navigator: Navigator,
}

impl RouteGuard {
    pub fn new(session: SessionStore, navigator: Navigator) -> Self {
        Self { session, navigator }
    }

    /// Navigate to `route`, following any redirect the guard imposes.
    pub fn resolve(&self, route: Route) -> GuardDecision {
        let decision = decide(route, &self.session.state());
        match decision {
            GuardDecision::Redirect(target) => {
                debug!(%route, %target, "guard redirect");
                self.navigator.redirect(target);
            }
            GuardDecision::Render => {
                if self.navigator.current() != route {
                    self.navigator.navigate(route);
                }
            }
            GuardDecision::Loading => {}
        }
        decision
    }

    /// Wait for hydration, then resolve.
    pub async fn enter(&self, route: Route) -> GuardDecision {
        self.session.wait_until_loaded().await;
        self.resolve(route)
    }
}
