mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use commupath_client::guard::GuardDecision;
use commupath_client::storage::{CredentialStore, TOKEN_KEY};
use commupath_client::{AppContext, ClientConfig, ClientError, MemoryStorage, Route};
use common::FakeServer;

#[tokio::test]
async fn register_auto_logs_in_with_fresh_profile() {
    let server = FakeServer::start().await;
    let ctx = server.context();

    let user = ctx
        .session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();
    assert_eq!(user.username, "alice");
    assert!(ctx.session.is_authenticated());

    let me = ctx.api.me().await.unwrap();
    assert_eq!(me.points, 0);
    assert_eq!(me.completed_quests, 0);
}

#[tokio::test]
async fn duplicate_registration_surfaces_server_detail() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    ctx.session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();
    ctx.session.logout();

    let err = ctx
        .session
        .register("alice", "b@x.com", "secret2", None)
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::Validation("Username already registered".into()));
    assert!(!ctx.session.is_authenticated());
}

#[tokio::test]
async fn login_authenticates_only_after_profile_fetch() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    ctx.session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();
    ctx.session.logout();

    server.state.fail_me.store(true, Ordering::SeqCst);
    let err = ctx.session.login("alice", "secret1").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert!(!ctx.session.is_authenticated());
    assert!(!ctx.api.token().is_present());

    server.state.fail_me.store(false, Ordering::SeqCst);
    let user = ctx.session.login("alice", "secret1").await.unwrap();
    let state = ctx.session.state();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(user));
}

#[tokio::test]
async fn login_stays_unauthenticated_while_profile_is_pending() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    ctx.session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();
    ctx.session.logout();

    server.state.slow_me_ms.store(300, Ordering::SeqCst);
    let mut rx = ctx.session.subscribe();
    let session = ctx.session.clone();
    let login = tokio::spawn(async move { session.login("alice", "secret1").await });

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(ctx.api.token().is_present(), "token is stored before the profile loads");
    assert!(!ctx.session.is_authenticated());
    assert!(!rx.has_changed().unwrap());

    let user = login.await.unwrap().unwrap();
    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(state.is_authenticated);
    assert_eq!(state.user, Some(user));
}

#[tokio::test]
async fn bad_credentials_are_an_auth_error() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    ctx.navigator.navigate(Route::Login);

    let err = ctx.session.login("nobody", "wrong").await.unwrap_err();
    assert_eq!(err, ClientError::Auth("Incorrect username or password".into()));
    assert_eq!(ctx.navigator.current(), Route::Login);
}

#[tokio::test]
async fn unauthorized_response_clears_token_and_blocks_later_calls() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    ctx.session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();
    ctx.navigator.navigate(Route::Quests);

    server.state.revoke_tokens();
    let err = ctx.api.my_quests().await.unwrap_err();
    assert!(matches!(err, ClientError::Auth(_)));
    assert!(!ctx.api.token().is_present());
    assert!(!ctx.session.is_authenticated());
    assert_eq!(ctx.navigator.current(), Route::Login);

    let before = server.state.request_count();
    let err = ctx.api.community_quests(&Default::default()).await.unwrap_err();
    assert_eq!(err, ClientError::Auth("Not authenticated".into()));
    assert_eq!(server.state.request_count(), before);
}

#[tokio::test]
async fn logout_is_idempotent() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    ctx.session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();

    ctx.session.logout();
    let once = ctx.session.state();
    let requests = server.state.request_count();
    ctx.session.logout();
    assert_eq!(ctx.session.state(), once);
    assert!(!once.is_authenticated);
    assert!(ctx.quests.is_empty());
    assert_eq!(server.state.request_count(), requests);
}

#[tokio::test]
async fn hydrate_restores_persisted_token() {
    let server = FakeServer::start().await;
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStorage::new());
    let config = ClientConfig {
        api_url: server.url.clone(),
        ..ClientConfig::default()
    };

    let first = AppContext::new(config.clone(), store.clone()).unwrap();
    first
        .session
        .register("alice", "a@x.com", "secret1", None)
        .await
        .unwrap();

    let second = AppContext::new(config, store).unwrap();
    let guard = second.route_guard();
    assert_eq!(guard.resolve(Route::Map), GuardDecision::Loading);

    second.session.hydrate().await;
    assert!(second.session.is_authenticated());
    assert_eq!(guard.enter(Route::Map).await, GuardDecision::Render);
    assert_eq!(second.navigator.current(), Route::Map);
}

#[tokio::test]
async fn hydrate_failure_degrades_to_logged_out() {
    let server = FakeServer::start().await;
    let store: Arc<dyn CredentialStore> = Arc::new(MemoryStorage::new());
    store.set(TOKEN_KEY, "token-from-another-server");
    let config = ClientConfig {
        api_url: server.url.clone(),
        ..ClientConfig::default()
    };
    let ctx = AppContext::new(config, store.clone()).unwrap();

    ctx.session.hydrate().await;
    let state = ctx.session.state();
    assert!(!state.is_loading);
    assert!(!state.is_authenticated);
    assert_eq!(store.get(TOKEN_KEY), None);

    let guard = ctx.route_guard();
    assert_eq!(
        guard.enter(Route::Dashboard).await,
        GuardDecision::Redirect(Route::Login)
    );
    assert_eq!(ctx.navigator.current(), Route::Login);
}

#[tokio::test]
async fn refresh_without_token_is_a_no_op() {
    let server = FakeServer::start().await;
    let ctx = server.context();
    assert_eq!(ctx.session.refresh_user().await.unwrap(), None);
    assert_eq!(server.state.request_count(), 0);
}
