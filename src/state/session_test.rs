use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::net::api::{LOGIN_ENDPOINT, LOGOUT_ENDPOINT, SESSION_ENDPOINT};
use crate::net::http::Method;
use crate::net::http::test_helpers::{MockTransport, api_with};

const ANA: &str = r#"{"id":"u-1","name":"Ana","email":"ana@example.test","role":"admin"}"#;
const LUIS: &str = r#"{"id":"u-2","name":"Luis","email":"luis@example.test","role":"coordinador"}"#;

fn store_with(mock: &Arc<MockTransport>) -> SessionStore {
    SessionStore::new(api_with(mock))
}

async fn logged_in_as_ana(mock: &Arc<MockTransport>) -> SessionStore {
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, ANA);
    let store = store_with(mock);
    store.initialize().await;
    assert!(store.is_authenticated());
    store
}

// =============================================================================
// initialize
// =============================================================================

#[test]
fn new_store_is_pending() {
    let store = store_with(&Arc::new(MockTransport::new()));
    let state = store.snapshot();
    assert!(state.loading);
    assert!(state.user.is_none());
    assert_eq!(state.role(), Role::Visitor);
}

#[tokio::test]
async fn initialize_restores_user() {
    let mock = Arc::new(MockTransport::new());
    let store = logged_in_as_ana(&mock).await;
    let state = store.snapshot();
    assert!(!state.loading);
    assert_eq!(state.user.unwrap().name, "Ana");
    assert!(store.has_role(Role::Admin));
}

#[tokio::test]
async fn initialize_unauthorized_is_silent_anonymous() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, SESSION_ENDPOINT, 401, "No autenticado");
    let store = store_with(&mock);
    store.initialize().await;
    assert_eq!(store.snapshot(), SessionState::anonymous());
}

#[tokio::test]
async fn initialize_network_failure_records_error() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(Method::Get, SESSION_ENDPOINT, "connection refused");
    let store = store_with(&mock);
    store.initialize().await;
    let state = store.snapshot();
    assert!(!state.loading);
    assert!(state.user.is_none());
    assert_eq!(state.error.as_deref(), Some("No se pudo conectar con el servidor"));
}

#[tokio::test]
async fn concurrent_initialize_issues_one_request() {
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_millis(20)));
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, ANA);
    let store = store_with(&mock);

    tokio::join!(store.initialize(), store.initialize());
    futures::future::join_all((0..5).map(|_| store.initialize())).await;

    assert_eq!(mock.count(Method::Get, SESSION_ENDPOINT), 1);
    assert!(store.is_authenticated());
}

#[tokio::test]
async fn cloned_handles_share_single_flight() {
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_millis(10)));
    mock.respond(Method::Get, SESSION_ENDPOINT, 401, "");
    let store = store_with(&mock);
    let other = store.clone();

    let handle = tokio::spawn(async move { other.initialize().await });
    store.initialize().await;
    handle.await.unwrap();
    assert_eq!(mock.count(Method::Get, SESSION_ENDPOINT), 1);
}

#[tokio::test]
async fn disposed_store_drops_late_lookup() {
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_millis(20)));
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, ANA);
    let store = store_with(&mock);

    tokio::join!(store.initialize(), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.dispose();
    });

    assert!(!store.is_alive());
    assert_eq!(store.snapshot(), SessionState::pending());
}

#[tokio::test]
async fn forced_logout_during_lookup_wins() {
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_millis(20)));
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, ANA);
    let store = store_with(&mock);

    tokio::join!(store.initialize(), async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(store.force_logout());
    });

    assert_eq!(store.snapshot(), SessionState::anonymous());
}

// =============================================================================
// login / logout
// =============================================================================

#[tokio::test]
async fn login_replaces_session() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, SESSION_ENDPOINT, 401, "");
    mock.respond(Method::Post, LOGIN_ENDPOINT, 200, LUIS);
    let store = store_with(&mock);
    store.initialize().await;

    let user = store.login("luis@example.test", "secreto").await.unwrap();
    assert_eq!(user.role, Role::Coordinator);
    assert!(store.has_role(Role::Coordinator));
}

#[tokio::test]
async fn failed_login_leaves_prior_session_untouched() {
    let mock = Arc::new(MockTransport::new());
    let store = logged_in_as_ana(&mock).await;
    mock.respond(Method::Post, LOGIN_ENDPOINT, 401, r#"{"message":"no"}"#);
    let before = store.snapshot();

    let err = store.login("ana@example.test", "wrong").await.unwrap_err();
    assert_eq!(err, LoginError::InvalidCredentials);
    assert_eq!(err.to_string(), "Correo o contraseña incorrectos");
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn failed_login_on_transport_error_leaves_anonymous() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, SESSION_ENDPOINT, 401, "");
    mock.fail(Method::Post, LOGIN_ENDPOINT, "offline");
    let store = store_with(&mock);
    store.initialize().await;

    assert!(matches!(store.login("a", "b").await, Err(LoginError::Transport(_))));
    assert_eq!(store.snapshot(), SessionState::anonymous());
}

#[tokio::test]
async fn logout_resets_even_when_backend_fails() {
    let mock = Arc::new(MockTransport::new());
    let store = logged_in_as_ana(&mock).await;
    mock.fail(Method::Post, LOGOUT_ENDPOINT, "offline");

    store.logout().await;
    assert_eq!(store.snapshot(), SessionState::anonymous());
    assert_eq!(mock.count(Method::Post, LOGOUT_ENDPOINT), 1);
}

// =============================================================================
// force_logout
// =============================================================================

#[tokio::test]
async fn force_logout_is_idempotent() {
    let mock = Arc::new(MockTransport::new());
    let store = logged_in_as_ana(&mock).await;
    let mut rx = store.subscribe();
    rx.borrow_and_update();

    assert!(store.force_logout());
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    assert!(!store.force_logout());
    assert!(!store.force_logout());
    assert!(!rx.has_changed().unwrap());
    assert_eq!(store.snapshot(), SessionState::anonymous());
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn force_logout_keeps_lookup_error_when_already_anonymous() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(Method::Get, SESSION_ENDPOINT, "offline");
    let store = store_with(&mock);
    store.initialize().await;

    assert!(!store.force_logout());
    assert!(store.snapshot().error.is_some());
}
