use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::monitor::MONITOR_KEY;
use crate::error::LoginError;
use crate::net::api::{CONFIGURATION_ENDPOINT, LOGIN_ENDPOINT, SESSION_ENDPOINT};
use crate::net::http::Method;
use crate::net::http::test_helpers::MockTransport;
use crate::net::types::Role;

const COORDINATOR: &str = r#"{"id":7,"nombre":"Luis","correo":"luis@example.test","rol":"coordinador"}"#;
const CONFIG: &str = r#"{"siteName":"Polideportivo Sur","maintenanceMode":true}"#;

fn scripted() -> Arc<MockTransport> {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, COORDINATOR);
    mock.respond(Method::Get, CONFIGURATION_ENDPOINT, 200, CONFIG);
    mock
}

#[tokio::test]
async fn bootstrap_resolves_session_and_config() {
    let mock = scripted();
    let ctx = AppContext::with_transport(mock.clone());

    let (session, config) = ctx.bootstrap().await;

    assert_eq!(session.role(), Role::Coordinator);
    assert_eq!(session.user.as_ref().map(|u| u.id.as_str()), Some("7"));
    assert_eq!(config.site_name(), "Polideportivo Sur");
    assert!(!config.reservations_enabled());
    assert_eq!(mock.count(Method::Get, SESSION_ENDPOINT), 1);
    assert_eq!(mock.count(Method::Get, CONFIGURATION_ENDPOINT), 1);
}

#[tokio::test]
async fn repeated_bootstrap_reuses_cached_results() {
    let mock = scripted();
    let ctx = AppContext::with_transport(mock.clone());

    ctx.bootstrap().await;
    ctx.bootstrap().await;

    assert_eq!(mock.count(Method::Get, SESSION_ENDPOINT), 1);
    assert_eq!(mock.count(Method::Get, CONFIGURATION_ENDPOINT), 1);
}

#[tokio::test]
async fn context_installs_monitor_on_its_pipeline() {
    let ctx = AppContext::with_transport(scripted());
    assert!(ctx.api().pipeline().is_installed(MONITOR_KEY));
}

#[tokio::test]
async fn dispose_is_idempotent_and_uninstalls_monitor() {
    let ctx = AppContext::with_transport(scripted());
    assert!(!ctx.is_disposed());

    ctx.dispose();
    ctx.dispose();

    assert!(ctx.is_disposed());
    assert!(!ctx.api().pipeline().is_installed(MONITOR_KEY));
}

#[tokio::test]
async fn disposed_context_drops_in_flight_bootstrap() {
    let mock = Arc::new(MockTransport::new().with_delay(Duration::from_millis(50)));
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, COORDINATOR);
    mock.respond(Method::Get, CONFIGURATION_ENDPOINT, 200, CONFIG);
    let ctx = Arc::new(AppContext::with_transport(mock));

    let running = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.bootstrap().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    ctx.dispose();
    let (session, config) = running.await.unwrap();

    assert!(session.loading);
    assert!(session.user.is_none());
    assert!(config.config.is_none());
}

#[tokio::test]
async fn login_as_deactivated_account_keeps_current_session() {
    let mock = scripted();
    mock.respond(Method::Post, LOGIN_ENDPOINT, 401, r#"{"message":"Usuario desactivado"}"#);
    let ctx = AppContext::with_transport(mock);
    let (before, _) = ctx.bootstrap().await;
    assert!(before.is_authenticated());

    let err = ctx.session().login("baja@example.test", "clave").await.unwrap_err();

    assert_eq!(err, LoginError::InvalidCredentials);
    assert_eq!(ctx.session().snapshot(), before);
}
