use std::sync::Arc;

use super::*;
use crate::net::http::Method;
use crate::net::http::test_helpers::{MockTransport, api_with};
use crate::net::types::Role;

const ANA: &str = r#"{"id":"u-1","name":"Ana","email":"ana@example.test","role":"admin"}"#;

#[test]
fn login_failed_message_formats_status() {
    assert_eq!(login_failed_message(500), "Error al iniciar sesión (500)");
}

#[tokio::test]
async fn current_user_success() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, SESSION_ENDPOINT, 200, ANA);
    let user = api_with(&mock).current_user().await.unwrap().unwrap();
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn current_user_unauthorized_is_none() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, SESSION_ENDPOINT, 401, "No autenticado");
    assert_eq!(api_with(&mock).current_user().await.unwrap(), None);
}

#[tokio::test]
async fn current_user_transport_failure_is_error() {
    let mock = Arc::new(MockTransport::new());
    mock.fail(Method::Get, SESSION_ENDPOINT, "offline");
    assert!(matches!(api_with(&mock).current_user().await, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn login_posts_credentials() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Post, LOGIN_ENDPOINT, 200, ANA);
    let user = api_with(&mock).login("ana@example.test", "secreto").await.unwrap();
    assert_eq!(user.id, "u-1");

    let sent = mock.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].body, Some(serde_json::json!({"email": "ana@example.test", "password": "secreto"})));
}

#[tokio::test]
async fn login_401_is_invalid_credentials() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Post, LOGIN_ENDPOINT, 401, r#"{"message":"bad"}"#);
    assert_eq!(api_with(&mock).login("a", "b").await.unwrap_err(), LoginError::InvalidCredentials);
}

#[tokio::test]
async fn login_other_status_carries_server_message() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Post, LOGIN_ENDPOINT, 423, r#"{"message":"Cuenta bloqueada"}"#);
    let err = api_with(&mock).login("a", "b").await.unwrap_err();
    assert_eq!(err, LoginError::Rejected { status: 423, message: "Cuenta bloqueada".into() });
}

#[tokio::test]
async fn login_empty_error_body_uses_status_fallback() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Post, LOGIN_ENDPOINT, 500, "");
    let err = api_with(&mock).login("a", "b").await.unwrap_err();
    assert_eq!(err, LoginError::Rejected { status: 500, message: login_failed_message(500) });
}

#[tokio::test]
async fn logout_non_success_is_status_error() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Post, LOGOUT_ENDPOINT, 500, "boom");
    let err = api_with(&mock).logout().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 500, .. }));
}

#[tokio::test]
async fn update_configuration_puts_full_object() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Put, CONFIGURATION_ENDPOINT, 200, "{}");
    let config = SystemConfiguration { maintenance_mode: true, ..SystemConfiguration::default() };
    api_with(&mock).update_configuration(&config).await.unwrap();

    let body = mock.requests()[0].body.clone().unwrap();
    assert_eq!(body["maintenanceMode"], true);
    assert_eq!(body["maxReservationsPerUser"], 3);
    assert_eq!(body["siteName"], "Reservas Deportivas");
}

#[tokio::test]
async fn fetch_configuration_status_error() {
    let mock = Arc::new(MockTransport::new());
    mock.respond(Method::Get, CONFIGURATION_ENDPOINT, 503, "mantenimiento");
    let err = api_with(&mock).fetch_configuration().await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 503, .. }));
}
