//! Typed calls for the backend endpoints this client depends on.
//!
//! ERROR HANDLING
//! ==============
//! `current_user()` treats any non-success status as "not logged in" rather than an
//! error; only transport and parse failures surface. Login failures are
//! classified into `LoginError` here so stores never inspect status codes.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use super::http::{HttpRequest, HttpResponse};
use super::pipeline::Pipeline;
use super::types::{self, SystemConfiguration, User};
use crate::error::{ClientError, LoginError};

pub const SESSION_ENDPOINT: &str = "/auth/me";
pub const LOGIN_ENDPOINT: &str = "/auth/login";
pub const LOGOUT_ENDPOINT: &str = "/auth/logout";
pub const CONFIGURATION_ENDPOINT: &str = "/configuracion-general";

fn login_failed_message(status: u16) -> String {
    format!("Error al iniciar sesión ({status})")
}

fn status_error(response: HttpResponse) -> ClientError {
    ClientError::Status { status: response.status, body: response.body }
}

#[derive(Clone)]
pub struct BackendApi {
    pipeline: Pipeline,
}

impl BackendApi {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Fetch the current session's user. `Ok(None)` when not logged in.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed success body.
    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        let response = self.pipeline.send(HttpRequest::get(SESSION_ENDPOINT)).await?;
        if !response.is_success() {
            tracing::debug!(status = response.status, "no active session");
            return Ok(None);
        }
        types::parse_user(&response.body).map(Some)
    }

    /// Post credentials and return the authenticated user.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on 401, `Rejected` with the server's message on
    /// other failures (including an unreadable success body), `Transport`
    /// when the request could not be made.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        let payload = serde_json::json!({ "email": email, "password": password });
        let response = self
            .pipeline
            .send(HttpRequest::post(LOGIN_ENDPOINT, Some(payload)))
            .await
            .map_err(|e| LoginError::Transport(e.to_string()))?;

        if response.status == 401 {
            return Err(LoginError::InvalidCredentials);
        }
        if !response.is_success() {
            let message = types::error_message(&response.body).unwrap_or_else(|| login_failed_message(response.status));
            return Err(LoginError::Rejected { status: response.status, message });
        }
        types::parse_user(&response.body).map_err(|e| LoginError::Rejected {
            status: response.status,
            message: format!("respuesta inesperada del servidor: {e}"),
        })
    }

    /// End the backend session.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self.pipeline.send(HttpRequest::post(LOGOUT_ENDPOINT, None)).await?;
        if !response.is_success() {
            return Err(status_error(response));
        }
        Ok(())
    }

    /// Fetch the full system configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a body
    /// that is not a configuration object.
    pub async fn fetch_configuration(&self) -> Result<SystemConfiguration, ClientError> {
        let response = self.pipeline.send(HttpRequest::get(CONFIGURATION_ENDPOINT)).await?;
        if !response.is_success() {
            return Err(status_error(response));
        }
        types::parse_configuration(&response.body)
    }

    /// Submit a full configuration object.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn update_configuration(&self, config: &SystemConfiguration) -> Result<(), ClientError> {
        let body = serde_json::to_value(config).map_err(|e| ClientError::Parse(e.to_string()))?;
        let response = self.pipeline.send(HttpRequest::put(CONFIGURATION_ENDPOINT, body)).await?;
        if !response.is_success() {
            return Err(status_error(response));
        }
        Ok(())
    }
}
