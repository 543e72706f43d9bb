//! Error types for backend calls and the login flow.
//!
//! ERROR HANDLING
//! ==============
//! Store operations catch `ClientError` at their boundary and turn it into
//! state (`error` fields). Only `login()` and configuration `update()` hand
//! errors back to callers, since those feed inline form messages.

/// Errors produced by transport, pipeline, and API operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("network request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend responded with status {status}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// An update was attempted before any configuration was loaded.
    #[error("configuration not loaded")]
    NotLoaded,
}

impl ClientError {
    /// Short user-facing text for state `error` fields.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::Transport(_) => "No se pudo conectar con el servidor".to_owned(),
            Self::Status { status, .. } => format!("Error del servidor ({status})"),
            other => other.to_string(),
        }
    }
}

/// Failure modes of `SessionStore::login`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// Backend answered 401.
    #[error("Correo o contraseña incorrectos")]
    InvalidCredentials,

    /// Backend answered some other non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request could not be completed.
    #[error("No se pudo conectar con el servidor: {0}")]
    Transport(String),
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
