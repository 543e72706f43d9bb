//! Client configuration parsed from environment variables.

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build-time backend URL, baked in when `RESERVAS_API_URL` is set at compile time.
const BUILD_API_BASE_URL: Option<&str> = option_env!("RESERVAS_API_URL");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_base_url: String,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build a config for an explicit base URL with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not `http://` or `https://`.
    pub fn new(api_base_url: &str) -> Result<Self, ClientError> {
        Ok(Self { api_base_url: normalize_base_url(api_base_url)?, timeouts: HttpTimeouts::default() })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `RESERVAS_API_URL`: backend base URL (falls back to the build-time value, then localhost)
    /// - `RESERVAS_REQUEST_TIMEOUT_SECS`: default 30
    /// - `RESERVAS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is malformed.
    pub fn from_env() -> Result<Self, ClientError> {
        let raw_url = std::env::var("RESERVAS_API_URL")
            .ok()
            .or_else(|| BUILD_API_BASE_URL.map(str::to_owned))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let timeouts = HttpTimeouts {
            request_secs: env_parse_u64("RESERVAS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("RESERVAS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { api_base_url: normalize_base_url(&raw_url)?, timeouts })
    }

    /// Join an endpoint path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| ClientError::Config(format!("RESERVAS_API_URL must be an http(s) URL, got '{raw}'")))?;
    if host.is_empty() {
        return Err(ClientError::Config(format!("RESERVAS_API_URL has no host: '{raw}'")));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
