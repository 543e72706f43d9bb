//! HTTP transport seam and its `reqwest` implementation.
//!
//! DESIGN
//! ======
//! Everything above this module talks to `dyn HttpTransport`, so stores and
//! the session monitor can be driven by a scripted transport in tests. The
//! real transport keeps a cookie jar (the backend session lives in a cookie),
//! disables caching on every request, and always reads the body as text so a
//! non-JSON error page never masks the status code.

use std::time::Duration;

use reqwest::header::{ACCEPT, CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};

use crate::config::ClientConfig;
use crate::error::ClientError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

/// Outbound request, path relative to the backend base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(path: &str) -> Self {
        Self { method: Method::Get, path: path.to_owned(), body: None }
    }

    #[must_use]
    pub fn post(path: &str, body: Option<serde_json::Value>) -> Self {
        Self { method: Method::Post, path: path.to_owned(), body }
    }

    #[must_use]
    pub fn put(path: &str, body: serde_json::Value) -> Self {
        Self { method: Method::Put, path: path.to_owned(), body: Some(body) }
    }
}

/// Response with the body already drained as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

/// Sends one request and returns the drained response.
///
/// Implementations report only transport failures as `Err`; any status code
/// the backend sends comes back as `Ok`.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    /// Build a cookie-carrying client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend or client cannot be initialized.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let url = self.config.endpoint(&request.path);
        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
            Method::Put => self.http.put(&url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        tracing::debug!(method = request.method.as_str(), path = %request.path, status, "backend response");
        Ok(HttpResponse { status, body })
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::net::api::BackendApi;
    use crate::net::pipeline::Pipeline;

    /// Typed API over a fresh pipeline backed by `mock`.
    #[must_use]
    pub fn api_with(mock: &Arc<MockTransport>) -> BackendApi {
        BackendApi::new(Pipeline::new(Arc::clone(mock) as Arc<dyn HttpTransport>))
    }

    /// Scripted transport keyed by `"METHOD path"`.
    ///
    /// Each key holds a queue of outcomes; the last one repeats once the
    /// queue is down to a single entry. Unscripted requests answer 404.
    #[derive(Default)]
    pub struct MockTransport {
        scripts: Mutex<HashMap<String, VecDeque<Result<HttpResponse, String>>>>,
        log: Mutex<Vec<HttpRequest>>,
        delay: Option<std::time::Duration>,
    }

    impl MockTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Add an artificial delay to every response.
        #[must_use]
        pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
            self.push(method, path, Ok(HttpResponse { status, body: body.to_owned() }));
        }

        pub fn fail(&self, method: Method, path: &str, reason: &str) {
            self.push(method, path, Err(reason.to_owned()));
        }

        fn push(&self, method: Method, path: &str, outcome: Result<HttpResponse, String>) {
            let key = format!("{} {path}", method.as_str());
            self.scripts.lock().unwrap().entry(key).or_default().push_back(outcome);
        }

        /// Every request seen so far, in order.
        #[must_use]
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.log.lock().unwrap().clone()
        }

        #[must_use]
        pub fn count(&self, method: Method, path: &str) -> usize {
            self.log
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        }
    }

    #[async_trait::async_trait]
    impl HttpTransport for MockTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
            let key = format!("{} {}", request.method.as_str(), request.path);
            self.log.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let outcome = {
                let mut scripts = self.scripts.lock().unwrap();
                match scripts.get_mut(&key) {
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            };
            match outcome {
                Some(Ok(resp)) => Ok(resp),
                Some(Err(reason)) => Err(ClientError::Transport(reason)),
                None => Ok(HttpResponse { status: 404, body: String::new() }),
            }
        }
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
