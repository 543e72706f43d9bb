//! Application context: owns the pipeline, the stores, and the monitor.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `AppContext` per application instance. It replaces process-wide
//! singletons: everything a screen needs is reached through it, and
//! `dispose()` tears it down so late network results are dropped.

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::monitor::SessionMonitor;
use crate::net::api::BackendApi;
use crate::net::http::{HttpTransport, ReqwestTransport};
use crate::net::pipeline::{InterceptorGuard, Pipeline};
use crate::state::config::{ConfigState, ConfigStore};
use crate::state::session::{SessionState, SessionStore};

pub struct AppContext {
    api: BackendApi,
    session: SessionStore,
    config: ConfigStore,
    monitor: Mutex<Option<InterceptorGuard>>,
}

impl AppContext {
    /// Build a context talking to the backend over HTTP.
    ///
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the reqwest client cannot be constructed.
    pub fn init(config: ClientConfig) -> Result<Self, ClientError> {
        tracing::info!(api_base_url = %config.api_base_url, "initializing client context");
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Build a context over an arbitrary transport.
    #[must_use]
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        let api = BackendApi::new(Pipeline::new(transport));
        let session = SessionStore::new(api.clone());
        let config = ConfigStore::new(api.clone());
        let guard = SessionMonitor::install(api.pipeline(), &session);
        Self { api, session, config, monitor: Mutex::new(Some(guard)) }
    }

    /// Resolve the session and load the configuration concurrently.
    pub async fn bootstrap(&self) -> (SessionState, ConfigState) {
        tokio::join!(self.session.initialize(), self.config.load(false));
        (self.session.snapshot(), self.config.snapshot())
    }

    #[must_use]
    pub fn api(&self) -> &BackendApi {
        &self.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        !self.session.is_alive()
    }

    /// Uninstall the monitor and stop both stores. Idempotent.
    pub fn dispose(&self) {
        let guard = self.monitor.lock().unwrap_or_else(PoisonError::into_inner).take();
        if guard.is_some() {
            tracing::info!("disposing client context");
        }
        drop(guard);
        self.session.dispose();
        self.config.dispose();
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.dispose();
    }
}
