//! System configuration cache and typed accessors.
//!
//! DESIGN
//! ======
//! `ConfigStore` fetches the configuration once and serves the cached copy
//! until a forced refresh. A failed refresh records the error but keeps the
//! last good configuration, so readers degrade to stale values instead of
//! defaults. Loads are serialized through an async mutex: concurrent first
//! loads share one request, and a refresh never interleaves with an update.
//!
//! Accessors live on `ConfigState`, the published snapshot, so components
//! read a consistent view without touching the store.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};

use crate::error::ClientError;
use crate::net::api::BackendApi;
use crate::net::types::{
    ConfigurationPatch, DEFAULT_CANCELLATION_LEAD_TIME_HOURS, DEFAULT_MAX_RESERVATIONS_PER_USER, DEFAULT_SITE_NAME,
    SystemConfiguration,
};

// =============================================================================
// SNAPSHOT
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigState {
    /// Last configuration successfully loaded, if any.
    pub config: Option<SystemConfiguration>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self { config: None, loading: true, error: None }
    }
}

impl ConfigState {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn maintenance_mode(&self) -> bool {
        self.config.as_ref().is_some_and(|c| c.maintenance_mode)
    }

    /// Reservations are open unless disabled or the site is in maintenance.
    #[must_use]
    pub fn reservations_enabled(&self) -> bool {
        self.config
            .as_ref()
            .is_none_or(|c| c.reservations_enabled && !c.maintenance_mode)
    }

    #[must_use]
    pub fn registration_enabled(&self) -> bool {
        self.config.as_ref().is_none_or(|c| c.registration_enabled)
    }

    #[must_use]
    pub fn site_name(&self) -> &str {
        self.config.as_ref().map_or(DEFAULT_SITE_NAME, |c| c.site_name.as_str())
    }

    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.config
            .as_ref()
            .map(|c| c.contact_email.as_str())
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn contact_phone(&self) -> Option<&str> {
        self.config
            .as_ref()
            .map(|c| c.contact_phone.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Loaded value, else `fallback`, else the documented default (3).
    #[must_use]
    pub fn max_reservations_per_user(&self, fallback: Option<u32>) -> u32 {
        self.config.as_ref().map_or_else(
            || fallback.unwrap_or(DEFAULT_MAX_RESERVATIONS_PER_USER),
            |c| c.max_reservations_per_user,
        )
    }

    /// Loaded value, else `fallback`, else the documented default (48).
    #[must_use]
    pub fn cancellation_lead_time_hours(&self, fallback: Option<u32>) -> u32 {
        self.config.as_ref().map_or_else(
            || fallback.unwrap_or(DEFAULT_CANCELLATION_LEAD_TIME_HOURS),
            |c| c.cancellation_lead_time_hours,
        )
    }
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<ConfigInner>,
}

struct ConfigInner {
    api: BackendApi,
    state: watch::Sender<ConfigState>,
    gate: Mutex<()>,
    alive: AtomicBool,
}

impl ConfigStore {
    #[must_use]
    pub fn new(api: BackendApi) -> Self {
        let (state, _) = watch::channel(ConfigState::default());
        Self { inner: Arc::new(ConfigInner { api, state, gate: Mutex::new(()), alive: AtomicBool::new(true) }) }
    }

    #[must_use]
    pub fn snapshot(&self) -> ConfigState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConfigState> {
        self.inner.state.subscribe()
    }

    /// Return the configuration, fetching it when not cached or when forced.
    ///
    /// Errors are recorded on the state rather than returned; the result is
    /// whatever configuration is available afterwards (possibly stale).
    pub async fn load(&self, force_refresh: bool) -> Option<SystemConfiguration> {
        let _gate = self.inner.gate.lock().await;
        let cached = self.inner.state.borrow().config.clone();
        if !force_refresh && cached.is_some() {
            return cached;
        }
        self.fetch_locked().await;
        self.inner.state.borrow().config.clone()
    }

    /// Apply `patch` to the last good configuration and submit the full
    /// object, then reload from the backend.
    ///
    /// If the reload fails after an accepted submit, the submitted object is
    /// returned and cached, and the reload error is recorded on the state.
    ///
    /// # Errors
    ///
    /// `NotLoaded` when nothing has been loaded yet; otherwise the backend
    /// error. The cached configuration is unchanged on failure.
    pub async fn update(&self, patch: &ConfigurationPatch) -> Result<SystemConfiguration, ClientError> {
        let _gate = self.inner.gate.lock().await;
        let current = self.inner.state.borrow().config.clone().ok_or(ClientError::NotLoaded)?;
        let next = current.merged(patch);

        if let Err(e) = self.inner.api.update_configuration(&next).await {
            tracing::warn!(error = %e, "configuration update failed");
            return Err(e);
        }
        tracing::info!("configuration updated, reloading");

        if let Some(reloaded) = self.fetch_locked().await {
            return Ok(reloaded);
        }
        // The backend accepted `next`; keep it as last known good alongside the reload error.
        if self.inner.alive.load(Ordering::SeqCst) {
            self.inner.state.send_modify(|state| state.config = Some(next.clone()));
        }
        Ok(next)
    }

    /// Stop committing network results. Idempotent.
    pub fn dispose(&self) {
        self.inner.alive.store(false, Ordering::SeqCst);
    }

    /// Fetch and commit. Caller must hold the gate.
    ///
    /// Returns the configuration only when one was fetched and committed.
    async fn fetch_locked(&self) -> Option<SystemConfiguration> {
        self.inner.state.send_modify(|state| state.loading = true);
        let result = self.inner.api.fetch_configuration().await;
        if !self.inner.alive.load(Ordering::SeqCst) {
            tracing::debug!("config store disposed, dropping fetch result");
            return None;
        }
        match result {
            Ok(config) => {
                tracing::debug!(
                    maintenance = config.maintenance_mode,
                    reservations = config.reservations_enabled,
                    "configuration loaded"
                );
                self.inner.state.send_replace(ConfigState { config: Some(config.clone()), loading: false, error: None });
                Some(config)
            }
            Err(e) => {
                tracing::warn!(error = %e, "configuration fetch failed, keeping cached values");
                self.inner.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(e.display_message());
                });
                None
            }
        }
    }
}
