//! Auth-session state for the current client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login
//! redirects and identity-dependent rendering. `SessionStore` is the only
//! writer; everything else reads snapshots or subscribes.
//!
//! DESIGN
//! ======
//! State is published through a `watch` channel. `initialize()` is
//! single-flight via `OnceCell`, so concurrent callers share one `/auth/me`
//! request. Every mutation bumps a generation counter; a slow `initialize()`
//! only commits if nothing else changed the session while it was in flight.
//! After `dispose()` no network result is committed.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::{OnceCell, watch};

use crate::error::LoginError;
use crate::net::api::BackendApi;
use crate::net::types::{Role, User};

/// Snapshot of who is logged in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    /// `true` until the first session lookup resolves.
    pub loading: bool,
    /// Diagnostic text from the last failed lookup.
    pub error: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn pending() -> Self {
        Self { user: None, loading: true, error: None }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None, loading: false, error: None }
    }

    #[must_use]
    pub fn authenticated(user: User) -> Self {
        Self { user: Some(user), loading: false, error: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Role of the current principal; `Visitor` when anonymous or unresolved.
    #[must_use]
    pub fn role(&self) -> Role {
        self.user.as_ref().map_or(Role::Visitor, |u| u.role)
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role() == role
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::pending()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: BackendApi,
    state: watch::Sender<SessionState>,
    init: OnceCell<()>,
    generation: AtomicU64,
    alive: AtomicBool,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: BackendApi) -> Self {
        let (state, _) = watch::channel(SessionState::pending());
        Self {
            inner: Arc::new(SessionInner {
                api,
                state,
                init: OnceCell::new(),
                generation: AtomicU64::new(0),
                alive: AtomicBool::new(true),
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receive every session change from now on.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.inner.state.borrow().has_role(role)
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.alive.load(Ordering::SeqCst)
    }

    /// Resolve the session from the backend, once per store.
    ///
    /// Later and concurrent calls wait for the first lookup and return
    /// without issuing another request.
    pub async fn initialize(&self) {
        self.inner.init.get_or_init(|| self.fetch_current_user()).await;
    }

    async fn fetch_current_user(&self) {
        let started_at = self.inner.generation.load(Ordering::SeqCst);
        let next = match self.inner.api.current_user().await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, role = %user.role, "session restored");
                SessionState::authenticated(user)
            }
            Ok(None) => SessionState::anonymous(),
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                SessionState { user: None, loading: false, error: Some(e.display_message()) }
            }
        };

        if !self.is_alive() {
            tracing::debug!("session store disposed, dropping lookup result");
            return;
        }
        if self.inner.generation.load(Ordering::SeqCst) != started_at {
            // A login/logout landed first; keep it but stop reporting loading.
            self.inner.state.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
            return;
        }
        self.commit(next);
    }

    /// Authenticate with the backend.
    ///
    /// On success the session is replaced and the user returned. On any
    /// failure the session is left exactly as it was.
    ///
    /// # Errors
    ///
    /// See [`LoginError`].
    pub async fn login(&self, email: &str, password: &str) -> Result<User, LoginError> {
        match self.inner.api.login(email, password).await {
            Ok(user) => {
                if self.is_alive() {
                    tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
                    self.commit(SessionState::authenticated(user.clone()));
                }
                Ok(user)
            }
            Err(e) => {
                tracing::info!(error = %e, "login rejected");
                Err(e)
            }
        }
    }

    /// End the session. Backend failure is logged; the local session is
    /// reset regardless.
    pub async fn logout(&self) {
        if let Err(e) = self.inner.api.logout().await {
            tracing::warn!(error = %e, "logout request failed");
        }
        if self.is_alive() {
            self.commit(SessionState::anonymous());
        }
    }

    /// Reset to anonymous without contacting the backend.
    ///
    /// Returns `true` when the session actually changed; repeated calls are
    /// no-ops and do not wake subscribers.
    pub fn force_logout(&self) -> bool {
        let changed = self.inner.state.send_if_modified(|state| {
            if state.user.is_none() && !state.loading {
                return false;
            }
            *state = SessionState::anonymous();
            true
        });
        if changed {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            tracing::warn!("session invalidated, forced logout");
        }
        changed
    }

    /// Stop committing network results. Idempotent.
    pub fn dispose(&self) {
        self.inner.alive.store(false, Ordering::SeqCst);
    }

    /// Non-owning handle for observers that live inside the request path.
    #[must_use]
    pub fn downgrade(&self) -> WeakSessionStore {
        WeakSessionStore { inner: Arc::downgrade(&self.inner) }
    }

    fn commit(&self, next: SessionState) {
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.state.send_replace(next);
    }
}

/// Weak counterpart of [`SessionStore`].
#[derive(Clone)]
pub struct WeakSessionStore {
    inner: Weak<SessionInner>,
}

impl WeakSessionStore {
    #[must_use]
    pub fn upgrade(&self) -> Option<SessionStore> {
        self.inner.upgrade().map(|inner| SessionStore { inner })
    }
}
