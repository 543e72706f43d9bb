//! Session monitor: notices server-side account deactivation.
//!
//! SYSTEM CONTEXT
//! ==============
//! An admin can deactivate a user who is currently logged in. The backend
//! then answers that user's next request with 401/403 and a deactivation
//! message. The monitor watches every response on the pipeline and forces a
//! local logout when it sees one, instead of waiting for the next navigation.
//! It is advisory only; authorization is always decided by the backend.

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::net::api::LOGIN_ENDPOINT;
use crate::net::http::{HttpRequest, HttpResponse};
use crate::net::pipeline::{InterceptorGuard, Pipeline, ResponseInterceptor};
use crate::state::session::{SessionStore, WeakSessionStore};

/// Pipeline key for the single monitor instance.
pub const MONITOR_KEY: &str = "session-monitor";

/// Case-sensitive body markers the backend uses for deactivated accounts.
pub const DEACTIVATION_MARKERS: [&str; 4] = ["desactivado", "deactivated", "CUENTA_INACTIVA", "inactiva"];

#[must_use]
pub fn is_deactivation_body(body: &str) -> bool {
    DEACTIVATION_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Holds the session weakly: the session's own API calls run through the
/// pipeline that owns this monitor.
pub struct SessionMonitor {
    session: WeakSessionStore,
    detections: AtomicU64,
}

impl SessionMonitor {
    #[must_use]
    pub fn new(session: &SessionStore) -> Self {
        Self { session: session.downgrade(), detections: AtomicU64::new(0) }
    }

    /// Install on `pipeline`, sharing any monitor already installed there.
    pub fn install(pipeline: &Pipeline, session: &SessionStore) -> InterceptorGuard {
        let monitor = Self::new(session);
        pipeline.install(MONITOR_KEY, move || Arc::new(monitor))
    }

    /// Number of forced logouts this monitor triggered.
    #[must_use]
    pub fn detections(&self) -> u64 {
        self.detections.load(Ordering::SeqCst)
    }
}

impl ResponseInterceptor for SessionMonitor {
    fn on_response(&self, request: &HttpRequest, response: &HttpResponse) {
        // A rejected login speaks for the attempted account, not the session.
        if !response.is_auth_failure() || request.path == LOGIN_ENDPOINT {
            return;
        }
        let Some(session) = self.session.upgrade() else {
            return;
        };
        if !session.is_authenticated() || !is_deactivation_body(&response.body) {
            return;
        }
        if session.force_logout() {
            self.detections.fetch_add(1, Ordering::SeqCst);
            tracing::warn!(path = %request.path, status = response.status, "account deactivated server-side");
        }
    }
}
