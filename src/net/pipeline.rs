//! Request pipeline with keyed response interceptors.
//!
//! ARCHITECTURE
//! ============
//! Every backend call goes through `Pipeline::send`, which forwards to the
//! transport and then hands the response to each installed interceptor.
//! Interceptors are registered by key at bootstrap. Installing a key that is
//! already present keeps the existing interceptor and bumps its reference
//! count, so remounting a component never stacks a second copy. The entry is
//! removed when the last `InterceptorGuard` for that key is dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use super::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::ClientError;

/// Observes responses after the transport returns them.
///
/// Interceptors see every response, including non-success statuses, and may
/// not alter it. They run synchronously on the task that issued the request.
pub trait ResponseInterceptor: Send + Sync {
    fn on_response(&self, request: &HttpRequest, response: &HttpResponse);
}

struct Installed {
    interceptor: Arc<dyn ResponseInterceptor>,
    refs: usize,
}

type Registry = Mutex<HashMap<&'static str, Installed>>;

#[derive(Clone)]
pub struct Pipeline {
    transport: Arc<dyn HttpTransport>,
    registry: Arc<Registry>,
}

impl Pipeline {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, registry: Arc::new(Mutex::new(HashMap::new())) }
    }

    /// Install an interceptor under `key`, or share the one already there.
    ///
    /// `make` only runs when the key is vacant.
    pub fn install<F>(&self, key: &'static str, make: F) -> InterceptorGuard
    where
        F: FnOnce() -> Arc<dyn ResponseInterceptor>,
    {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = registry.entry(key).or_insert_with(|| {
            tracing::debug!(key, "interceptor installed");
            Installed { interceptor: make(), refs: 0 }
        });
        entry.refs += 1;
        InterceptorGuard { registry: Arc::downgrade(&self.registry), key }
    }

    #[must_use]
    pub fn is_installed(&self, key: &str) -> bool {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    #[must_use]
    pub fn interceptor_count(&self) -> usize {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Send through the transport, then run interceptors on the response.
    ///
    /// # Errors
    ///
    /// Returns the transport's error when no response was obtained.
    /// Interceptors do not run in that case.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let response = self.transport.send(request.clone()).await?;
        let active: Vec<Arc<dyn ResponseInterceptor>> = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|installed| Arc::clone(&installed.interceptor))
            .collect();
        for interceptor in active {
            interceptor.on_response(&request, &response);
        }
        Ok(response)
    }
}

/// Keeps an interceptor installed while alive.
#[must_use = "dropping the guard uninstalls the interceptor"]
pub struct InterceptorGuard {
    registry: Weak<Registry>,
    key: &'static str,
}

impl InterceptorGuard {
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }
}

impl Drop for InterceptorGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let remove = match registry.get_mut(self.key) {
            Some(installed) => {
                installed.refs = installed.refs.saturating_sub(1);
                installed.refs == 0
            }
            None => false,
        };
        if remove {
            registry.remove(self.key);
            tracing::debug!(key = self.key, "interceptor removed");
        }
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
