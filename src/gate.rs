//! Role-gated routing decisions.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each dashboard route group (admin, coordinator, superadmin) mounts a gate
//! that decides, from the current session snapshot alone, whether to render,
//! wait, or send the user to their own landing page.
//!
//! Unauthenticated users are the child route's concern: the gate reports
//! `Deferred` and never navigates them, while child routes call
//! [`should_redirect_unauth`] to send them to [`LOGIN_PATH`]. Keeping one
//! authority for that redirect avoids double navigations.

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;

use std::sync::Mutex;

use crate::net::types::Role;
use crate::state::session::SessionState;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Route table derived from a role.
pub struct RoleBinding;

impl RoleBinding {
    /// Where a principal with `role` lands after login or a denied route.
    #[must_use]
    pub fn landing_path(role: Role) -> &'static str {
        match role {
            Role::Admin => "/admin",
            Role::Coordinator => "/coordinador",
            Role::SuperAdmin => "/superadmin",
            Role::Resident | Role::Visitor => HOME_PATH,
        }
    }

    /// Route prefixes `role` may open. Each dashboard belongs to exactly one
    /// role, matching the strict role check in [`decide`].
    #[must_use]
    pub fn allowed_prefixes(role: Role) -> &'static [&'static str] {
        match role {
            Role::Visitor => &["/", "/login", "/registro"],
            Role::Resident => &["/", "/login", "/registro", "/reservas", "/perfil"],
            Role::Coordinator => &["/coordinador", "/perfil"],
            Role::Admin => &["/admin", "/perfil"],
            Role::SuperAdmin => &["/superadmin", "/perfil"],
        }
    }

    /// Whether `path` falls under one of the role's prefixes.
    ///
    /// `"/"` matches only the root itself; other prefixes match on a segment
    /// boundary, so `/admin` covers `/admin/usuarios` but not `/administrar`.
    #[must_use]
    pub fn can_access(role: Role, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        Self::allowed_prefixes(role).iter().any(|prefix| {
            if *prefix == HOME_PATH {
                return path == HOME_PATH || path.is_empty();
            }
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

/// Outcome of evaluating a gate against a session snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Session still loading; render a neutral loading indicator.
    Pending,
    /// Anonymous; the child route handles the login redirect.
    Deferred,
    /// Authenticated with another role; navigate to its landing page.
    Redirect(&'static str),
    /// Render the route's children.
    Authorized,
}

impl GateDecision {
    #[must_use]
    pub fn renders_children(self) -> bool {
        matches!(self, Self::Authorized)
    }
}

/// Pure gate evaluation.
#[must_use]
pub fn decide(session: &SessionState, expected: Role) -> GateDecision {
    if session.loading {
        return GateDecision::Pending;
    }
    let Some(user) = &session.user else {
        return GateDecision::Deferred;
    };
    if user.role == expected {
        GateDecision::Authorized
    } else {
        GateDecision::Redirect(RoleBinding::landing_path(user.role))
    }
}

/// Child-route check: redirect to login once auth has loaded and nobody is
/// logged in.
#[must_use]
pub fn should_redirect_unauth(session: &SessionState) -> bool {
    !session.loading && session.user.is_none()
}

/// Performs client-side navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Gate for one route group, issuing at most one navigation per target.
pub struct RoleGate {
    expected: Role,
    last_redirect: Mutex<Option<&'static str>>,
}

impl RoleGate {
    #[must_use]
    pub fn new(expected: Role) -> Self {
        Self { expected, last_redirect: Mutex::new(None) }
    }

    #[must_use]
    pub fn expected(&self) -> Role {
        self.expected
    }

    /// Evaluate `session` and navigate if the decision is a redirect not
    /// already issued. Any non-redirect decision re-arms the gate.
    pub fn apply(&self, session: &SessionState, navigator: &dyn Navigator) -> GateDecision {
        let decision = decide(session, self.expected);
        let mut last = self
            .last_redirect
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match decision {
            GateDecision::Redirect(target) => {
                if *last != Some(target) {
                    *last = Some(target);
                    tracing::info!(expected = %self.expected, actual = %session.role(), target, "role gate redirect");
                    navigator.navigate(target);
                }
            }
            _ => *last = None,
        }
        decision
    }
}
