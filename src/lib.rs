//! Client core for the sports-facility reservation platform.
//!
//! SYSTEM CONTEXT
//! ==============
//! Screens (login, resident reservations, coordinator and admin dashboards)
//! sit on top of this crate. It owns the authenticated session, the cached
//! system configuration, role-based route gating, and the request pipeline
//! every backend call goes through. The backend remains the authority for
//! authorization; everything here is advisory UX.
//!
//! Entry point is [`context::AppContext`].

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod monitor;
pub mod net;
pub mod state;
pub mod util;
