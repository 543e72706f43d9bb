//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`session`, `config`) so each store has a single
//! writer and components depend only on the snapshot they read.

pub mod config;
pub mod session;
