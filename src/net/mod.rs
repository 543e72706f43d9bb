//! Networking modules for the reservation backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` defines the transport seam, `pipeline` runs response interceptors
//! around it, `api` exposes typed endpoint calls, and `types` defines the
//! wire schema.

pub mod api;
pub mod http;
pub mod pipeline;
pub mod types;
