//! Utility helpers shared by list and dashboard screens.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure, synchronous helpers with no network or store access, so screens can
//! test their presentation logic without a backend.

pub mod notice;
pub mod pagination;
