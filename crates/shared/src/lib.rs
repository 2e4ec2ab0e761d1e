//! Shared utilities for the Herdtrack backend.
//!
//! This crate contains:
//! - Input validation helpers for GPS readings
//! - Cursor-based pagination utilities

pub mod pagination;
pub mod validation;
