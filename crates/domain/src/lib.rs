//! Domain layer for the Herdtrack backend.
//!
//! This crate contains:
//! - Domain models (Zone, ZoneAssignment, Ping, GeofenceEvent, NotificationContact)
//! - The geofence detection services (membership, severity, distance, detection)
//! - The alert dispatch contract

pub mod models;
pub mod services;
