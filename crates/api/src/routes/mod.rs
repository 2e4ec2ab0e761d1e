//! HTTP route handlers.

pub mod devices;
pub mod geofence_events;
pub mod health;
pub mod pings;
pub mod reports;
pub mod zones;
