//! Tracking device entity (database row mapping).
//!
//! Maps to the `tracking_devices` table, owned by the external registry.
//! Ingest refreshes the last battery/signal readings opportunistically.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the tracking_devices table.
#[derive(Debug, Clone, FromRow)]
pub struct DeviceEntity {
    pub id: i64,
    pub device_id: Uuid,
    pub label: String,
    pub update_interval_minutes: i32,
    pub last_battery_level: Option<i32>,
    pub last_signal_strength: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
