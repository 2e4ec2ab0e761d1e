//! Geofence event entity (database row mapping).
//!
//! Maps to the `geofence_events` table.

use chrono::{DateTime, Utc};
use domain::models::GeofenceEvent;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the geofence_events table.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEventEntity {
    pub id: i64,
    pub event_id: Uuid,
    pub animal_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub ping_id: i64,
    pub transition: String,
    pub severity: String,
    pub distance_from_boundary_m: Option<f64>,
    pub duration_outside_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Entity joined with the zone name and triggering ping identifier for
/// response enrichment.
#[derive(Debug, Clone, FromRow)]
pub struct GeofenceEventWithContext {
    pub id: i64,
    pub event_id: Uuid,
    pub animal_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub zone_name: Option<String>,
    pub ping_uuid: Uuid,
    pub transition: String,
    pub severity: String,
    pub distance_from_boundary_m: Option<f64>,
    pub duration_outside_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl GeofenceEventWithContext {
    /// Converts to the domain model.
    pub fn into_domain(self) -> GeofenceEvent {
        GeofenceEvent::from_raw(
            self.id,
            self.event_id,
            self.animal_id,
            self.zone_id,
            self.zone_name,
            self.ping_uuid,
            &self.transition,
            &self.severity,
            self.distance_from_boundary_m,
            self.duration_outside_secs,
            self.created_at,
        )
    }
}
