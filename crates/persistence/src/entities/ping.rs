//! Ping entity (database row mapping).
//!
//! Maps to the `pings` table plus the `ping_zones` membership join table.

use chrono::{DateTime, Utc};
use domain::models::Ping;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the pings table.
#[derive(Debug, Clone, FromRow)]
pub struct PingEntity {
    pub id: i64,
    pub ping_id: Uuid,
    pub animal_id: Uuid,
    pub device_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub speed: Option<f64>,
    pub heading: Option<f64>,
    pub battery_level: Option<i32>,
    pub signal_strength: Option<i32>,
    pub temperature: Option<f64>,
    pub recorded_at: DateTime<Utc>,
    pub within_boundary: bool,
    pub created_at: DateTime<Utc>,
}

/// One row of the ping_zones membership join.
#[derive(Debug, Clone, FromRow)]
pub struct PingZoneRow {
    pub ping_id: i64,
    pub zone_id: Uuid,
}

impl PingEntity {
    /// Converts to the domain model, attaching the membership set.
    pub fn into_domain(self, zone_ids: Vec<Uuid>) -> Ping {
        Ping {
            id: self.id,
            ping_id: self.ping_id,
            animal_id: self.animal_id,
            device_id: self.device_id,
            latitude: self.latitude,
            longitude: self.longitude,
            altitude: self.altitude,
            accuracy: self.accuracy,
            speed: self.speed,
            heading: self.heading,
            battery_level: self.battery_level,
            signal_strength: self.signal_strength,
            temperature: self.temperature,
            recorded_at: self.recorded_at,
            within_boundary: self.within_boundary,
            zone_ids,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_domain_attaches_membership() {
        let zone_id = Uuid::new_v4();
        let entity = PingEntity {
            id: 3,
            ping_id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            latitude: -1.29,
            longitude: 36.82,
            altitude: None,
            accuracy: Some(8.0),
            speed: None,
            heading: None,
            battery_level: Some(90),
            signal_strength: None,
            temperature: None,
            recorded_at: Utc::now(),
            within_boundary: true,
            created_at: Utc::now(),
        };

        let ping = entity.into_domain(vec![zone_id]);
        assert_eq!(ping.zone_ids, vec![zone_id]);
        assert!(ping.within_boundary);
    }
}
