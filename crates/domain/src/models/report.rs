//! Read-only reporting models: zone occupancy and per-animal location summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::services::distance::planar_distance_m;

/// Rolling occupancy statistics for a zone.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneOccupancy {
    pub zone_id: Uuid,
    pub zone_name: String,
    /// Distinct animals with a ping inside the zone in the last hour.
    pub current_occupancy: i64,
    /// Distinct animals with a ping inside the zone in the last 24 hours.
    pub daily_unique_visitors: i64,
    /// Animals currently assigned to the zone.
    pub assigned_animals: i64,
    pub max_capacity: Option<i32>,
    /// Current occupancy against capacity, 0 when capacity is unset.
    pub occupancy_percentage: f64,
    pub is_overcrowded: bool,
}

impl ZoneOccupancy {
    pub fn compute(
        zone_id: Uuid,
        zone_name: String,
        current_occupancy: i64,
        daily_unique_visitors: i64,
        assigned_animals: i64,
        max_capacity: Option<i32>,
    ) -> Self {
        let occupancy_percentage = match max_capacity {
            Some(capacity) if capacity > 0 => {
                let pct = current_occupancy as f64 / capacity as f64 * 100.0;
                (pct * 100.0).round() / 100.0
            }
            _ => 0.0,
        };
        let is_overcrowded = max_capacity
            .map(|capacity| current_occupancy > capacity as i64)
            .unwrap_or(false);

        Self {
            zone_id,
            zone_name,
            current_occupancy,
            daily_unique_visitors,
            assigned_animals,
            max_capacity,
            occupancy_percentage,
            is_overcrowded,
        }
    }
}

/// Query parameters for the location summary endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummaryQuery {
    /// Start of the range, milliseconds since epoch.
    pub from: i64,
    /// End of the range, milliseconds since epoch.
    pub to: i64,
}

/// Time spent in one zone over the report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDuration {
    pub zone: String,
    pub minutes: i64,
}

/// Per-animal movement summary over a date range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub animal_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total_pings: i64,
    /// Cumulative planar distance between consecutive pings, in meters.
    pub total_distance_m: f64,
    pub zones_visited: Vec<String>,
    /// Approximate dwell time: per-zone ping count x device update interval.
    pub time_in_zones: Vec<ZoneDuration>,
}

/// Input row for the summary builder: one ping in chronological order.
#[derive(Debug, Clone)]
pub struct SummaryPing {
    pub latitude: f64,
    pub longitude: f64,
    pub zone_names: Vec<String>,
    /// Reporting interval of the device that produced the ping.
    pub update_interval_minutes: i64,
}

/// Builds a location summary from a chronological ping slice.
///
/// Returns `None` when no pings exist in range ("no data").
pub fn build_location_summary(
    animal_id: Uuid,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    pings: &[SummaryPing],
) -> Option<LocationSummary> {
    if pings.is_empty() {
        return None;
    }

    let mut total_distance_m = 0.0;
    let mut time_in_zones: BTreeMap<String, i64> = BTreeMap::new();

    let mut previous: Option<&SummaryPing> = None;
    for ping in pings {
        if let Some(prev) = previous {
            total_distance_m += planar_distance_m(
                prev.latitude,
                prev.longitude,
                ping.latitude,
                ping.longitude,
            );
        }
        for zone in &ping.zone_names {
            *time_in_zones.entry(zone.clone()).or_insert(0) += ping.update_interval_minutes;
        }
        previous = Some(ping);
    }

    let zones_visited: Vec<String> = time_in_zones.keys().cloned().collect();
    let time_in_zones: Vec<ZoneDuration> = time_in_zones
        .into_iter()
        .map(|(zone, minutes)| ZoneDuration { zone, minutes })
        .collect();

    Some(LocationSummary {
        animal_id,
        from,
        to,
        total_pings: pings.len() as i64,
        total_distance_m,
        zones_visited,
        time_in_zones,
    })
}

/// Health assessment for a tracking device.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHealth {
    pub device_id: Uuid,
    pub healthy: bool,
    pub issues: Vec<String>,
    pub last_battery_level: Option<i32>,
    pub last_signal_strength: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ping_at: Option<DateTime<Utc>>,
}

/// Battery level at or below which the device is considered critical.
const CRITICAL_BATTERY_LEVEL: i32 = 10;
/// Battery level at or below which the device is considered low.
const LOW_BATTERY_LEVEL: i32 = 20;
/// Signal strength below which reception is considered poor.
const POOR_SIGNAL_STRENGTH: i32 = 20;

/// Assesses a device's health from its last readings and ping recency.
///
/// A device is late when its most recent ping is older than twice its
/// reporting interval.
pub fn assess_device_health(
    device_id: Uuid,
    last_battery_level: Option<i32>,
    last_signal_strength: Option<i32>,
    last_ping_at: Option<DateTime<Utc>>,
    update_interval_minutes: i64,
    now: DateTime<Utc>,
) -> DeviceHealth {
    let mut issues = Vec::new();

    if let Some(battery) = last_battery_level {
        if battery <= CRITICAL_BATTERY_LEVEL {
            issues.push("Critical battery level".to_string());
        } else if battery <= LOW_BATTERY_LEVEL {
            issues.push("Low battery level".to_string());
        }
    }

    if let Some(signal) = last_signal_strength {
        if signal < POOR_SIGNAL_STRENGTH {
            issues.push("Poor signal strength".to_string());
        }
    }

    if let Some(last_ping) = last_ping_at {
        let expected = chrono::Duration::minutes(update_interval_minutes * 2);
        if now - last_ping > expected {
            issues.push("Delayed updates".to_string());
        }
    }

    DeviceHealth {
        device_id,
        healthy: issues.is_empty(),
        issues,
        last_battery_level,
        last_signal_strength,
        last_ping_at,
    }
}
