//! Membership resolver: which zones does a ping fall inside?
//!
//! Containment is planar point-in-polygon over the zone boundary, combined
//! with the zone's daily access window evaluated against the ping's own
//! time-of-day. Pure: same coordinate, same zones, same time-of-day always
//! yield the same membership set.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use geo::{Contains, Point};
use tracing::warn;
use uuid::Uuid;

use crate::models::zone::Zone;

/// The set of zones a ping falls inside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Membership {
    pub zone_ids: BTreeSet<Uuid>,
}

impl Membership {
    /// Non-empty membership means the animal is within its boundary.
    pub fn within_boundary(&self) -> bool {
        !self.zone_ids.is_empty()
    }
}

/// Resolves the membership set for a coordinate at a point in time.
///
/// `zones` is the animal's active assigned zone set. Zones with degenerate
/// or unparseable boundaries are skipped and logged; they never fail the
/// whole ping.
pub fn resolve_membership(
    latitude: f64,
    longitude: f64,
    recorded_at: DateTime<Utc>,
    zones: &[Zone],
) -> Membership {
    let point = Point::new(longitude, latitude);
    let time_of_day = recorded_at.time();

    let mut zone_ids = BTreeSet::new();
    for zone in zones.iter().filter(|z| z.active) {
        let Some(polygon) = zone.polygon() else {
            warn!(
                zone_id = %zone.zone_id,
                zone_name = %zone.name,
                "Skipping containment test for zone with invalid boundary"
            );
            continue;
        };

        if polygon.contains(&point) && zone.is_open_at(time_of_day) {
            zone_ids.insert(zone.zone_id);
        }
    }

    Membership { zone_ids }
}
