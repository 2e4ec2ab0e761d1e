//! Event detector: diffs consecutive membership sets into geofence events.
//!
//! The detector itself is a pure function. The caller assembles a
//! [`DetectionContext`] from the animal's ping/event history (serialized per
//! animal) and receives the events to append; persistence and alert
//! dispatch stay outside.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::geofence_event::{NewGeofenceEvent, TransitionType};
use crate::models::zone::Zone;
use crate::services::distance::nearest_boundary_distance_m;
use crate::services::severity::{classify, classify_zoneless, DEFAULT_SEVERITY};

/// Trailing window during which a repeat violation (or timeout) suppresses a
/// new violation event.
pub const VIOLATION_DEDUP_MINUTES: i64 = 30;

/// Trailing window during which a repeat timeout is suppressed.
pub const TIMEOUT_DEDUP_MINUTES: i64 = 60;

/// Continuous absence from all assigned zones that triggers a timeout.
pub const ABSENCE_THRESHOLD_MINUTES: i64 = 120;

/// History-derived inputs for one detection run.
///
/// All windows are measured against ping event time (`recorded_at`), not
/// wall clock, so reprocessing history is deterministic.
#[derive(Debug, Clone, Default)]
pub struct DetectionContext {
    /// Whether the animal has at least one active zone assignment.
    pub has_active_assignments: bool,
    /// A violation or timeout event exists whose triggering ping falls in
    /// the trailing [`VIOLATION_DEDUP_MINUTES`] window.
    pub recent_violation_or_timeout: bool,
    /// A timeout event exists whose triggering ping falls in the trailing
    /// [`TIMEOUT_DEDUP_MINUTES`] window.
    pub recent_timeout: bool,
    /// recorded_at of the most recent prior ping inside at least one
    /// assigned zone, if any.
    pub last_inside_at: Option<DateTime<Utc>>,
}

/// Runs transition detection for one ping.
///
/// * `current`: membership set of this ping.
/// * `assigned_zones`: the animal's active assigned zones (the membership
///   universe). Violation/timeout distance estimates run against these.
/// * `previous_zones`: zone records for the previous ping's membership set;
///   empty when no previous ping exists, so every occupied zone counts as a
///   fresh entry and no spurious exit is produced.
pub fn detect(
    animal_id: Uuid,
    latitude: f64,
    longitude: f64,
    recorded_at: DateTime<Utc>,
    current: &BTreeSet<Uuid>,
    assigned_zones: &[Zone],
    previous_zones: &[Zone],
    ctx: &DetectionContext,
) -> Vec<NewGeofenceEvent> {
    let previous: BTreeSet<Uuid> = previous_zones.iter().map(|z| z.zone_id).collect();

    let mut events = Vec::new();

    for zone_id in current.difference(&previous) {
        events.push(zone_event(
            animal_id,
            *zone_id,
            TransitionType::Entry,
            assigned_zones,
            previous_zones,
        ));
    }

    for zone_id in previous.difference(current) {
        events.push(zone_event(
            animal_id,
            *zone_id,
            TransitionType::Exit,
            assigned_zones,
            previous_zones,
        ));
    }

    if ctx.has_active_assignments && current.is_empty() {
        if !ctx.recent_violation_or_timeout {
            events.push(NewGeofenceEvent {
                animal_id,
                zone_id: None,
                transition: TransitionType::Violation,
                severity: classify_zoneless(TransitionType::Violation),
                distance_from_boundary_m: nearest_boundary_distance_m(
                    latitude,
                    longitude,
                    assigned_zones,
                ),
                duration_outside_secs: None,
            });
        }

        if let Some(last_inside_at) = ctx.last_inside_at {
            let outside = recorded_at - last_inside_at;
            if outside > Duration::minutes(ABSENCE_THRESHOLD_MINUTES) && !ctx.recent_timeout {
                events.push(NewGeofenceEvent {
                    animal_id,
                    zone_id: None,
                    transition: TransitionType::Timeout,
                    severity: classify_zoneless(TransitionType::Timeout),
                    distance_from_boundary_m: nearest_boundary_distance_m(
                        latitude,
                        longitude,
                        assigned_zones,
                    ),
                    duration_outside_secs: Some(outside.num_seconds()),
                });
            }
        }
    }

    events
}

/// Builds a zone-scoped entry/exit event, classifying severity from the
/// zone's type.
fn zone_event(
    animal_id: Uuid,
    zone_id: Uuid,
    transition: TransitionType,
    assigned_zones: &[Zone],
    previous_zones: &[Zone],
) -> NewGeofenceEvent {
    let zone = assigned_zones
        .iter()
        .chain(previous_zones.iter())
        .find(|z| z.zone_id == zone_id);

    let severity = match zone {
        Some(zone) => classify(zone.zone_type, transition),
        None => {
            warn!(
                animal_id = %animal_id,
                zone_id = %zone_id,
                transition = %transition,
                "Zone record missing during classification, using default severity"
            );
            DEFAULT_SEVERITY
        }
    };

    NewGeofenceEvent {
        animal_id,
        zone_id: Some(zone_id),
        transition,
        severity,
        distance_from_boundary_m: None,
        duration_outside_secs: None,
    }
}
