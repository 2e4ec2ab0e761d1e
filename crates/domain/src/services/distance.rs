//! Distance estimator: nearest-boundary distance in approximate meters.
//!
//! Distances are computed in planar degree units and converted with a flat
//! scale factor. The factor is part of the reporting contract; do not swap
//! in a geodesic formula.

use geo::{EuclideanDistance, Point};

use crate::models::zone::Zone;

/// Approximate conversion from planar degrees to meters.
pub const DEGREES_TO_METERS: f64 = 111_000.0;

/// Minimum distance from a point to the boundaries of a zone set, in meters.
///
/// Returns `None` when the zone collection is empty or every boundary is
/// degenerate. `None` means "unknown", never zero.
pub fn nearest_boundary_distance_m(latitude: f64, longitude: f64, zones: &[Zone]) -> Option<f64> {
    let point = Point::new(longitude, latitude);

    let mut min_degrees: Option<f64> = None;
    for zone in zones {
        let Some(polygon) = zone.polygon() else {
            continue;
        };
        let d = point.euclidean_distance(&polygon);
        min_degrees = Some(match min_degrees {
            Some(current) if current <= d => current,
            _ => d,
        });
    }

    min_degrees.map(|d| d * DEGREES_TO_METERS)
}

/// Planar distance between two coordinates, in meters.
pub fn planar_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    (dlat * dlat + dlon * dlon).sqrt() * DEGREES_TO_METERS
}
