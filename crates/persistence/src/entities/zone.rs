//! Zone entity (database row mapping).
//!
//! Maps to the `zones` table. The boundary polygon is stored as a JSONB
//! array of [longitude, latitude] vertices; rows with malformed boundaries
//! convert to zones with an empty boundary, which the membership resolver
//! skips and logs.

use chrono::{DateTime, NaiveTime, Utc};
use domain::models::{TimeWindow, Zone, ZoneType};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

/// Database row mapping for the zones table.
#[derive(Debug, Clone, FromRow)]
pub struct ZoneEntity {
    pub id: i64,
    pub zone_id: Uuid,
    pub name: String,
    pub zone_type: String,
    pub boundary: serde_json::Value,
    pub center_latitude: Option<f64>,
    pub center_longitude: Option<f64>,
    pub radius_meters: Option<f32>,
    pub active: bool,
    pub max_capacity: Option<i32>,
    pub access_start: Option<NaiveTime>,
    pub access_end: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parses a JSONB boundary value into vertex pairs.
///
/// Returns an empty vector for anything that is not an array of 2-element
/// number arrays; the zone then fails the resolver's degeneracy check.
fn parse_boundary(zone_id: Uuid, value: &serde_json::Value) -> Vec<[f64; 2]> {
    let Some(vertices) = value.as_array() else {
        warn!(zone_id = %zone_id, "Zone boundary is not a JSON array");
        return Vec::new();
    };

    let mut parsed = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let pair = vertex.as_array().and_then(|pair| {
            if pair.len() == 2 {
                Some([pair[0].as_f64()?, pair[1].as_f64()?])
            } else {
                None
            }
        });
        match pair {
            Some(pair) => parsed.push(pair),
            None => {
                warn!(zone_id = %zone_id, "Zone boundary contains a malformed vertex");
                return Vec::new();
            }
        }
    }
    parsed
}

impl From<ZoneEntity> for Zone {
    fn from(entity: ZoneEntity) -> Self {
        let boundary = parse_boundary(entity.zone_id, &entity.boundary);
        let zone_type = ZoneType::parse(&entity.zone_type).unwrap_or_else(|| {
            warn!(
                zone_id = %entity.zone_id,
                zone_type = %entity.zone_type,
                "Unknown zone type, defaulting to grazing"
            );
            ZoneType::Grazing
        });
        let access_window = match (entity.access_start, entity.access_end) {
            (Some(start), Some(end)) => Some(TimeWindow::new(start, end)),
            _ => None,
        };

        Self {
            id: entity.id,
            zone_id: entity.zone_id,
            name: entity.name,
            zone_type,
            boundary,
            center_latitude: entity.center_latitude,
            center_longitude: entity.center_longitude,
            radius_meters: entity.radius_meters,
            active: entity.active,
            max_capacity: entity.max_capacity,
            access_window,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
