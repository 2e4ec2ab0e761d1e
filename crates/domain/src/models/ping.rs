//! GPS ping domain model and ingest DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::geofence_event::GeofenceEventResponse;

/// One timestamped GPS reading from a collar device.
///
/// Pings are immutable once stored. The membership set and within-boundary
/// flag are derived at ingest time and never retroactively edited; ordering
/// for detection purposes is by `recorded_at`, not insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
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
    /// Event time reported by the device, not insertion time.
    pub recorded_at: DateTime<Utc>,
    pub within_boundary: bool,
    /// Zones the ping falls inside, geometrically and temporally.
    pub zone_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for ping ingestion.
/// POST /api/v1/pings
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngestPingRequest {
    pub animal_id: Uuid,

    pub device_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Event timestamp in milliseconds since epoch.
    #[validate(custom(function = "shared::validation::validate_timestamp"))]
    pub recorded_at: i64,

    pub altitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_speed"))]
    pub speed: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_heading"))]
    pub heading: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_battery_level"))]
    pub battery_level: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_signal_strength"))]
    pub signal_strength: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_temperature"))]
    pub temperature: Option<f64>,
}

/// Response payload for ping ingestion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestPingResponse {
    pub ping_id: Uuid,
    pub animal_id: Uuid,
    pub within_boundary: bool,
    pub zone_ids: Vec<Uuid>,
    pub events: Vec<GeofenceEventResponse>,
    /// True when this exact ping (animal, device, recorded_at) was already
    /// processed; detection is not re-run.
    pub duplicate: bool,
    /// True when the ping arrived with a recorded_at earlier than the
    /// animal's latest stored ping.
    pub out_of_order: bool,
}

/// Sort order for ping history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl<'de> serde::Deserialize<'de> for SortOrder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(serde::de::Error::custom("order must be 'asc' or 'desc'")),
        }
    }
}

/// Default page size for ping history.
const DEFAULT_HISTORY_LIMIT: i64 = 100;
/// Maximum page size for ping history.
const MAX_HISTORY_LIMIT: i64 = 500;

/// Query parameters for the ping history endpoint.
/// GET /api/v1/animals/:animal_id/pings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPingHistoryQuery {
    pub cursor: Option<String>,
    /// Lower bound on recorded_at, milliseconds since epoch.
    pub from: Option<i64>,
    /// Upper bound on recorded_at, milliseconds since epoch.
    pub to: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub order: SortOrder,
}

impl GetPingHistoryQuery {
    /// Requested limit clamped to the valid range.
    pub fn effective_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

/// One ping in a history response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingHistoryItem {
    pub ping_id: Uuid,
    pub device_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<i32>,
    pub within_boundary: bool,
    pub zone_ids: Vec<Uuid>,
    pub recorded_at: DateTime<Utc>,
}

impl From<Ping> for PingHistoryItem {
    fn from(ping: Ping) -> Self {
        Self {
            ping_id: ping.ping_id,
            device_id: ping.device_id,
            latitude: ping.latitude,
            longitude: ping.longitude,
            speed: ping.speed,
            heading: ping.heading,
            battery_level: ping.battery_level,
            within_boundary: ping.within_boundary,
            zone_ids: ping.zone_ids,
            recorded_at: ping.recorded_at,
        }
    }
}

/// Pagination metadata for history responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// Response for the ping history endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingHistoryResponse {
    pub pings: Vec<PingHistoryItem>,
    pub pagination: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_request_deserialization() {
        let json = r#"{
            "animalId": "550e8400-e29b-41d4-a716-446655440000",
            "deviceId": "660e8400-e29b-41d4-a716-446655440001",
            "latitude": -1.2921,
            "longitude": 36.8219,
            "recordedAt": 1700000000000,
            "batteryLevel": 82,
            "temperature": 38.6
        }"#;
        let request: IngestPingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.latitude, -1.2921);
        assert_eq!(request.battery_level, Some(82));
        assert!(request.altitude.is_none());
        assert!(request.speed.is_none());
    }

    #[test]
    fn test_ingest_request_validation_rejects_bad_coordinate() {
        let request = IngestPingRequest {
            animal_id: Uuid::new_v4(),
            device_id: Uuid::new_v4(),
            latitude: 91.0,
            longitude: 36.8,
            recorded_at: Utc::now().timestamp_millis(),
            altitude: None,
            accuracy: None,
            speed: None,
            heading: None,
            battery_level: None,
            signal_strength: None,
            temperature: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_history_query_effective_limit() {
        let query: GetPingHistoryQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(query.effective_limit(), 100);

        let query: GetPingHistoryQuery = serde_json::from_str(r#"{"limit": 9000}"#).unwrap();
        assert_eq!(query.effective_limit(), 500);

        let query: GetPingHistoryQuery = serde_json::from_str(r#"{"limit": 0}"#).unwrap();
        assert_eq!(query.effective_limit(), 1);
    }

    #[test]
    fn test_history_query_order_parsing() {
        let query: GetPingHistoryQuery = serde_json::from_str(r#"{"order": "asc"}"#).unwrap();
        assert_eq!(query.order, SortOrder::Asc);

        let query: GetPingHistoryQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(query.order, SortOrder::Desc);

        let bad: Result<GetPingHistoryQuery, _> = serde_json::from_str(r#"{"order": "sideways"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_ingest_response_serialization() {
        let response = IngestPingResponse {
            ping_id: Uuid::new_v4(),
            animal_id: Uuid::new_v4(),
            within_boundary: true,
            zone_ids: vec![Uuid::new_v4()],
            events: vec![],
            duplicate: false,
            out_of_order: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"withinBoundary\":true"));
        assert!(json.contains("\"duplicate\":false"));
    }
}
