//! Geofence event domain models and DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geofence event transition type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionType {
    Entry,
    Exit,
    Violation,
    Return,
    Timeout,
}

impl TransitionType {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Violation => "violation",
            Self::Return => "return",
            Self::Timeout => "timeout",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "entry" => Some(Self::Entry),
            "exit" => Some(Self::Exit),
            "violation" => Some(Self::Violation),
            "return" => Some(Self::Return),
            "timeout" => Some(Self::Timeout),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransitionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event severity, driving whether an alert is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Whether events of this severity are forwarded to the dispatcher.
    pub fn is_alertable(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored geofence event. Append-only and immutable.
///
/// `zone_id` is null only for violation and timeout events, which concern
/// the animal's whole assigned zone set rather than one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    pub id: i64,
    pub event_id: Uuid,
    pub animal_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub zone_name: Option<String>,
    pub ping_id: Uuid,
    pub transition: TransitionType,
    pub severity: Severity,
    pub distance_from_boundary_m: Option<f64>,
    pub duration_outside_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// A detected transition not yet persisted. Produced by the event detector;
/// the ping reference and identifiers are attached at persistence time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGeofenceEvent {
    pub animal_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub transition: TransitionType,
    pub severity: Severity,
    pub distance_from_boundary_m: Option<f64>,
    pub duration_outside_secs: Option<i64>,
}

/// Query parameters for listing geofence events.
/// GET /api/v1/geofence-events?animalId=<uuid>
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofenceEventsQuery {
    pub animal_id: Uuid,
    pub zone_id: Option<Uuid>,
    pub transition: Option<TransitionType>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// Response for a single geofence event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEventResponse {
    pub event_id: Uuid,
    pub animal_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub ping_id: Uuid,
    pub transition: TransitionType,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_boundary_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_outside_secs: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<GeofenceEvent> for GeofenceEventResponse {
    fn from(event: GeofenceEvent) -> Self {
        Self {
            event_id: event.event_id,
            animal_id: event.animal_id,
            zone_id: event.zone_id,
            zone_name: event.zone_name,
            ping_id: event.ping_id,
            transition: event.transition,
            severity: event.severity,
            distance_from_boundary_m: event.distance_from_boundary_m,
            duration_outside_secs: event.duration_outside_secs,
            created_at: event.created_at,
        }
    }
}

/// Response for listing geofence events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGeofenceEventsResponse {
    pub events: Vec<GeofenceEventResponse>,
    pub total: i64,
}

impl GeofenceEvent {
    /// Create a GeofenceEvent from raw field values.
    /// Used for converting from persistence entities.
    #[allow(clippy::too_many_arguments)]
    pub fn from_raw(
        id: i64,
        event_id: Uuid,
        animal_id: Uuid,
        zone_id: Option<Uuid>,
        zone_name: Option<String>,
        ping_id: Uuid,
        transition: &str,
        severity: &str,
        distance_from_boundary_m: Option<f64>,
        duration_outside_secs: Option<i64>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            event_id,
            animal_id,
            zone_id,
            zone_name,
            ping_id,
            transition: TransitionType::parse(transition).unwrap_or(TransitionType::Entry),
            severity: Severity::parse(severity).unwrap_or(Severity::Medium),
            distance_from_boundary_m,
            duration_outside_secs,
            created_at,
        }
    }
}
