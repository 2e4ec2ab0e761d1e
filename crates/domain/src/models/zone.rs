//! Zone domain model.
//!
//! Zones are supplied by the external registry; this crate consumes them
//! read-only for containment testing and reporting.

use chrono::{DateTime, NaiveTime, Utc};
use geo::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Zone classification, driving event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    Grazing,
    Watering,
    Shelter,
    Restricted,
    Quarantine,
}

impl ZoneType {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::Grazing => "grazing",
            ZoneType::Watering => "watering",
            ZoneType::Shelter => "shelter",
            ZoneType::Restricted => "restricted",
            ZoneType::Quarantine => "quarantine",
        }
    }

    /// Parses from database string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "grazing" => Some(ZoneType::Grazing),
            "watering" => Some(ZoneType::Watering),
            "shelter" => Some(ZoneType::Shelter),
            "restricted" => Some(ZoneType::Restricted),
            "quarantine" => Some(ZoneType::Quarantine),
            _ => None,
        }
    }
}

impl std::fmt::Display for ZoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A daily time-of-day window. Used for zone access restrictions and
/// contact quiet hours.
///
/// Invariant: when `start > end` the window wraps midnight (overnight).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether a time-of-day falls inside the window, handling overnight wrap.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start > self.end {
            time >= self.start || time <= self.end
        } else {
            self.start <= time && time <= self.end
        }
    }
}

/// Represents a geofenced zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: i64,
    pub zone_id: Uuid,
    pub name: String,
    pub zone_type: ZoneType,
    /// Boundary polygon as [longitude, latitude] vertices.
    pub boundary: Vec<[f64; 2]>,
    pub center_latitude: Option<f64>,
    pub center_longitude: Option<f64>,
    pub radius_meters: Option<f32>,
    pub active: bool,
    pub max_capacity: Option<i32>,
    pub access_window: Option<TimeWindow>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Zone {
    /// Builds the boundary polygon for geometric tests.
    ///
    /// Returns `None` for degenerate boundaries (fewer than 3 vertices);
    /// callers skip such zones rather than failing the whole ping.
    pub fn polygon(&self) -> Option<Polygon<f64>> {
        if self.boundary.len() < 3 {
            return None;
        }
        let exterior: Vec<(f64, f64)> = self.boundary.iter().map(|v| (v[0], v[1])).collect();
        Some(Polygon::new(LineString::from(exterior), vec![]))
    }

    /// Whether the zone is open at the given time-of-day.
    ///
    /// Zones without an access window are always open.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        match &self.access_window {
            Some(window) => window.contains(time),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn test_zone(boundary: Vec<[f64; 2]>) -> Zone {
        Zone {
            id: 1,
            zone_id: Uuid::new_v4(),
            name: "North paddock".to_string(),
            zone_type: ZoneType::Grazing,
            boundary,
            center_latitude: None,
            center_longitude: None,
            radius_meters: None,
            active: true,
            max_capacity: Some(50),
            access_window: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_zone_type_as_str() {
        assert_eq!(ZoneType::Grazing.as_str(), "grazing");
        assert_eq!(ZoneType::Restricted.as_str(), "restricted");
        assert_eq!(ZoneType::Quarantine.as_str(), "quarantine");
    }

    #[test]
    fn test_zone_type_parse() {
        assert_eq!(ZoneType::parse("grazing"), Some(ZoneType::Grazing));
        assert_eq!(ZoneType::parse("WATERING"), Some(ZoneType::Watering));
        assert_eq!(ZoneType::parse("Shelter"), Some(ZoneType::Shelter));
        assert_eq!(ZoneType::parse("paddock"), None);
    }

    #[test]
    fn test_time_window_normal() {
        let window = TimeWindow::new(time(8, 0), time(18, 0));
        assert!(window.contains(time(8, 0)));
        assert!(window.contains(time(12, 0)));
        assert!(window.contains(time(18, 0)));
        assert!(!window.contains(time(7, 59)));
        assert!(!window.contains(time(18, 1)));
    }

    #[test]
    fn test_time_window_overnight_wrap() {
        // 22:00 - 06:00 spans midnight
        let window = TimeWindow::new(time(22, 0), time(6, 0));
        assert!(window.contains(time(23, 0)));
        assert!(window.contains(time(2, 0)));
        assert!(window.contains(time(22, 0)));
        assert!(window.contains(time(6, 0)));
        assert!(!window.contains(time(12, 0)));
        assert!(!window.contains(time(21, 59)));
    }

    #[test]
    fn test_polygon_degenerate_boundary() {
        let zone = test_zone(vec![[36.0, -1.0], [36.1, -1.0]]);
        assert!(zone.polygon().is_none());

        let zone = test_zone(vec![]);
        assert!(zone.polygon().is_none());
    }

    #[test]
    fn test_polygon_valid_boundary() {
        let zone = test_zone(vec![[36.0, -1.0], [36.1, -1.0], [36.1, -0.9], [36.0, -0.9]]);
        assert!(zone.polygon().is_some());
    }

    #[test]
    fn test_is_open_without_window() {
        let zone = test_zone(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert!(zone.is_open_at(time(3, 30)));
    }

    #[test]
    fn test_is_open_with_window() {
        let mut zone = test_zone(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        zone.access_window = Some(TimeWindow::new(time(6, 0), time(19, 0)));
        assert!(zone.is_open_at(time(9, 0)));
        assert!(!zone.is_open_at(time(22, 0)));
    }
}
