//! Location summary report endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{TimeZone, Utc};
use persistence::repositories::{AnimalRepository, ReportingRepository};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::report::{
    build_location_summary, LocationSummary, LocationSummaryQuery, SummaryPing,
};

/// Per-animal movement summary over a date range.
///
/// GET /api/v1/animals/:animal_id/location-summary?from=<ms>&to=<ms>
pub async fn get_location_summary(
    State(state): State<AppState>,
    Path(animal_id): Path<Uuid>,
    Query(query): Query<LocationSummaryQuery>,
) -> Result<Json<LocationSummary>, ApiError> {
    let from = Utc
        .timestamp_millis_opt(query.from)
        .single()
        .ok_or_else(|| ApiError::Validation(format!("Invalid 'from' timestamp: {}", query.from)))?;
    let to = Utc
        .timestamp_millis_opt(query.to)
        .single()
        .ok_or_else(|| ApiError::Validation(format!("Invalid 'to' timestamp: {}", query.to)))?;
    if from > to {
        return Err(ApiError::Validation(
            "'from' must not be after 'to'".to_string(),
        ));
    }

    let animal_repo = AnimalRepository::new(state.pool.clone());
    animal_repo
        .find_by_animal_id(animal_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Animal not found".to_string()))?;

    let reporting = ReportingRepository::new(state.pool.clone());
    let rows = reporting.summary_rows(animal_id, from, to).await?;

    // Collapse joined rows (one per ping/zone pair) into one entry per ping
    let mut pings: Vec<SummaryPing> = Vec::new();
    let mut last_ping_id: Option<i64> = None;
    for row in rows {
        if last_ping_id != Some(row.ping_id) {
            pings.push(SummaryPing {
                latitude: row.latitude,
                longitude: row.longitude,
                zone_names: Vec::new(),
                update_interval_minutes: row.update_interval_minutes as i64,
            });
            last_ping_id = Some(row.ping_id);
        }
        if let (Some(zone_name), Some(ping)) = (row.zone_name, pings.last_mut()) {
            ping.zone_names.push(zone_name);
        }
    }

    let summary = build_location_summary(animal_id, from, to, &pings)
        .ok_or_else(|| ApiError::NotFound("No pings recorded in range".to_string()))?;

    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_query_deserialization() {
        let query: LocationSummaryQuery =
            serde_json::from_str(r#"{"from": 1700000000000, "to": 1700086400000}"#).unwrap();
        assert_eq!(query.from, 1700000000000);
        assert_eq!(query.to, 1700086400000);
    }
}
