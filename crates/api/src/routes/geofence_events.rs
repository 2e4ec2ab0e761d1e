//! Geofence event endpoint handlers.
//!
//! Events are created by the detection engine during ping ingestion; this
//! surface is read-only.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use persistence::repositories::GeofenceEventRepository;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::geofence_event::{
    GeofenceEventResponse, ListGeofenceEventsQuery, ListGeofenceEventsResponse,
};

/// Maximum events per query.
const MAX_EVENTS_LIMIT: i64 = 100;

/// List geofence events for an animal.
///
/// GET /api/v1/geofence-events?animalId=<uuid>
pub async fn list_geofence_events(
    State(state): State<AppState>,
    Query(query): Query<ListGeofenceEventsQuery>,
) -> Result<Json<ListGeofenceEventsResponse>, ApiError> {
    let limit = query.limit.clamp(1, MAX_EVENTS_LIMIT);
    let transition = query.transition.map(|t| t.as_str());

    let event_repo = GeofenceEventRepository::new(state.pool.clone());
    let entities = event_repo
        .list_by_animal(query.animal_id, query.zone_id, transition, limit)
        .await?;
    let total = event_repo
        .count_by_animal(query.animal_id, query.zone_id, transition)
        .await?;

    let events: Vec<GeofenceEventResponse> = entities
        .into_iter()
        .map(|e| e.into_domain().into())
        .collect();

    Ok(Json(ListGeofenceEventsResponse { events, total }))
}

/// Get a single geofence event by ID.
///
/// GET /api/v1/geofence-events/:event_id
pub async fn get_geofence_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<GeofenceEventResponse>, ApiError> {
    let event_repo = GeofenceEventRepository::new(state.pool.clone());
    let entity = event_repo
        .find_by_event_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Geofence event not found".to_string()))?;

    Ok(Json(entity.into_domain().into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::TransitionType;

    #[test]
    fn test_list_query_deserialization() {
        let json = r#"{"animalId": "550e8400-e29b-41d4-a716-446655440000"}"#;
        let query: ListGeofenceEventsQuery = serde_json::from_str(json).unwrap();
        assert_eq!(
            query.animal_id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(query.limit, 50);
    }

    #[test]
    fn test_list_query_with_filters() {
        let json = r#"{
            "animalId": "550e8400-e29b-41d4-a716-446655440000",
            "zoneId": "660e8400-e29b-41d4-a716-446655440001",
            "transition": "violation",
            "limit": 25
        }"#;
        let query: ListGeofenceEventsQuery = serde_json::from_str(json).unwrap();
        assert!(query.zone_id.is_some());
        assert_eq!(query.transition, Some(TransitionType::Violation));
        assert_eq!(query.limit, 25);
    }
}
