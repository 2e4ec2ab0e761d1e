//! Zone occupancy endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Duration, Utc};
use persistence::repositories::{AssignmentRepository, ReportingRepository, ZoneRepository};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::ZoneOccupancy;

/// Rolling occupancy statistics for a zone.
///
/// GET /api/v1/zones/:zone_id/occupancy
pub async fn get_zone_occupancy(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> Result<Json<ZoneOccupancy>, ApiError> {
    let zone_repo = ZoneRepository::new(state.pool.clone());
    let zone = zone_repo
        .find_by_zone_id(zone_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Zone not found".to_string()))?;

    let reporting = ReportingRepository::new(state.pool.clone());
    let now = Utc::now();
    let current_occupancy = reporting
        .distinct_animals_in_zone_since(zone_id, now - Duration::hours(1))
        .await?;
    let daily_unique_visitors = reporting
        .distinct_animals_in_zone_since(zone_id, now - Duration::hours(24))
        .await?;

    let assignment_repo = AssignmentRepository::new(state.pool.clone());
    let assigned_animals = assignment_repo.count_active_for_zone(zone_id).await?;

    Ok(Json(ZoneOccupancy::compute(
        zone.zone_id,
        zone.name,
        current_occupancy,
        daily_unique_visitors,
        assigned_animals,
        zone.max_capacity,
    )))
}
