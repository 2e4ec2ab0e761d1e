//! Tracking device health endpoint handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use persistence::repositories::{DeviceRepository, PingRepository};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::report::assess_device_health;
use domain::models::DeviceHealth;

/// Health assessment for a tracking device: battery, signal and ping
/// recency against the device's reporting interval.
///
/// GET /api/v1/devices/:device_id/health
pub async fn get_device_health(
    State(state): State<AppState>,
    Path(device_id): Path<Uuid>,
) -> Result<Json<DeviceHealth>, ApiError> {
    let device_repo = DeviceRepository::new(state.pool.clone());
    let device = device_repo
        .find_by_device_id(device_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    let ping_repo = PingRepository::new(state.pool.clone());
    let last_ping_at = ping_repo.latest_recorded_at_for_device(device_id).await?;

    Ok(Json(assess_device_health(
        device.device_id,
        device.last_battery_level,
        device.last_signal_strength,
        last_ping_at,
        device.update_interval_minutes as i64,
        Utc::now(),
    )))
}
