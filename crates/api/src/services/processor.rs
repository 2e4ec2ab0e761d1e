//! Ping processor: the ingest orchestration around the pure detector.
//!
//! Processing is serialized per animal through a lock registry, because the
//! detector's correctness depends on reading the true chronologically
//! previous ping and on dedup-window queries being consistent at the moment
//! of detection. Cross-animal processing runs concurrently. The ping row,
//! its membership set and any detected events commit as one transaction;
//! alert dispatch runs after commit and its failure is logged, never
//! propagated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::ping::{IngestPingRequest, IngestPingResponse};
use domain::models::{GeofenceEvent, Zone, ZoneAssignment};
use domain::services::detection::{
    detect, DetectionContext, TIMEOUT_DEDUP_MINUTES, VIOLATION_DEDUP_MINUTES,
};
use domain::services::dispatch::{AlertDispatcher, SendOutcome};
use domain::services::membership::resolve_membership;
use persistence::repositories::{
    AnimalRepository, AssignmentRepository, DeviceRepository, GeofenceEventRepository, PingInput,
    PingRepository, ZoneRepository,
};

use crate::middleware::metrics::{
    record_alerts_dispatched, record_geofence_events_detected, record_pings_ingested,
};

/// Errors from ping processing.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Unknown animal: {0}")]
    UnknownAnimal(Uuid),

    #[error("Unknown device: {0}")]
    UnknownDevice(Uuid),

    #[error("Invalid recorded_at timestamp")]
    InvalidTimestamp,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Serialized-per-animal geofence detection pipeline.
pub struct PingProcessor {
    pool: PgPool,
    dispatcher: Arc<dyn AlertDispatcher>,
    animal_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PingProcessor {
    pub fn new(pool: PgPool, dispatcher: Arc<dyn AlertDispatcher>) -> Self {
        Self {
            pool,
            dispatcher,
            animal_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The per-animal processing lock. Two pings for the same animal are
    /// never diffed concurrently against the same previous state.
    async fn lock_for(&self, animal_id: Uuid) -> Arc<Mutex<()>> {
        let mut registry = self.animal_locks.lock().await;
        registry
            .entry(animal_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Processes one validated ingest request end to end.
    pub async fn process(
        &self,
        request: IngestPingRequest,
    ) -> Result<IngestPingResponse, ProcessError> {
        let recorded_at = Utc
            .timestamp_millis_opt(request.recorded_at)
            .single()
            .ok_or(ProcessError::InvalidTimestamp)?;

        let animal_repo = AnimalRepository::new(self.pool.clone());
        let animal = animal_repo
            .find_by_animal_id(request.animal_id)
            .await?
            .filter(|a| a.active)
            .ok_or(ProcessError::UnknownAnimal(request.animal_id))?;

        let device_repo = DeviceRepository::new(self.pool.clone());
        let device = device_repo
            .find_by_device_id(request.device_id)
            .await?
            .filter(|d| d.active)
            .ok_or(ProcessError::UnknownDevice(request.device_id))?;

        let lock = self.lock_for(animal.animal_id).await;
        let _guard = lock.lock().await;

        let ping_repo = PingRepository::new(self.pool.clone());

        // Reprocessing the same reading must not create duplicate events
        if let Some(existing) = ping_repo
            .find_by_natural_key(animal.animal_id, device.device_id, recorded_at)
            .await?
        {
            warn!(
                animal_tag = %animal.tag,
                ping_id = %existing.ping_id,
                recorded_at = %recorded_at,
                "Duplicate ping, returning stored result without re-running detection"
            );
            let zone_ids = ping_repo
                .membership_for_pings(&[existing.id])
                .await?
                .into_iter()
                .map(|row| row.zone_id)
                .collect();
            return Ok(IngestPingResponse {
                ping_id: existing.ping_id,
                animal_id: animal.animal_id,
                within_boundary: existing.within_boundary,
                zone_ids,
                events: Vec::new(),
                duplicate: true,
                out_of_order: false,
            });
        }

        let out_of_order = matches!(
            ping_repo.latest_recorded_at(animal.animal_id).await?,
            Some(latest) if latest > recorded_at
        );
        if out_of_order {
            warn!(
                animal_tag = %animal.tag,
                recorded_at = %recorded_at,
                "Out-of-order ping, diffing against its chronological predecessor"
            );
        }

        let assignment_repo = AssignmentRepository::new(self.pool.clone());
        let assignments: Vec<ZoneAssignment> = assignment_repo
            .list_active_for_animal(animal.animal_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let zone_repo = ZoneRepository::new(self.pool.clone());
        let assigned_zones: Vec<Zone> = zone_repo
            .find_active_assigned_to_animal(animal.animal_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let membership = resolve_membership(
            request.latitude,
            request.longitude,
            recorded_at,
            &assigned_zones,
        );

        let previous_zone_ids = ping_repo
            .find_previous_with_membership(animal.animal_id, recorded_at)
            .await?
            .map(|(_, zone_ids)| zone_ids)
            .unwrap_or_default();
        let previous_zones: Vec<Zone> = zone_repo
            .find_by_zone_ids(&previous_zone_ids)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let event_repo = GeofenceEventRepository::new(self.pool.clone());
        let ctx = DetectionContext {
            has_active_assignments: !assignments.is_empty(),
            recent_violation_or_timeout: event_repo
                .violation_or_timeout_exists_in_window(
                    animal.animal_id,
                    recorded_at - Duration::minutes(VIOLATION_DEDUP_MINUTES),
                    recorded_at,
                )
                .await?,
            recent_timeout: event_repo
                .timeout_exists_in_window(
                    animal.animal_id,
                    recorded_at - Duration::minutes(TIMEOUT_DEDUP_MINUTES),
                    recorded_at,
                )
                .await?,
            last_inside_at: ping_repo
                .last_inside_assigned_at(animal.animal_id, recorded_at)
                .await?,
        };

        let new_events = detect(
            animal.animal_id,
            request.latitude,
            request.longitude,
            recorded_at,
            &membership.zone_ids,
            &assigned_zones,
            &previous_zones,
            &ctx,
        );

        let zone_ids: Vec<Uuid> = membership.zone_ids.iter().copied().collect();
        let input = PingInput {
            animal_id: animal.animal_id,
            device_id: device.device_id,
            latitude: request.latitude,
            longitude: request.longitude,
            altitude: request.altitude,
            accuracy: request.accuracy,
            speed: request.speed,
            heading: request.heading,
            battery_level: request.battery_level,
            signal_strength: request.signal_strength,
            temperature: request.temperature,
            recorded_at,
            within_boundary: membership.within_boundary(),
        };
        let (ping, event_entities) = ping_repo
            .insert_processed(input, &zone_ids, &new_events)
            .await?;

        record_pings_ingested(1);
        record_geofence_events_detected(event_entities.len());

        // Refresh the device's last readings (fire-and-forget)
        if request.battery_level.is_some() || request.signal_strength.is_some() {
            let pool = self.pool.clone();
            let device_id = device.device_id;
            let battery_level = request.battery_level;
            let signal_strength = request.signal_strength;
            tokio::spawn(async move {
                let repo = DeviceRepository::new(pool);
                if let Err(e) = repo
                    .update_last_readings(device_id, battery_level, signal_strength)
                    .await
                {
                    warn!("Failed to update device readings: {}", e);
                }
            });
        }

        let zone_name = |zone_id: Option<Uuid>| -> Option<String> {
            zone_id.and_then(|id| {
                assigned_zones
                    .iter()
                    .chain(previous_zones.iter())
                    .find(|z| z.zone_id == id)
                    .map(|z| z.name.clone())
            })
        };
        let events: Vec<GeofenceEvent> = event_entities
            .into_iter()
            .map(|e| {
                GeofenceEvent::from_raw(
                    e.id,
                    e.event_id,
                    e.animal_id,
                    e.zone_id,
                    zone_name(e.zone_id),
                    ping.ping_id,
                    &e.transition,
                    &e.severity,
                    e.distance_from_boundary_m,
                    e.duration_outside_secs,
                    e.created_at,
                )
            })
            .collect();

        // Dispatch runs post-commit; attempts are reported, never raised
        for event in events.iter().filter(|e| e.severity.is_alertable()) {
            let attempts = self.dispatcher.dispatch(event).await;
            let sent = attempts
                .iter()
                .filter(|a| a.outcome == SendOutcome::Sent)
                .count();
            record_alerts_dispatched(sent);
            for attempt in &attempts {
                if let SendOutcome::Failed(reason) = &attempt.outcome {
                    warn!(
                        event_id = %event.event_id,
                        contact = %attempt.contact_name,
                        method = %attempt.method,
                        reason = %reason,
                        "Alert send failed"
                    );
                }
            }
            info!(
                event_id = %event.event_id,
                severity = %event.severity,
                attempts = attempts.len(),
                sent = sent,
                "Alert dispatch completed"
            );
        }

        info!(
            animal_tag = %animal.tag,
            in_zones = zone_ids.len(),
            assigned_zones = assigned_zones.len(),
            events = events.len(),
            "Processed geofence check"
        );

        Ok(IngestPingResponse {
            ping_id: ping.ping_id,
            animal_id: animal.animal_id,
            within_boundary: ping.within_boundary,
            zone_ids,
            events: events.into_iter().map(Into::into).collect(),
            duplicate: false,
            out_of_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_error_display() {
        let animal_id = Uuid::nil();
        assert_eq!(
            format!("{}", ProcessError::UnknownAnimal(animal_id)),
            format!("Unknown animal: {}", animal_id)
        );
        assert_eq!(
            format!("{}", ProcessError::InvalidTimestamp),
            "Invalid recorded_at timestamp"
        );
    }
}
