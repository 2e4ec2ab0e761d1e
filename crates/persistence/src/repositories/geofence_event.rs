//! Geofence event repository.
//!
//! Events are append-only; inserts happen inside the ping repository's
//! atomic unit. This repository owns the read side, including the
//! dedup-window existence queries the detector depends on. Windows are
//! measured against the triggering ping's `recorded_at` so detection stays
//! deterministic under replay.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GeofenceEventWithContext;
use crate::metrics::QueryTimer;

/// Repository for geofence event operations.
#[derive(Clone)]
pub struct GeofenceEventRepository {
    pool: PgPool,
}

impl GeofenceEventRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a violation or timeout event exists whose triggering ping
    /// falls in `[window_start, until]`.
    pub async fn violation_or_timeout_exists_in_window(
        &self,
        animal_id: Uuid,
        window_start: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("violation_window_exists");
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM geofence_events e
                JOIN pings p ON p.id = e.ping_id
                WHERE e.animal_id = $1
                  AND e.transition IN ('violation', 'timeout')
                  AND p.recorded_at >= $2
                  AND p.recorded_at <= $3
            )
            "#,
        )
        .bind(animal_id)
        .bind(window_start)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(row.0)
    }

    /// Whether a timeout event exists whose triggering ping falls in
    /// `[window_start, until]`.
    pub async fn timeout_exists_in_window(
        &self,
        animal_id: Uuid,
        window_start: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("timeout_window_exists");
        let row: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM geofence_events e
                JOIN pings p ON p.id = e.ping_id
                WHERE e.animal_id = $1
                  AND e.transition = 'timeout'
                  AND p.recorded_at >= $2
                  AND p.recorded_at <= $3
            )
            "#,
        )
        .bind(animal_id)
        .bind(window_start)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(row.0)
    }

    /// Finds an event by its public identifier, with zone name and ping
    /// identifier attached.
    pub async fn find_by_event_id(
        &self,
        event_id: Uuid,
    ) -> Result<Option<GeofenceEventWithContext>, sqlx::Error> {
        sqlx::query_as::<_, GeofenceEventWithContext>(
            r#"
            SELECT
                e.id, e.event_id, e.animal_id, e.zone_id,
                z.name AS zone_name,
                p.ping_id AS ping_uuid,
                e.transition, e.severity, e.distance_from_boundary_m,
                e.duration_outside_secs, e.created_at
            FROM geofence_events e
            JOIN pings p ON p.id = e.ping_id
            LEFT JOIN zones z ON z.zone_id = e.zone_id
            WHERE e.event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Lists events for an animal, newest first, with optional zone and
    /// transition filters.
    pub async fn list_by_animal(
        &self,
        animal_id: Uuid,
        zone_id: Option<Uuid>,
        transition: Option<&str>,
        limit: i64,
    ) -> Result<Vec<GeofenceEventWithContext>, sqlx::Error> {
        sqlx::query_as::<_, GeofenceEventWithContext>(
            r#"
            SELECT
                e.id, e.event_id, e.animal_id, e.zone_id,
                z.name AS zone_name,
                p.ping_id AS ping_uuid,
                e.transition, e.severity, e.distance_from_boundary_m,
                e.duration_outside_secs, e.created_at
            FROM geofence_events e
            JOIN pings p ON p.id = e.ping_id
            LEFT JOIN zones z ON z.zone_id = e.zone_id
            WHERE e.animal_id = $1
              AND ($2::uuid IS NULL OR e.zone_id = $2)
              AND ($3::text IS NULL OR e.transition = $3)
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT $4
            "#,
        )
        .bind(animal_id)
        .bind(zone_id)
        .bind(transition)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Counts events for an animal with the same filters as `list_by_animal`.
    pub async fn count_by_animal(
        &self,
        animal_id: Uuid,
        zone_id: Option<Uuid>,
        transition: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM geofence_events e
            WHERE e.animal_id = $1
              AND ($2::uuid IS NULL OR e.zone_id = $2)
              AND ($3::text IS NULL OR e.transition = $3)
            "#,
        )
        .bind(animal_id)
        .bind(zone_id)
        .bind(transition)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
