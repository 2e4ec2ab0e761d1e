//! Ping repository.
//!
//! Owns the atomic ingest unit: the ping row, its membership set and any
//! detected events commit in a single transaction, so a ping is either
//! fully processed or not stored at all. Chronological queries order by
//! `recorded_at`, never insertion order.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GeofenceEventEntity, PingEntity, PingZoneRow};
use crate::metrics::QueryTimer;
use domain::models::NewGeofenceEvent;

/// Input for inserting a ping.
#[derive(Debug, Clone)]
pub struct PingInput {
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
    pub recorded_at: DateTime<Utc>,
    pub within_boundary: bool,
}

/// Query parameters for cursor-paginated ping history.
#[derive(Debug, Clone)]
pub struct PingHistoryQuery {
    pub animal_id: Uuid,
    pub cursor_recorded_at: Option<DateTime<Utc>>,
    pub cursor_id: Option<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub ascending: bool,
}

/// Repository for ping operations.
#[derive(Clone)]
pub struct PingRepository {
    pool: PgPool,
}

impl PingRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a ping by its natural key. A hit means the exact reading was
    /// already processed and detection must not re-run.
    pub async fn find_by_natural_key(
        &self,
        animal_id: Uuid,
        device_id: Uuid,
        recorded_at: DateTime<Utc>,
    ) -> Result<Option<PingEntity>, sqlx::Error> {
        sqlx::query_as::<_, PingEntity>(
            r#"
            SELECT * FROM pings
            WHERE animal_id = $1 AND device_id = $2 AND recorded_at = $3
            "#,
        )
        .bind(animal_id)
        .bind(device_id)
        .bind(recorded_at)
        .fetch_optional(&self.pool)
        .await
    }

    /// The animal's latest stored event time, for out-of-order reporting.
    pub async fn latest_recorded_at(
        &self,
        animal_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT recorded_at FROM pings
            WHERE animal_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(animal_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(recorded_at,)| recorded_at))
    }

    /// The most recent event time reported by a device, across animals.
    pub async fn latest_recorded_at_for_device(
        &self,
        device_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT recorded_at FROM pings
            WHERE device_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(recorded_at,)| recorded_at))
    }

    /// The chronologically previous ping (strictly earlier `recorded_at`)
    /// and its membership set.
    pub async fn find_previous_with_membership(
        &self,
        animal_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Option<(PingEntity, Vec<Uuid>)>, sqlx::Error> {
        let timer = QueryTimer::new("find_previous_ping");
        let previous = sqlx::query_as::<_, PingEntity>(
            r#"
            SELECT * FROM pings
            WHERE animal_id = $1 AND recorded_at < $2
            ORDER BY recorded_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(animal_id)
        .bind(before)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        let Some(previous) = previous else {
            return Ok(None);
        };

        let zone_ids: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT zone_id FROM ping_zones
            WHERE ping_id = $1
            ORDER BY zone_id
            "#,
        )
        .bind(previous.id)
        .fetch_all(&self.pool)
        .await?;

        let zone_ids = zone_ids.into_iter().map(|(zone_id,)| zone_id).collect();
        Ok(Some((previous, zone_ids)))
    }

    /// recorded_at of the most recent prior ping inside at least one zone
    /// the animal is currently assigned to.
    pub async fn last_inside_assigned_at(
        &self,
        animal_id: Uuid,
        before: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        let timer = QueryTimer::new("last_inside_assigned_at");
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            r#"
            SELECT p.recorded_at FROM pings p
            WHERE p.animal_id = $1
              AND p.recorded_at < $2
              AND EXISTS (
                  SELECT 1 FROM ping_zones pz
                  JOIN zone_assignments za
                    ON za.zone_id = pz.zone_id
                   AND za.animal_id = p.animal_id
                   AND za.active
                  WHERE pz.ping_id = p.id
              )
            ORDER BY p.recorded_at DESC, p.id DESC
            LIMIT 1
            "#,
        )
        .bind(animal_id)
        .bind(before)
        .fetch_optional(&self.pool)
        .await?;
        timer.record();

        Ok(row.map(|(recorded_at,)| recorded_at))
    }

    /// Stores a fully processed ping: the ping row, its membership set and
    /// any detected events, in one transaction.
    pub async fn insert_processed(
        &self,
        input: PingInput,
        zone_ids: &[Uuid],
        events: &[NewGeofenceEvent],
    ) -> Result<(PingEntity, Vec<GeofenceEventEntity>), sqlx::Error> {
        let timer = QueryTimer::new("insert_processed_ping");
        let mut tx = self.pool.begin().await?;

        let ping = sqlx::query_as::<_, PingEntity>(
            r#"
            INSERT INTO pings (
                animal_id, device_id, latitude, longitude, altitude, accuracy,
                speed, heading, battery_level, signal_strength, temperature,
                recorded_at, within_boundary
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(input.animal_id)
        .bind(input.device_id)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.altitude)
        .bind(input.accuracy)
        .bind(input.speed)
        .bind(input.heading)
        .bind(input.battery_level)
        .bind(input.signal_strength)
        .bind(input.temperature)
        .bind(input.recorded_at)
        .bind(input.within_boundary)
        .fetch_one(&mut *tx)
        .await?;

        for zone_id in zone_ids {
            sqlx::query(
                r#"
                INSERT INTO ping_zones (ping_id, zone_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(ping.id)
            .bind(zone_id)
            .execute(&mut *tx)
            .await?;
        }

        let mut stored_events = Vec::with_capacity(events.len());
        for event in events {
            let entity = sqlx::query_as::<_, GeofenceEventEntity>(
                r#"
                INSERT INTO geofence_events (
                    animal_id, zone_id, ping_id, transition, severity,
                    distance_from_boundary_m, duration_outside_secs
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING *
                "#,
            )
            .bind(event.animal_id)
            .bind(event.zone_id)
            .bind(ping.id)
            .bind(event.transition.as_str())
            .bind(event.severity.as_str())
            .bind(event.distance_from_boundary_m)
            .bind(event.duration_outside_secs)
            .fetch_one(&mut *tx)
            .await?;
            stored_events.push(entity);
        }

        tx.commit().await?;
        timer.record();

        Ok((ping, stored_events))
    }

    /// Cursor-paginated ping history. Returns one page and whether more
    /// rows exist beyond it.
    pub async fn get_ping_history(
        &self,
        query: PingHistoryQuery,
    ) -> Result<(Vec<PingEntity>, bool), sqlx::Error> {
        // Fetch one extra row to detect a further page
        let fetch_limit = query.limit + 1;

        let entities = if query.ascending {
            sqlx::query_as::<_, PingEntity>(
                r#"
                SELECT * FROM pings
                WHERE animal_id = $1
                  AND ($2::timestamptz IS NULL OR recorded_at >= $2)
                  AND ($3::timestamptz IS NULL OR recorded_at <= $3)
                  AND ($4::timestamptz IS NULL OR (recorded_at, id) > ($4, $5))
                ORDER BY recorded_at ASC, id ASC
                LIMIT $6
                "#,
            )
            .bind(query.animal_id)
            .bind(query.from)
            .bind(query.to)
            .bind(query.cursor_recorded_at)
            .bind(query.cursor_id.unwrap_or(0))
            .bind(fetch_limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, PingEntity>(
                r#"
                SELECT * FROM pings
                WHERE animal_id = $1
                  AND ($2::timestamptz IS NULL OR recorded_at >= $2)
                  AND ($3::timestamptz IS NULL OR recorded_at <= $3)
                  AND ($4::timestamptz IS NULL OR (recorded_at, id) < ($4, $5))
                ORDER BY recorded_at DESC, id DESC
                LIMIT $6
                "#,
            )
            .bind(query.animal_id)
            .bind(query.from)
            .bind(query.to)
            .bind(query.cursor_recorded_at)
            .bind(query.cursor_id.unwrap_or(0))
            .bind(fetch_limit)
            .fetch_all(&self.pool)
            .await?
        };

        let has_more = entities.len() as i64 > query.limit;
        let mut entities = entities;
        entities.truncate(query.limit as usize);

        Ok((entities, has_more))
    }

    /// Membership rows for a page of pings.
    pub async fn membership_for_pings(
        &self,
        ping_ids: &[i64],
    ) -> Result<Vec<PingZoneRow>, sqlx::Error> {
        if ping_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, PingZoneRow>(
            r#"
            SELECT ping_id, zone_id FROM ping_zones
            WHERE ping_id = ANY($1)
            ORDER BY ping_id, zone_id
            "#,
        )
        .bind(ping_ids)
        .fetch_all(&self.pool)
        .await
    }
}
