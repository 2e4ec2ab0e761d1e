//! Reporting repository: read-only aggregates over stored pings.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::metrics::QueryTimer;

/// One joined row for the location summary builder: a ping paired with one
/// of its zones (or none), in chronological order.
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRowEntity {
    pub ping_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub update_interval_minutes: i32,
    pub zone_name: Option<String>,
}

/// Repository for occupancy and summary aggregates.
#[derive(Clone)]
pub struct ReportingRepository {
    pool: PgPool,
}

impl ReportingRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Distinct animals with a ping inside the zone since the given time.
    ///
    /// Called with a one-hour window for current occupancy and a 24-hour
    /// window for daily unique visitors.
    pub async fn distinct_animals_in_zone_since(
        &self,
        zone_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("distinct_animals_in_zone");
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT p.animal_id)
            FROM pings p
            JOIN ping_zones pz ON pz.ping_id = p.id
            WHERE pz.zone_id = $1 AND p.recorded_at >= $2
            "#,
        )
        .bind(zone_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        timer.record();

        Ok(count.0)
    }

    /// Chronological ping/zone rows for a location summary. Pings outside
    /// every zone appear once with a null zone name; pings inside several
    /// zones appear once per zone.
    pub async fn summary_rows(
        &self,
        animal_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SummaryRowEntity>, sqlx::Error> {
        let timer = QueryTimer::new("summary_rows");
        let rows = sqlx::query_as::<_, SummaryRowEntity>(
            r#"
            SELECT
                p.id AS ping_id,
                p.latitude,
                p.longitude,
                d.update_interval_minutes,
                z.name AS zone_name
            FROM pings p
            JOIN tracking_devices d ON d.device_id = p.device_id
            LEFT JOIN ping_zones pz ON pz.ping_id = p.id
            LEFT JOIN zones z ON z.zone_id = pz.zone_id
            WHERE p.animal_id = $1
              AND p.recorded_at >= $2
              AND p.recorded_at <= $3
            ORDER BY p.recorded_at ASC, p.id ASC, z.name ASC
            "#,
        )
        .bind(animal_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        timer.record();

        Ok(rows)
    }
}
