//! Zone repository (read-only; the registry owns writes).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ZoneEntity;

/// Repository for zone lookups.
#[derive(Clone)]
pub struct ZoneRepository {
    pool: PgPool,
}

impl ZoneRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a zone by its public identifier.
    pub async fn find_by_zone_id(&self, zone_id: Uuid) -> Result<Option<ZoneEntity>, sqlx::Error> {
        sqlx::query_as::<_, ZoneEntity>(
            r#"
            SELECT * FROM zones
            WHERE zone_id = $1
            "#,
        )
        .bind(zone_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Fetches zone records for a set of identifiers.
    pub async fn find_by_zone_ids(
        &self,
        zone_ids: &[Uuid],
    ) -> Result<Vec<ZoneEntity>, sqlx::Error> {
        if zone_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, ZoneEntity>(
            r#"
            SELECT * FROM zones
            WHERE zone_id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(zone_ids)
        .fetch_all(&self.pool)
        .await
    }

    /// Active zones actively assigned to an animal: the membership universe
    /// for its pings.
    pub async fn find_active_assigned_to_animal(
        &self,
        animal_id: Uuid,
    ) -> Result<Vec<ZoneEntity>, sqlx::Error> {
        sqlx::query_as::<_, ZoneEntity>(
            r#"
            SELECT z.* FROM zones z
            JOIN zone_assignments za ON za.zone_id = z.zone_id
            WHERE za.animal_id = $1 AND za.active AND z.active
            ORDER BY z.name
            "#,
        )
        .bind(animal_id)
        .fetch_all(&self.pool)
        .await
    }
}
