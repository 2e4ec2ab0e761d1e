//! Zone assignment repository (read-only; the registry owns writes).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ZoneAssignmentEntity;

/// Repository for zone assignment lookups.
#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

impl AssignmentRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists the animal's active assignments.
    pub async fn list_active_for_animal(
        &self,
        animal_id: Uuid,
    ) -> Result<Vec<ZoneAssignmentEntity>, sqlx::Error> {
        sqlx::query_as::<_, ZoneAssignmentEntity>(
            r#"
            SELECT * FROM zone_assignments
            WHERE animal_id = $1 AND active
            ORDER BY created_at
            "#,
        )
        .bind(animal_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Counts animals actively assigned to a zone.
    pub async fn count_active_for_zone(&self, zone_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM zone_assignments
            WHERE zone_id = $1 AND active
            "#,
        )
        .bind(zone_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
