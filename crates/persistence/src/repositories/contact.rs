//! Notification contact repository (read-only; the registry owns writes).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ContactEntity;

/// Repository for notification contact lookups.
#[derive(Clone)]
pub struct ContactRepository {
    pool: PgPool,
}

impl ContactRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active contacts linked to the event's animal or zone.
    ///
    /// A null zone (violation/timeout events) matches animal-linked
    /// contacts only.
    pub async fn find_active_for_event(
        &self,
        animal_id: Uuid,
        zone_id: Option<Uuid>,
    ) -> Result<Vec<ContactEntity>, sqlx::Error> {
        sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT c.* FROM notification_contacts c
            WHERE c.active
              AND (
                  EXISTS (
                      SELECT 1 FROM contact_animals ca
                      WHERE ca.contact_id = c.contact_id AND ca.animal_id = $1
                  )
                  OR ($2::uuid IS NOT NULL AND EXISTS (
                      SELECT 1 FROM contact_zones cz
                      WHERE cz.contact_id = c.contact_id AND cz.zone_id = $2
                  ))
              )
            ORDER BY c.name
            "#,
        )
        .bind(animal_id)
        .bind(zone_id)
        .fetch_all(&self.pool)
        .await
    }
}
