//! Zone assignment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::ZoneAssignment;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the zone_assignments table.
#[derive(Debug, Clone, FromRow)]
pub struct ZoneAssignmentEntity {
    pub id: i64,
    pub animal_id: Uuid,
    pub zone_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ZoneAssignmentEntity> for ZoneAssignment {
    fn from(entity: ZoneAssignmentEntity) -> Self {
        Self {
            id: entity.id,
            animal_id: entity.animal_id,
            zone_id: entity.zone_id,
            active: entity.active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
