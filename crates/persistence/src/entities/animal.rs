//! Animal entity (database row mapping).
//!
//! Maps to the `animals` table, owned by the external registry.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the animals table.
#[derive(Debug, Clone, FromRow)]
pub struct AnimalEntity {
    pub id: i64,
    pub animal_id: Uuid,
    pub tag: String,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
