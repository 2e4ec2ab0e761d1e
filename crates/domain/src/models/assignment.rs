//! Zone assignment domain model.
//!
//! An assignment links an animal to a zone it is expected to stay within.
//! At most one active assignment exists per (animal, zone) pair; the
//! registry owns that invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Active link between an animal and one of its zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAssignment {
    pub id: i64,
    pub animal_id: Uuid,
    pub zone_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
