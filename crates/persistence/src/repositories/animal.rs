//! Animal repository (read-only; the registry owns writes).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AnimalEntity;

/// Repository for animal lookups.
#[derive(Clone)]
pub struct AnimalRepository {
    pool: PgPool,
}

impl AnimalRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds an animal by its public identifier.
    pub async fn find_by_animal_id(
        &self,
        animal_id: Uuid,
    ) -> Result<Option<AnimalEntity>, sqlx::Error> {
        sqlx::query_as::<_, AnimalEntity>(
            r#"
            SELECT * FROM animals
            WHERE animal_id = $1
            "#,
        )
        .bind(animal_id)
        .fetch_optional(&self.pool)
        .await
    }
}
