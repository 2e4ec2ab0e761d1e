//! Tracking device repository (read-only apart from last-reading refresh).

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::DeviceEntity;

/// Repository for tracking device operations.
#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

impl DeviceRepository {
    /// Creates a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds a device by its public identifier.
    pub async fn find_by_device_id(
        &self,
        device_id: Uuid,
    ) -> Result<Option<DeviceEntity>, sqlx::Error> {
        sqlx::query_as::<_, DeviceEntity>(
            r#"
            SELECT * FROM tracking_devices
            WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Refreshes the device's last battery/signal readings from a ping.
    ///
    /// Missing readings leave the stored values untouched.
    pub async fn update_last_readings(
        &self,
        device_id: Uuid,
        battery_level: Option<i32>,
        signal_strength: Option<i32>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE tracking_devices
            SET last_battery_level = COALESCE($2, last_battery_level),
                last_signal_strength = COALESCE($3, last_signal_strength),
                updated_at = NOW()
            WHERE device_id = $1
            "#,
        )
        .bind(device_id)
        .bind(battery_level)
        .bind(signal_strength)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
