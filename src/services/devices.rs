use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Device,
};

pub struct DeviceService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct UpsertedDevice {
    #[sqlx(flatten)]
    device: Device,
    created: bool,
}

impl DeviceService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a device, or refresh the token of an already-registered one.
    ///
    /// Returns the persisted record plus whether a new row was created.
    /// The insert-or-update is a single statement so two concurrent
    /// registrations for the same UUID cannot produce two rows.
    pub async fn register(
        &self,
        device_uuid: Option<Uuid>,
        fcm_token: &str,
    ) -> AppResult<(Device, bool)> {
        if fcm_token.trim().is_empty() {
            return Err(AppError::Validation("push_token must not be empty".to_string()));
        }

        let device_uuid = device_uuid.unwrap_or_else(Uuid::new_v4);

        // xmax = 0 distinguishes a fresh insert from a conflict-update.
        let row: UpsertedDevice = sqlx::query_as(
            r#"
            INSERT INTO devices (device_uuid, fcm_token)
            VALUES ($1, $2)
            ON CONFLICT (device_uuid)
            DO UPDATE SET fcm_token = EXCLUDED.fcm_token,
                          is_active = TRUE,
                          updated_at = NOW()
            RETURNING device_uuid, fcm_token, is_active, created_at, updated_at,
                      (xmax = 0) AS created
            "#,
        )
        .bind(device_uuid)
        .bind(fcm_token)
        .fetch_one(&self.db)
        .await?;

        if row.created {
            tracing::info!(device_uuid = %device_uuid, "Registered new device");
        } else {
            tracing::info!(device_uuid = %device_uuid, "Updated existing device");
        }

        Ok((row.device, row.created))
    }

    /// All devices that are currently registered for notifications.
    pub async fn get_active_devices(&self) -> AppResult<Vec<Device>> {
        let devices: Vec<Device> = sqlx::query_as(
            r#"
            SELECT device_uuid, fcm_token, is_active, created_at, updated_at
            FROM devices WHERE is_active = TRUE
            ORDER BY updated_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(devices)
    }

    /// Soft delete: the row is kept so the UUID stays reserved.
    pub async fn deactivate(&self, device_uuid: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE devices SET is_active = FALSE, updated_at = NOW() WHERE device_uuid = $1",
        )
        .bind(device_uuid)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::DeviceNotFound);
        }

        tracing::info!(device_uuid = %device_uuid, "Deactivated device");
        Ok(())
    }

    /// FCM tokens of all active devices, for multicast pushes.
    pub async fn get_active_tokens(&self) -> AppResult<Vec<String>> {
        let tokens: Vec<(String,)> =
            sqlx::query_as("SELECT fcm_token FROM devices WHERE is_active = TRUE")
                .fetch_all(&self.db)
                .await?;

        Ok(tokens.into_iter().map(|(t,)| t).collect())
    }

    /// Deactivate every device holding one of the given tokens. Used when
    /// FCM reports a token as unregistered.
    pub async fn deactivate_tokens(&self, tokens: &[String]) -> AppResult<u64> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE devices SET is_active = FALSE, updated_at = NOW() WHERE fcm_token = ANY($1)",
        )
        .bind(tokens)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
