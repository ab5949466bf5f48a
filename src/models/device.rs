use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered mobile device. `device_uuid` stays unique across the whole
/// lifecycle, including soft-deleted rows.
///
/// Column names predate the current API contract, so the wire format renames
/// them to `device_id` / `push_token`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Device {
    #[serde(rename = "device_id")]
    pub device_uuid: Uuid,
    #[serde(rename = "push_token")]
    pub fcm_token: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
