use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::Device,
    services::devices::DeviceService,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_id: Option<Uuid>,
    pub push_token: Option<String>,
}

/// POST /devices — insert-or-update keyed on the device id.
/// 201 when a new device was registered, 200 when an existing one was
/// refreshed.
pub async fn register_device(
    State(state): State<AppState>,
    Json(req): Json<RegisterDeviceRequest>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let push_token = req
        .push_token
        .ok_or_else(|| AppError::Validation("push_token is required".to_string()))?;

    let service = DeviceService::new(state.db.clone());
    let (device, created) = service.register(req.device_id, &push_token).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(device)))
}

/// GET /devices — all active devices. An empty list is a valid answer.
pub async fn get_devices(State(state): State<AppState>) -> AppResult<Json<Vec<Device>>> {
    let service = DeviceService::new(state.db.clone());
    let devices = service.get_active_devices().await?;
    Ok(Json(devices))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// DELETE /devices/:device_uuid — soft delete, the row is retained.
pub async fn remove_device(
    State(state): State<AppState>,
    Path(device_uuid): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    let service = DeviceService::new(state.db.clone());
    service.deactivate(device_uuid).await?;

    Ok(Json(MessageResponse {
        message: "Device deactivated".to_string(),
    }))
}
