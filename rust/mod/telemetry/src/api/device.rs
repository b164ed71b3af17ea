use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use serde::Serialize;

use roadwatch_core::{Empty, Envelope, ServiceError};

use super::AppState;
use crate::model::{Device, DeviceInput};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices/all", get(list_devices))
        .route("/devices/add", post(add_device))
        .route("/devices/update/{id}", put(update_device))
        .route("/devices/delete/{id}", delete(delete_device))
}

#[derive(Serialize)]
struct DeviceList {
    devices: Vec<Device>,
}

#[derive(Serialize)]
struct DeviceBody {
    device: Device,
}

async fn list_devices(
    State(svc): State<AppState>,
) -> Result<Json<Envelope<DeviceList>>, ServiceError> {
    let devices = svc.list_devices()?;
    Ok(Json(Envelope::success(
        "Devices retrieved successfully",
        DeviceList { devices },
    )))
}

async fn add_device(
    State(svc): State<AppState>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<Envelope<DeviceBody>>, ServiceError> {
    let device = svc.create_device(input)?;
    Ok(Json(Envelope::success(
        "Device added successfully",
        DeviceBody { device },
    )))
}

async fn update_device(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<DeviceInput>,
) -> Result<Json<Envelope<DeviceBody>>, ServiceError> {
    let device = svc.update_device(id, input)?;
    Ok(Json(Envelope::success(
        "Device updated successfully",
        DeviceBody { device },
    )))
}

async fn delete_device(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<Empty>>, ServiceError> {
    svc.delete_device(id)?;
    Ok(Json(Envelope::ok("Device deleted successfully")))
}
