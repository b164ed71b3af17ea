use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Serialize;

use roadwatch_core::{Envelope, ServiceError};

use super::AppState;
use crate::model::{IngestReading, Reading, ReadingQuery, ReadingView};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sensor/add", post(add_reading))
        .route("/sensor/all", get(list_readings))
        .route("/sensor/latest", get(latest_readings))
        .route("/sensor/latest/{deviceId}", get(latest_for_device))
}

#[derive(Serialize)]
struct ReadingList {
    readings: Vec<ReadingView>,
}

#[derive(Serialize)]
struct StoredReading {
    reading: Reading,
}

#[derive(Serialize)]
struct LatestReading {
    reading: ReadingView,
}

/// Ingestion endpoint the field gateways post to. The response echoes
/// the stored reading so a gateway can log the assigned id and the
/// classification.
async fn add_reading(
    State(svc): State<AppState>,
    Json(req): Json<IngestReading>,
) -> Result<Json<Envelope<StoredReading>>, ServiceError> {
    let reading = svc.ingest(req)?;
    Ok(Json(Envelope::success(
        "Sensor data added successfully",
        StoredReading { reading },
    )))
}

async fn list_readings(
    State(svc): State<AppState>,
    Query(query): Query<ReadingQuery>,
) -> Result<Json<Envelope<ReadingList>>, ServiceError> {
    let readings = svc.history(&query)?;
    Ok(Json(Envelope::success(
        "Sensor data retrieved successfully",
        ReadingList { readings },
    )))
}

async fn latest_readings(
    State(svc): State<AppState>,
) -> Result<Json<Envelope<ReadingList>>, ServiceError> {
    let readings = svc.latest_readings()?;
    Ok(Json(Envelope::success(
        "Latest readings retrieved successfully",
        ReadingList { readings },
    )))
}

async fn latest_for_device(
    State(svc): State<AppState>,
    Path(device_id): Path<i64>,
) -> Result<Json<Envelope<LatestReading>>, ServiceError> {
    let reading = svc.latest_for_device(device_id)?;
    Ok(Json(Envelope::success(
        "Latest reading retrieved successfully",
        LatestReading { reading },
    )))
}
