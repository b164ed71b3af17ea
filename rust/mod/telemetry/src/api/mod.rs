pub mod device;
pub mod sensor;

use std::sync::Arc;

use axum::Router;

use crate::service::TelemetryService;

/// Shared application state.
pub type AppState = Arc<TelemetryService>;

/// Build the telemetry API router.
///
/// The paths are the dashboard contract and sit at the application
/// root, not under a module prefix.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(device::routes())
        .merge(sensor::routes())
        .with_state(state)
}
