pub mod aggregate;
pub mod api;
pub mod classify;
pub mod hazard;
pub mod lora;
pub mod model;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;

use roadwatch_core::{Module, ServiceError};
use roadwatch_sql::SQLStore;

use service::TelemetryService;

/// Telemetry module — device registry, reading ingestion and queries.
pub struct TelemetryModule {
    service: Arc<TelemetryService>,
}

impl TelemetryModule {
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        Ok(Self {
            service: Arc::new(TelemetryService::new(db)?),
        })
    }
}

impl Module for TelemetryModule {
    fn name(&self) -> &str {
        "telemetry"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
