pub mod device;
pub mod reading;

pub use reading::UNREGISTERED_LABEL;

use std::sync::Arc;

use roadwatch_core::ServiceError;
use roadwatch_sql::SQLStore;

use crate::store::TelemetryStore;

/// Telemetry service — business logic over the device and reading tables.
pub struct TelemetryService {
    pub(crate) store: TelemetryStore,
}

impl TelemetryService {
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        Ok(Self {
            store: TelemetryStore::new(db)?,
        })
    }
}
