use tracing::info;

use roadwatch_core::ServiceError;
use roadwatch_core::types::now;

use super::TelemetryService;
use crate::model::{Device, DeviceInput};

impl TelemetryService {
    pub fn create_device(&self, input: DeviceInput) -> Result<Device, ServiceError> {
        validate(&input)?;
        let device = self.store.insert_device(&input, now())?;
        info!(id = device.id, name = %device.name, "device registered");
        Ok(device)
    }

    pub fn list_devices(&self) -> Result<Vec<Device>, ServiceError> {
        self.store.list_devices()
    }

    pub fn get_device(&self, id: i64) -> Result<Device, ServiceError> {
        self.store.get_device(id)
    }

    /// Full replacement of the editable fields; returns the updated device.
    pub fn update_device(&self, id: i64, input: DeviceInput) -> Result<Device, ServiceError> {
        validate(&input)?;
        self.store.update_device(id, &input)?;
        self.store.get_device(id)
    }

    /// Remove a device together with every reading stored under its id.
    pub fn delete_device(&self, id: i64) -> Result<(), ServiceError> {
        let purged = self.store.delete_device(id)?;
        info!(id, purged_readings = purged, "device deleted");
        Ok(())
    }
}

fn validate(input: &DeviceInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::Validation("device name is required".into()));
    }
    if input.location.trim().is_empty() {
        return Err(ServiceError::Validation(
            "device location is required".into(),
        ));
    }
    if !(-90.0..=90.0).contains(&input.latitude) {
        return Err(ServiceError::Validation(
            "latitude must be between -90 and 90".into(),
        ));
    }
    if !(-180.0..=180.0).contains(&input.longitude) {
        return Err(ServiceError::Validation(
            "longitude must be between -180 and 180".into(),
        ));
    }
    Ok(())
}
