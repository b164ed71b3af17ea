use std::collections::HashMap;

use tracing::debug;

use roadwatch_core::ServiceError;
use roadwatch_core::types::now;

use super::TelemetryService;
use crate::aggregate::latest_per_device;
use crate::classify::classify_surface;
use crate::model::{IngestReading, Reading, ReadingQuery, ReadingView};

/// Name shown for readings whose device id was never registered.
pub const UNREGISTERED_LABEL: &str = "(Unregistered Device)";

/// Rows returned when the history query names no limit.
const DEFAULT_HISTORY_LIMIT: u32 = 500;
/// Hard row cap for one history request.
const MAX_HISTORY_LIMIT: u32 = 2000;

impl TelemetryService {
    /// Classify and persist one reading.
    ///
    /// Ingestion never checks the device id against the registry —
    /// a sensor flashed before its station is registered must not
    /// lose data. Readings with no client timestamp get the server's
    /// receive time.
    pub fn ingest(&self, req: IngestReading) -> Result<Reading, ServiceError> {
        let recorded_at = req.recorded_at.unwrap_or_else(now);
        let surface = classify_surface(req.surface_temp, req.vis_mean);
        let reading = self.store.insert_reading(&req, surface, recorded_at)?;
        debug!(
            device_id = reading.device_id,
            surface = %reading.surface,
            "reading stored"
        );
        Ok(reading)
    }

    /// Newest-first history, labeled with device names.
    pub fn history(&self, query: &ReadingQuery) -> Result<Vec<ReadingView>, ServiceError> {
        let limit = query
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT);
        let rows = self.store.list_readings(query.device_id, limit)?;
        let names = self.store.device_names()?;
        Ok(label(rows, &names))
    }

    /// Most recent reading of one device.
    pub fn latest_for_device(&self, device_id: i64) -> Result<ReadingView, ServiceError> {
        let reading = self
            .store
            .latest_for_device(device_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("no readings for device {device_id}")))?;
        let names = self.store.device_names()?;
        Ok(label_one(reading, &names))
    }

    /// Most recent reading of every device that ever reported — the
    /// set the dashboard map draws its markers from.
    pub fn latest_readings(&self) -> Result<Vec<ReadingView>, ServiceError> {
        let all = self.store.all_readings()?;
        let latest = latest_per_device(&all);
        let names = self.store.device_names()?;
        Ok(label(latest, &names))
    }
}

fn label(readings: Vec<Reading>, names: &HashMap<i64, String>) -> Vec<ReadingView> {
    readings
        .into_iter()
        .map(|r| label_one(r, names))
        .collect()
}

fn label_one(reading: Reading, names: &HashMap<i64, String>) -> ReadingView {
    let device_name = names
        .get(&reading.device_id)
        .cloned()
        .unwrap_or_else(|| UNREGISTERED_LABEL.to_string());
    ReadingView {
        reading,
        device_name,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{DeviceInput, SurfaceType};
    use roadwatch_core::types::parse_rfc3339;
    use roadwatch_sql::SqliteStore;

    fn service() -> TelemetryService {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        TelemetryService::new(db).unwrap()
    }

    fn register(svc: &TelemetryService, name: &str) -> i64 {
        svc.create_device(DeviceInput {
            name: name.into(),
            location: "E75".into(),
            address: None,
            latitude: 60.0,
            longitude: 24.0,
        })
        .unwrap()
        .id
    }

    fn ingest_at(device_id: i64, surface_temp: f64, vis_mean: f64, at: &str) -> IngestReading {
        IngestReading {
            device_id,
            air_temp: 1.0,
            humidity: 80.0,
            surface_temp,
            vis_mean,
            nir_green_ratio: 0.4,
            whiteness_index: 11.3,
            recorded_at: Some(parse_rfc3339(at).unwrap()),
        }
    }

    #[test]
    fn ingest_classifies_before_storing() {
        let svc = service();
        let id = register(&svc, "Bridge North");

        let ice = svc
            .ingest(ingest_at(id, 5.0, 10.0, "2026-01-07T06:00:00Z"))
            .unwrap();
        assert_eq!(ice.surface, SurfaceType::Ice);

        let snow = svc
            .ingest(ingest_at(id, 5.0, 25.0, "2026-01-07T06:01:00Z"))
            .unwrap();
        assert_eq!(snow.surface, SurfaceType::Snow);

        let asphalt = svc
            .ingest(ingest_at(id, 10.0, 10.0, "2026-01-07T06:02:00Z"))
            .unwrap();
        assert_eq!(asphalt.surface, SurfaceType::Asphalt);
    }

    #[test]
    fn missing_timestamp_gets_server_time() {
        let svc = service();
        let before = now();
        let stored = svc
            .ingest(IngestReading {
                recorded_at: None,
                ..ingest_at(1, 10.0, 1.0, "2026-01-07T06:00:00Z")
            })
            .unwrap();
        assert!(stored.recorded_at >= before);
    }

    #[test]
    fn history_labels_registered_and_orphan_readings() {
        let svc = service();
        let id = register(&svc, "Bridge North");
        svc.ingest(ingest_at(id, 5.0, 10.0, "2026-01-07T06:00:00Z"))
            .unwrap();
        svc.ingest(ingest_at(999, 5.0, 10.0, "2026-01-07T06:01:00Z"))
            .unwrap();

        let rows = svc.history(&ReadingQuery::default()).unwrap();
        assert_eq!(rows.len(), 2);
        // Newest first: the orphan was recorded later.
        assert_eq!(rows[0].device_name, UNREGISTERED_LABEL);
        assert_eq!(rows[1].device_name, "Bridge North");
    }

    #[test]
    fn history_filter_restricts_to_one_device() {
        let svc = service();
        let a = register(&svc, "A");
        let b = register(&svc, "B");
        svc.ingest(ingest_at(a, 10.0, 1.0, "2026-01-07T06:00:00Z"))
            .unwrap();
        svc.ingest(ingest_at(b, 10.0, 1.0, "2026-01-07T06:01:00Z"))
            .unwrap();

        let rows = svc
            .history(&ReadingQuery {
                device_id: Some(b),
                limit: None,
            })
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reading.device_id, b);
    }

    #[test]
    fn latest_readings_gives_one_row_per_device() {
        let svc = service();
        let a = register(&svc, "A");
        let b = register(&svc, "B");
        svc.ingest(ingest_at(a, 5.0, 10.0, "2026-01-07T06:00:00Z"))
            .unwrap();
        svc.ingest(ingest_at(a, 10.0, 1.0, "2026-01-07T07:00:00Z"))
            .unwrap();
        svc.ingest(ingest_at(b, 5.0, 25.0, "2026-01-07T06:30:00Z"))
            .unwrap();

        let latest = svc.latest_readings().unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].reading.device_id, a);
        assert_eq!(latest[0].reading.surface, SurfaceType::Asphalt);
        assert_eq!(latest[1].reading.device_id, b);
        assert_eq!(latest[1].reading.surface, SurfaceType::Snow);
    }

    #[test]
    fn latest_for_device_without_readings_is_not_found() {
        let svc = service();
        let id = register(&svc, "quiet");
        let err = svc.latest_for_device(id).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
