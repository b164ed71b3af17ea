use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};

use roadwatch_core::ServiceError;
use roadwatch_core::types::{parse_rfc3339, to_rfc3339};
use roadwatch_sql::{Row, SQLStore, Value};

use crate::model::{Device, DeviceInput, IngestReading, Reading, SurfaceType};

/// SQL DDL for the telemetry tables.
///
/// All fields map directly to SQL columns — no JSON blob. Readings are
/// queried by column (per-device history, latest-per-device), so they
/// have to be real columns. There is deliberately no foreign key from
/// readings to devices: readings from unregistered ids are kept.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS devices (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        location    TEXT NOT NULL,
        address     TEXT,
        latitude    REAL NOT NULL,
        longitude   REAL NOT NULL,
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS readings (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        device_id        INTEGER NOT NULL,
        air_temp         REAL NOT NULL,
        humidity         REAL NOT NULL,
        surface_temp     REAL NOT NULL,
        vis_mean         REAL NOT NULL,
        nir_green_ratio  REAL NOT NULL,
        whiteness_index  REAL NOT NULL,
        surface          TEXT NOT NULL,
        recorded_at      TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_readings_device_time ON readings(device_id, recorded_at)",
];

const READING_COLUMNS: &str =
    "id, device_id, air_temp, humidity, surface_temp, vis_mean, nir_green_ratio, \
     whiteness_index, surface, recorded_at";

/// Persistent storage for devices and readings, backed by SQLStore (SQLite).
pub struct TelemetryStore {
    db: Arc<dyn SQLStore>,
}

impl TelemetryStore {
    /// Create a new TelemetryStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        for stmt in SCHEMA {
            db.exec(stmt, &[])
                .map_err(|e| ServiceError::Storage(format!("telemetry schema init: {e}")))?;
        }
        Ok(Self { db })
    }

    // -----------------------------------------------------------------------
    // Devices
    // -----------------------------------------------------------------------

    /// Insert a new device; the database assigns the id.
    pub fn insert_device(
        &self,
        input: &DeviceInput,
        created_at: DateTime<Utc>,
    ) -> Result<Device, ServiceError> {
        let id = self
            .db
            .insert(
                "INSERT INTO devices (name, location, address, latitude, longitude, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                &[
                    Value::Text(input.name.clone()),
                    Value::Text(input.location.clone()),
                    match &input.address {
                        Some(a) => Value::Text(a.clone()),
                        None => Value::Null,
                    },
                    Value::Real(input.latitude),
                    Value::Real(input.longitude),
                    Value::Text(to_rfc3339(&created_at)),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(Device {
            id,
            name: input.name.clone(),
            location: input.location.clone(),
            address: input.address.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            created_at,
        })
    }

    /// Get a device by id.
    pub fn get_device(&self, id: i64) -> Result<Device, ServiceError> {
        let rows = self
            .db
            .query(
                "SELECT * FROM devices WHERE id = ?1",
                &[Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("device {id} not found")))?;

        row_to_device(row)
    }

    /// List all devices, oldest registration first.
    pub fn list_devices(&self) -> Result<Vec<Device>, ServiceError> {
        let rows = self
            .db
            .query("SELECT * FROM devices ORDER BY id ASC", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_device).collect()
    }

    /// Replace a device's editable fields.
    pub fn update_device(&self, id: i64, input: &DeviceInput) -> Result<(), ServiceError> {
        let affected = self
            .db
            .exec(
                "UPDATE devices SET name = ?1, location = ?2, address = ?3, \
                 latitude = ?4, longitude = ?5 WHERE id = ?6",
                &[
                    Value::Text(input.name.clone()),
                    Value::Text(input.location.clone()),
                    match &input.address {
                        Some(a) => Value::Text(a.clone()),
                        None => Value::Null,
                    },
                    Value::Real(input.latitude),
                    Value::Real(input.longitude),
                    Value::Integer(id),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("device {id} not found")));
        }
        Ok(())
    }

    /// Delete a device and every reading carrying its id.
    ///
    /// The device row goes first: if the id was never registered this
    /// fails with NotFound and any orphan readings under that id stay
    /// untouched. Returns the number of readings removed.
    pub fn delete_device(&self, id: i64) -> Result<u64, ServiceError> {
        let affected = self
            .db
            .exec("DELETE FROM devices WHERE id = ?1", &[Value::Integer(id)])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("device {id} not found")));
        }

        let purged = self
            .db
            .exec(
                "DELETE FROM readings WHERE device_id = ?1",
                &[Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(purged)
    }

    /// Map of device id to display name, for labeling readings.
    pub fn device_names(&self) -> Result<HashMap<i64, String>, ServiceError> {
        let rows = self
            .db
            .query("SELECT id, name FROM devices", &[])
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in &rows {
            let id = row
                .get_i64("id")
                .ok_or_else(|| ServiceError::Storage("bad device row: missing id".into()))?;
            let name = row
                .get_str("name")
                .ok_or_else(|| ServiceError::Storage("bad device row: missing name".into()))?;
            names.insert(id, name.to_string());
        }
        Ok(names)
    }

    // -----------------------------------------------------------------------
    // Readings
    // -----------------------------------------------------------------------

    /// Insert a classified reading; the database assigns the id.
    ///
    /// `recorded_at` is stored at millisecond precision and the
    /// returned Reading carries the stored value.
    pub fn insert_reading(
        &self,
        req: &IngestReading,
        surface: SurfaceType,
        recorded_at: DateTime<Utc>,
    ) -> Result<Reading, ServiceError> {
        let recorded_at = recorded_at.trunc_subsecs(3);

        let id = self
            .db
            .insert(
                "INSERT INTO readings (device_id, air_temp, humidity, surface_temp, vis_mean, \
                 nir_green_ratio, whiteness_index, surface, recorded_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                &[
                    Value::Integer(req.device_id),
                    Value::Real(req.air_temp),
                    Value::Real(req.humidity),
                    Value::Real(req.surface_temp),
                    Value::Real(req.vis_mean),
                    Value::Real(req.nir_green_ratio),
                    Value::Real(req.whiteness_index),
                    Value::Text(surface.as_str().to_string()),
                    Value::Text(to_rfc3339(&recorded_at)),
                ],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        Ok(Reading {
            id,
            device_id: req.device_id,
            air_temp: req.air_temp,
            humidity: req.humidity,
            surface_temp: req.surface_temp,
            vis_mean: req.vis_mean,
            nir_green_ratio: req.nir_green_ratio,
            whiteness_index: req.whiteness_index,
            surface,
            recorded_at,
        })
    }

    /// Newest-first readings, optionally restricted to one device.
    pub fn list_readings(
        &self,
        device_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Reading>, ServiceError> {
        let (sql, params): (String, Vec<Value>) = match device_id {
            Some(d) => (
                format!(
                    "SELECT {READING_COLUMNS} FROM readings WHERE device_id = ?1 \
                     ORDER BY recorded_at DESC, id DESC LIMIT ?2"
                ),
                vec![Value::Integer(d), Value::Integer(limit as i64)],
            ),
            None => (
                format!(
                    "SELECT {READING_COLUMNS} FROM readings \
                     ORDER BY recorded_at DESC, id DESC LIMIT ?1"
                ),
                vec![Value::Integer(limit as i64)],
            ),
        };

        let rows = self
            .db
            .query(&sql, &params)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_reading).collect()
    }

    /// Every reading in insertion order (id ascending).
    ///
    /// Feeds the latest-per-device reduction, whose tie rule is
    /// "first seen wins" — insertion order is what makes that
    /// deterministic.
    pub fn all_readings(&self) -> Result<Vec<Reading>, ServiceError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {READING_COLUMNS} FROM readings ORDER BY id ASC"),
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_reading).collect()
    }

    /// Most recent reading for one device, if it ever reported.
    ///
    /// Ties on `recorded_at` resolve to the smallest id — the same
    /// winner the in-memory reduction picks.
    pub fn latest_for_device(&self, device_id: i64) -> Result<Option<Reading>, ServiceError> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {READING_COLUMNS} FROM readings WHERE device_id = ?1 \
                     ORDER BY recorded_at DESC, id ASC LIMIT 1"
                ),
                &[Value::Integer(device_id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.first().map(row_to_reading).transpose()
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn missing(entity: &str, col: &str) -> ServiceError {
    ServiceError::Storage(format!("bad {entity} row: missing {col}"))
}

fn row_to_device(row: &Row) -> Result<Device, ServiceError> {
    let created_at = row
        .get_str("created_at")
        .ok_or_else(|| missing("device", "created_at"))?;

    Ok(Device {
        id: row.get_i64("id").ok_or_else(|| missing("device", "id"))?,
        name: row
            .get_str("name")
            .ok_or_else(|| missing("device", "name"))?
            .to_string(),
        location: row
            .get_str("location")
            .ok_or_else(|| missing("device", "location"))?
            .to_string(),
        address: row.get_str("address").map(str::to_string),
        latitude: row
            .get_f64("latitude")
            .ok_or_else(|| missing("device", "latitude"))?,
        longitude: row
            .get_f64("longitude")
            .ok_or_else(|| missing("device", "longitude"))?,
        created_at: parse_rfc3339(created_at)
            .map_err(|e| ServiceError::Storage(format!("bad device created_at: {e}")))?,
    })
}

fn row_to_reading(row: &Row) -> Result<Reading, ServiceError> {
    let surface = row
        .get_str("surface")
        .ok_or_else(|| missing("reading", "surface"))?;
    let recorded_at = row
        .get_str("recorded_at")
        .ok_or_else(|| missing("reading", "recorded_at"))?;

    Ok(Reading {
        id: row.get_i64("id").ok_or_else(|| missing("reading", "id"))?,
        device_id: row
            .get_i64("device_id")
            .ok_or_else(|| missing("reading", "device_id"))?,
        air_temp: row
            .get_f64("air_temp")
            .ok_or_else(|| missing("reading", "air_temp"))?,
        humidity: row
            .get_f64("humidity")
            .ok_or_else(|| missing("reading", "humidity"))?,
        surface_temp: row
            .get_f64("surface_temp")
            .ok_or_else(|| missing("reading", "surface_temp"))?,
        vis_mean: row
            .get_f64("vis_mean")
            .ok_or_else(|| missing("reading", "vis_mean"))?,
        nir_green_ratio: row
            .get_f64("nir_green_ratio")
            .ok_or_else(|| missing("reading", "nir_green_ratio"))?,
        whiteness_index: row
            .get_f64("whiteness_index")
            .ok_or_else(|| missing("reading", "whiteness_index"))?,
        surface: SurfaceType::from_str(surface)
            .ok_or_else(|| ServiceError::Storage(format!("bad surface label {surface:?}")))?,
        recorded_at: parse_rfc3339(recorded_at)
            .map_err(|e| ServiceError::Storage(format!("bad reading recorded_at: {e}")))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadwatch_core::types::now;
    use roadwatch_sql::SqliteStore;

    fn test_store() -> TelemetryStore {
        let db = Arc::new(SqliteStore::open_in_memory().unwrap());
        TelemetryStore::new(db).unwrap()
    }

    fn device_input(name: &str) -> DeviceInput {
        DeviceInput {
            name: name.into(),
            location: "E75 bridge".into(),
            address: None,
            latitude: 60.1699,
            longitude: 24.9384,
        }
    }

    fn ingest(device_id: i64, surface_temp: f64, vis_mean: f64) -> IngestReading {
        IngestReading {
            device_id,
            air_temp: 2.5,
            humidity: 81.0,
            surface_temp,
            vis_mean,
            nir_green_ratio: 0.42,
            whiteness_index: 11.3,
            recorded_at: None,
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        parse_rfc3339(s).unwrap()
    }

    #[test]
    fn insert_and_get_device() {
        let store = test_store();
        let created = store
            .insert_device(&device_input("Bridge North"), now())
            .unwrap();
        assert_eq!(created.id, 1);

        let got = store.get_device(created.id).unwrap();
        assert_eq!(got, created);
    }

    #[test]
    fn address_roundtrips_through_null() {
        let store = test_store();
        let mut input = device_input("Bridge North");
        let plain = store.insert_device(&input, now()).unwrap();
        assert_eq!(store.get_device(plain.id).unwrap().address, None);

        input.address = Some("Tie Street 8".into());
        let with_addr = store.insert_device(&input, now()).unwrap();
        assert_eq!(
            store.get_device(with_addr.id).unwrap().address.as_deref(),
            Some("Tie Street 8")
        );
    }

    #[test]
    fn ids_are_assigned_in_sequence() {
        let store = test_store();
        let a = store.insert_device(&device_input("a"), now()).unwrap();
        let b = store.insert_device(&device_input("b"), now()).unwrap();
        assert_eq!(b.id, a.id + 1);

        let all = store.list_devices().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "a");
        assert_eq!(all[1].name, "b");
    }

    #[test]
    fn update_replaces_fields() {
        let store = test_store();
        let d = store.insert_device(&device_input("old"), now()).unwrap();

        let mut input = device_input("new");
        input.latitude = 61.0;
        store.update_device(d.id, &input).unwrap();

        let got = store.get_device(d.id).unwrap();
        assert_eq!(got.name, "new");
        assert_eq!(got.latitude, 61.0);
        // Registration time survives updates.
        assert_eq!(got.created_at, d.created_at);
    }

    #[test]
    fn update_of_missing_device_is_not_found() {
        let store = test_store();
        let err = store.update_device(42, &device_input("x")).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn reading_roundtrips_classification_and_time() {
        let store = test_store();
        let at = ts("2026-01-07T06:30:00.250Z");
        let stored = store
            .insert_reading(&ingest(16, 4.0, 11.3), SurfaceType::Ice, at)
            .unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(stored.recorded_at, at);

        let rows = store.list_readings(Some(16), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], stored);
        assert_eq!(rows[0].surface, SurfaceType::Ice);
    }

    #[test]
    fn orphan_readings_are_stored() {
        let store = test_store();
        // No device registered under id 99.
        store
            .insert_reading(&ingest(99, 5.0, 10.0), SurfaceType::Ice, now())
            .unwrap();
        assert_eq!(store.list_readings(Some(99), 10).unwrap().len(), 1);
    }

    #[test]
    fn list_is_newest_first_and_capped() {
        let store = test_store();
        for t in ["06:00", "08:00", "07:00"] {
            store
                .insert_reading(
                    &ingest(1, 10.0, 1.0),
                    SurfaceType::Asphalt,
                    ts(&format!("2026-01-07T{t}:00Z")),
                )
                .unwrap();
        }

        let rows = store.list_readings(None, 2).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].recorded_at > rows[1].recorded_at);
        assert_eq!(to_rfc3339(&rows[0].recorded_at), "2026-01-07T08:00:00.000Z");
    }

    #[test]
    fn list_filters_by_device() {
        let store = test_store();
        store
            .insert_reading(&ingest(1, 10.0, 1.0), SurfaceType::Asphalt, now())
            .unwrap();
        store
            .insert_reading(&ingest(2, 10.0, 1.0), SurfaceType::Asphalt, now())
            .unwrap();

        let rows = store.list_readings(Some(2), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].device_id, 2);
    }

    #[test]
    fn latest_for_device_picks_max_recorded_at() {
        let store = test_store();
        store
            .insert_reading(&ingest(1, 5.0, 10.0), SurfaceType::Ice, ts("2026-01-07T06:00:00Z"))
            .unwrap();
        store
            .insert_reading(&ingest(1, 10.0, 1.0), SurfaceType::Asphalt, ts("2026-01-07T07:00:00Z"))
            .unwrap();

        let latest = store.latest_for_device(1).unwrap().unwrap();
        assert_eq!(latest.surface, SurfaceType::Asphalt);
        assert!(store.latest_for_device(2).unwrap().is_none());
    }

    #[test]
    fn latest_tie_resolves_to_first_inserted() {
        let store = test_store();
        let at = ts("2026-01-07T06:00:00Z");
        let first = store
            .insert_reading(&ingest(1, 5.0, 10.0), SurfaceType::Ice, at)
            .unwrap();
        store
            .insert_reading(&ingest(1, 10.0, 1.0), SurfaceType::Asphalt, at)
            .unwrap();

        let latest = store.latest_for_device(1).unwrap().unwrap();
        assert_eq!(latest.id, first.id);
    }

    #[test]
    fn delete_cascades_to_exactly_that_devices_readings() {
        let store = test_store();
        let keep = store.insert_device(&device_input("keep"), now()).unwrap();
        let gone = store.insert_device(&device_input("gone"), now()).unwrap();

        for _ in 0..3 {
            store
                .insert_reading(&ingest(gone.id, 5.0, 10.0), SurfaceType::Ice, now())
                .unwrap();
        }
        store
            .insert_reading(&ingest(keep.id, 10.0, 1.0), SurfaceType::Asphalt, now())
            .unwrap();
        // Orphan under an unregistered id.
        store
            .insert_reading(&ingest(99, 5.0, 25.0), SurfaceType::Snow, now())
            .unwrap();

        let purged = store.delete_device(gone.id).unwrap();
        assert_eq!(purged, 3);

        assert!(matches!(
            store.get_device(gone.id).unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert_eq!(store.list_readings(Some(gone.id), 10).unwrap().len(), 0);
        assert_eq!(store.list_readings(Some(keep.id), 10).unwrap().len(), 1);
        assert_eq!(store.list_readings(Some(99), 10).unwrap().len(), 1);
    }

    #[test]
    fn delete_of_missing_device_leaves_orphans_alone() {
        let store = test_store();
        store
            .insert_reading(&ingest(99, 5.0, 10.0), SurfaceType::Ice, now())
            .unwrap();

        let err = store.delete_device(99).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        // The orphan reading under id 99 is still there.
        assert_eq!(store.list_readings(Some(99), 10).unwrap().len(), 1);
    }

    #[test]
    fn all_readings_come_back_in_insertion_order() {
        let store = test_store();
        store
            .insert_reading(&ingest(2, 5.0, 10.0), SurfaceType::Ice, ts("2026-01-07T08:00:00Z"))
            .unwrap();
        store
            .insert_reading(&ingest(1, 10.0, 1.0), SurfaceType::Asphalt, ts("2026-01-07T06:00:00Z"))
            .unwrap();

        let all = store.all_readings().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[1].id, 2);
    }

    #[test]
    fn device_names_maps_all_registered() {
        let store = test_store();
        let a = store.insert_device(&device_input("North"), now()).unwrap();
        let b = store.insert_device(&device_input("South"), now()).unwrap();

        let names = store.device_names().unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[&a.id], "North");
        assert_eq!(names[&b.id], "South");
    }
}
