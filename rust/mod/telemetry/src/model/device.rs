use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered roadside sensor station.
///
/// `id` is assigned by the database; the deployed sensor nodes are
/// flashed with it and stamp it on every reading they transmit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i64,

    /// Display name shown on the dashboard map.
    pub name: String,

    /// Human-readable placement, e.g. "E75 bridge, northbound".
    pub location: String,

    /// Street address, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub latitude: f64,
    pub longitude: f64,

    pub created_at: DateTime<Utc>,
}

/// Fields a client supplies when registering or updating a device.
///
/// Updates are full replacements — the dashboard form always submits
/// every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInput {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}
