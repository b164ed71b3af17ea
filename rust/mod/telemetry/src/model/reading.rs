use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SurfaceType
// ---------------------------------------------------------------------------

/// Road surface classification attached to every stored reading.
///
/// The variant names are the wire strings — the dashboard matches on
/// `"Ice"` / `"Snow"` / `"Asphalt"` to pick marker colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceType {
    Ice,
    Snow,
    Asphalt,
}

impl SurfaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ice => "Ice",
            Self::Snow => "Snow",
            Self::Asphalt => "Asphalt",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Ice" => Some(Self::Ice),
            "Snow" => Some(Self::Snow),
            "Asphalt" => Some(Self::Asphalt),
            _ => None,
        }
    }

    /// Ice and snow are the conditions the dashboard warns about.
    pub fn is_hazardous(&self) -> bool {
        matches!(self, Self::Ice | Self::Snow)
    }
}

impl std::fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reading — maps 1:1 to SQL columns
// ---------------------------------------------------------------------------

/// One stored sensor reading, classification included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: i64,

    /// Id the sensor node stamped on the reading. Not a foreign key:
    /// readings from ids that were never registered are stored too.
    pub device_id: i64,

    /// Ambient air temperature, °C.
    pub air_temp: f64,
    /// Relative humidity, %.
    pub humidity: f64,
    /// Road surface temperature, °C (IR, non-contact).
    pub surface_temp: f64,
    /// Mean visible-band reflectance.
    pub vis_mean: f64,
    /// Near-infrared to green reflectance ratio.
    pub nir_green_ratio: f64,
    /// Whiteness index derived from the optical channels.
    pub whiteness_index: f64,

    /// Server-side classification of `surface_temp` + `vis_mean`.
    pub surface: SurfaceType,

    pub recorded_at: DateTime<Utc>,
}

/// Body of `POST /sensor/add`.
///
/// The serde aliases accept the deployed firmware's JSON keys
/// (`DeviceID`, `AirTemp`, `VIS_Mean`, ...) alongside the camelCase
/// names the dashboard uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReading {
    #[serde(alias = "DeviceID")]
    pub device_id: i64,
    #[serde(alias = "AirTemp")]
    pub air_temp: f64,
    #[serde(alias = "Humidity")]
    pub humidity: f64,
    #[serde(alias = "SurfaceTemp")]
    pub surface_temp: f64,
    #[serde(alias = "VIS_Mean")]
    pub vis_mean: f64,
    #[serde(alias = "NIR_Green_Ratio")]
    pub nir_green_ratio: f64,
    #[serde(alias = "WhitenessIndex")]
    pub whiteness_index: f64,

    /// When absent the server stamps its own receive time.
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// Query string of `GET /sensor/all`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingQuery {
    /// Restrict to one device id.
    pub device_id: Option<i64>,
    /// Newest-first row cap; the server default applies when absent.
    pub limit: Option<u32>,
}

/// A reading joined with the name of the device that produced it.
///
/// Readings from unregistered ids get the fixed placeholder label so
/// the dashboard can render them without a device lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingView {
    #[serde(flatten)]
    pub reading: Reading,
    pub device_name: String,
}
