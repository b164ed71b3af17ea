//! RYLR LoRa receive-frame parsing.
//!
//! The field gateway reads lines like
//!
//! ```text
//! +RCV=1,28,21.4,55.0,4.0,6.0,0.42,11.30,-42,11
//! ```
//!
//! from the radio's UART: source address, payload byte length, the
//! payload itself, then RSSI and SNR. The payload is the sensor's
//! six-value CSV and contains commas, so the trailing RSSI and SNR are
//! peeled off positionally and everything between stays payload.

use thiserror::Error;

use crate::model::IngestReading;

/// Values in one sensor CSV payload.
pub const PAYLOAD_FIELDS: usize = 6;

const RCV_PREFIX: &str = "+RCV=";

#[derive(Error, Debug, PartialEq)]
pub enum FrameError {
    #[error("not a +RCV frame")]
    NotRcv,

    #[error("frame has {0} comma-separated fields, need at least 5")]
    TooFewFields(usize),

    #[error("payload has {0} values, expected {PAYLOAD_FIELDS}")]
    BadPayload(usize),

    #[error("bad {field} value {value:?}")]
    BadNumber { field: &'static str, value: String },
}

/// One decoded sensor transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct RcvFrame {
    /// LoRa address of the sending node.
    pub address: u32,
    /// Receive signal strength, dBm.
    pub rssi: i32,
    /// Signal-to-noise ratio, dB.
    pub snr: i32,
    pub report: SensorReport,
}

/// The six measurements a sensor node transmits, in payload order.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReport {
    pub air_temp: f64,
    pub humidity: f64,
    pub surface_temp: f64,
    pub vis_mean: f64,
    pub nir_green_ratio: f64,
    pub whiteness_index: f64,
}

impl SensorReport {
    /// Wrap the report into an ingest request for the given device id.
    ///
    /// The radio frame does not carry the device id; the gateway knows
    /// which node it listens to.
    pub fn into_ingest(self, device_id: i64) -> IngestReading {
        IngestReading {
            device_id,
            air_temp: self.air_temp,
            humidity: self.humidity,
            surface_temp: self.surface_temp,
            vis_mean: self.vis_mean,
            nir_green_ratio: self.nir_green_ratio,
            whiteness_index: self.whiteness_index,
            recorded_at: None,
        }
    }
}

/// Parse one UART line into a frame.
///
/// Lines that are not `+RCV=` frames (module echoes, `+OK`, noise)
/// come back as [`FrameError::NotRcv`] so callers can skip them
/// without logging an error.
pub fn parse_rcv(line: &str) -> Result<RcvFrame, FrameError> {
    let line = line.trim();
    let rest = line.strip_prefix(RCV_PREFIX).ok_or(FrameError::NotRcv)?;

    let parts: Vec<&str> = rest.split(',').collect();
    // address, length, >=1 payload value, rssi, snr
    if parts.len() < 5 {
        return Err(FrameError::TooFewFields(parts.len()));
    }

    let address = parse_num::<u32>("address", parts[0])?;
    let rssi = parse_num::<i32>("rssi", parts[parts.len() - 2])?;
    let snr = parse_num::<i32>("snr", parts[parts.len() - 1])?;

    // The byte-length field (parts[1]) is not trusted; the payload is
    // whatever sits between it and the two trailing radio fields.
    let payload = &parts[2..parts.len() - 2];
    if payload.len() != PAYLOAD_FIELDS {
        return Err(FrameError::BadPayload(payload.len()));
    }

    let report = SensorReport {
        air_temp: parse_num("airTemp", payload[0])?,
        humidity: parse_num("humidity", payload[1])?,
        surface_temp: parse_num("surfaceTemp", payload[2])?,
        vis_mean: parse_num("visMean", payload[3])?,
        nir_green_ratio: parse_num("nirGreenRatio", payload[4])?,
        whiteness_index: parse_num("whitenessIndex", payload[5])?,
    };

    Ok(RcvFrame {
        address,
        rssi,
        snr,
        report,
    })
}

fn parse_num<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, FrameError> {
    raw.trim().parse::<T>().map_err(|_| FrameError::BadNumber {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: &str = "+RCV=1,28,21.4,55.0,4.0,6.0,0.42,11.30,-42,11";

    #[test]
    fn parses_a_complete_frame() {
        let frame = parse_rcv(FRAME).unwrap();
        assert_eq!(frame.address, 1);
        assert_eq!(frame.rssi, -42);
        assert_eq!(frame.snr, 11);
        assert_eq!(frame.report.air_temp, 21.4);
        assert_eq!(frame.report.humidity, 55.0);
        assert_eq!(frame.report.surface_temp, 4.0);
        assert_eq!(frame.report.vis_mean, 6.0);
        assert_eq!(frame.report.nir_green_ratio, 0.42);
        assert_eq!(frame.report.whiteness_index, 11.3);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let frame = parse_rcv(&format!("  {FRAME}\r\n")).unwrap();
        assert_eq!(frame.address, 1);
    }

    #[test]
    fn non_rcv_lines_are_not_frames() {
        assert_eq!(parse_rcv("+OK"), Err(FrameError::NotRcv));
        assert_eq!(parse_rcv("AT+ADDRESS=2"), Err(FrameError::NotRcv));
        assert_eq!(parse_rcv(""), Err(FrameError::NotRcv));
    }

    #[test]
    fn short_payload_is_rejected() {
        assert_eq!(
            parse_rcv("+RCV=1,10,21.4,55.0,-42,11"),
            Err(FrameError::BadPayload(2))
        );
    }

    #[test]
    fn truncated_frame_is_rejected() {
        assert_eq!(parse_rcv("+RCV=1,28,21.4"), Err(FrameError::TooFewFields(3)));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        let err = parse_rcv("+RCV=1,28,21.4,fifty,4.0,6.0,0.42,11.30,-42,11").unwrap_err();
        assert_eq!(
            err,
            FrameError::BadNumber {
                field: "humidity",
                value: "fifty".into()
            }
        );
    }

    #[test]
    fn report_converts_to_ingest_request() {
        let frame = parse_rcv(FRAME).unwrap();
        let req = frame.report.into_ingest(16);
        assert_eq!(req.device_id, 16);
        assert_eq!(req.surface_temp, 4.0);
        assert_eq!(req.recorded_at, None);
    }
}
