//! Latest-reading-per-device reduction.
//!
//! The dashboard map shows one marker per device, driven by that
//! device's most recent reading. The reduction is pure so the same
//! rule serves the HTTP endpoint, the CLI monitor and the tests.

use std::collections::HashMap;

use crate::model::Reading;

/// Pick the most recent reading for every device id present.
///
/// A reading wins on strictly greater `recorded_at`; on an exact tie
/// the earlier element of `readings` is kept, so feeding rows in
/// insertion order makes ties deterministic. Output is sorted by
/// device id.
pub fn latest_per_device(readings: &[Reading]) -> Vec<Reading> {
    let mut latest: HashMap<i64, &Reading> = HashMap::new();

    for r in readings {
        match latest.get(&r.device_id) {
            Some(current) if r.recorded_at <= current.recorded_at => {}
            _ => {
                latest.insert(r.device_id, r);
            }
        }
    }

    let mut out: Vec<Reading> = latest.into_values().cloned().collect();
    out.sort_by_key(|r| r.device_id);
    out
}
