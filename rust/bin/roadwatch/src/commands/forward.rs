//! `roadwatch forward` — LoRa gateway forwarder.
//!
//! Reads `+RCV=` frames line-wise from stdin (the LoRa module's UART,
//! usually piped in via a serial cat) and POSTs each decoded payload
//! to `/sensor/add`. Non-frame lines and malformed frames are skipped;
//! the forwarder never stops over one bad transmission.

use std::io::BufRead;

use anyhow::Result;

use roadwatch_telemetry::lora::{FrameError, parse_rcv};

use super::resource::{base_url, check_envelope, current_context};

/// Forward frames from stdin until EOF.
pub fn forward(device_id: i64, client_config_path: &std::path::Path) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;
    let url = format!("{base}/sensor/add");

    let client = reqwest::blocking::Client::new();
    let stdin = std::io::stdin();

    println!(
        "Forwarding frames for device {} to \"{}\".",
        device_id, ctx.name
    );

    let mut forwarded: u64 = 0;
    let mut skipped: u64 = 0;

    for line in stdin.lock().lines() {
        let line = line?;

        let frame = match parse_rcv(&line) {
            Ok(frame) => frame,
            // Module echoes and AT responses are expected noise.
            Err(FrameError::NotRcv) => continue,
            Err(e) => {
                eprintln!("skipping bad frame: {e}");
                skipped += 1;
                continue;
            }
        };

        let req = frame.report.into_ingest(device_id);
        match client.post(&url).json(&req).send() {
            Ok(resp) => match resp.json::<serde_json::Value>() {
                Ok(body) if check_envelope(&body).is_ok() => {
                    forwarded += 1;
                    println!(
                        "forwarded reading (rssi {} dBm, surface {})",
                        frame.rssi,
                        body["reading"]["surface"].as_str().unwrap_or("?")
                    );
                }
                Ok(body) => {
                    skipped += 1;
                    eprintln!(
                        "server rejected reading: {}",
                        body["message"].as_str().unwrap_or("unknown error")
                    );
                }
                Err(e) => {
                    skipped += 1;
                    eprintln!("bad server response: {e}");
                }
            },
            Err(e) => {
                skipped += 1;
                eprintln!("post failed: {e}");
            }
        }
    }

    println!("Done: {} forwarded, {} skipped.", forwarded, skipped);
    Ok(())
}
