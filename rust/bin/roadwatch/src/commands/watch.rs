//! `roadwatch watch` — headless route hazard monitor.
//!
//! Polls `/sensor/latest` on a fixed interval, restricts the result to
//! the stations on the route, and runs the same condition/prompt logic
//! the dashboard map runs. Which devices are "on the route" is the
//! caller's call — the corridor geometry lives in the maps layer, not
//! here — so the route is given as an explicit device id list.

use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Deserialize;

use roadwatch_telemetry::hazard::{ReroutePrompter, RouteCondition, route_condition};
use roadwatch_telemetry::model::ReadingView;

use super::resource::{base_url, current_context};

#[derive(Deserialize)]
struct LatestResponse {
    status: String,
    message: String,
    #[serde(default)]
    readings: Vec<ReadingView>,
}

/// Parse "1,4,16" into device ids.
pub fn parse_device_list(raw: &str) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id: i64 = part
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid device id: {:?}", part))?;
        ids.push(id);
    }
    if ids.is_empty() {
        anyhow::bail!("No device ids given.");
    }
    Ok(ids)
}

/// Poll the route until interrupted (or once, with `--once`).
pub fn watch(
    device_ids: &[i64],
    interval: Duration,
    cooldown: Duration,
    once: bool,
    client_config_path: &std::path::Path,
) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;
    let url = format!("{base}/sensor/latest");

    let client = reqwest::blocking::Client::new();
    let mut prompter = ReroutePrompter::new(cooldown);

    println!(
        "Watching devices {:?} on \"{}\" every {}s.",
        device_ids,
        ctx.name,
        interval.as_secs()
    );

    loop {
        match poll_once(&client, &url, device_ids) {
            Ok(on_route) => {
                let surfaces: Vec<_> = on_route.iter().map(|r| r.reading.surface).collect();
                let condition = route_condition(&surfaces);
                report(&on_route, condition);
                if prompter.observe(condition, Instant::now()) {
                    println!(">>> Hazard on route — consider rerouting. <<<");
                }
            }
            // Poll failures are transient; keep the timer running.
            Err(e) => eprintln!("poll failed: {e}"),
        }

        if once {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}

fn poll_once(
    client: &reqwest::blocking::Client,
    url: &str,
    device_ids: &[i64],
) -> Result<Vec<ReadingView>> {
    let resp: LatestResponse = client.get(url).send()?.json()?;
    if resp.status != "success" {
        anyhow::bail!("server error: {}", resp.message);
    }
    Ok(resp
        .readings
        .into_iter()
        .filter(|r| device_ids.contains(&r.reading.device_id))
        .collect())
}

fn report(on_route: &[ReadingView], condition: RouteCondition) {
    let summary: Vec<String> = on_route
        .iter()
        .map(|r| {
            format!(
                "{}={}",
                r.device_name, r.reading.surface
            )
        })
        .collect();
    println!(
        "[{}] route {} ({})",
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
        condition,
        if summary.is_empty() {
            "no reports".to_string()
        } else {
            summary.join(", ")
        }
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_list_parses_with_spaces() {
        assert_eq!(parse_device_list("1,4,16").unwrap(), vec![1, 4, 16]);
        assert_eq!(parse_device_list(" 7 , 9 ").unwrap(), vec![7, 9]);
    }

    #[test]
    fn empty_and_garbage_lists_are_rejected() {
        assert!(parse_device_list("").is_err());
        assert!(parse_device_list(" , ").is_err());
        assert!(parse_device_list("1,two").is_err());
    }

    #[test]
    fn latest_response_deserializes_views() {
        let raw = r#"{
            "status": "success",
            "message": "Latest readings retrieved successfully",
            "readings": [{
                "id": 1, "deviceId": 16,
                "airTemp": 1.0, "humidity": 80.0, "surfaceTemp": 4.0,
                "visMean": 6.0, "nirGreenRatio": 0.42, "whitenessIndex": 11.3,
                "surface": "Ice", "recordedAt": "2026-01-07T06:30:00Z",
                "deviceName": "Bridge North"
            }]
        }"#;
        let resp: LatestResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.status, "success");
        assert_eq!(resp.readings.len(), 1);
        assert_eq!(resp.readings[0].device_name, "Bridge North");
        assert_eq!(
            resp.readings[0].reading.surface,
            roadwatch_telemetry::model::SurfaceType::Ice
        );
    }
}
