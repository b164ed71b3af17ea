//! Resource commands against the roadwatchd REST API.
//!
//! `roadwatch get devices`, `roadwatch create reading`, etc.
//! The API paths are the fixed dashboard contract, and every response
//! is an HTTP 200 `{status, message, ...}` envelope — outcome is read
//! from the `status` field, never from the HTTP status code.

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Load the current context, failing with a hint when none is set.
pub fn current_context(client_config_path: &std::path::Path) -> Result<Context> {
    let config = ClientConfig::load(client_config_path)?;
    config
        .current()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `roadwatch use context <name>`."))
}

/// The context's server URL without a trailing slash.
pub fn base_url(ctx: &Context) -> Result<String> {
    if ctx.server.is_empty() {
        anyhow::bail!(
            "No server URL set for context \"{}\". Run `roadwatch context set {} --server <url>`.",
            ctx.name,
            ctx.name
        );
    }
    Ok(ctx.server.trim_end_matches('/').to_string())
}

/// Parse a response body and fail on an error envelope.
///
/// Failures carry `message` and a stable `code`; both go into the
/// error so scripts grepping stderr see them.
pub fn check_envelope(body: &serde_json::Value) -> Result<()> {
    if body["status"] == "success" {
        return Ok(());
    }
    let message = body["message"].as_str().unwrap_or("unknown error");
    match body["code"].as_str() {
        Some(code) => anyhow::bail!("Error ({}): {}", code, message),
        None => anyhow::bail!("Error: {}", message),
    }
}

fn fetch_envelope(url: &str) -> Result<serde_json::Value> {
    let resp = reqwest::blocking::get(url)
        .map_err(|e| anyhow::anyhow!("failed to connect to server: {}", e))?;
    let body: serde_json::Value = resp.json()?;
    check_envelope(&body)?;
    Ok(body)
}

/// GET devices / readings / latest.
pub fn get(
    resource: &str,
    id: Option<i64>,
    limit: Option<u32>,
    output_json: bool,
    client_config_path: &std::path::Path,
) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;

    match resource.to_lowercase().as_str() {
        "device" | "devices" => {
            let body = fetch_envelope(&format!("{base}/devices/all"))?;
            if output_json {
                println!("{}", serde_json::to_string_pretty(&body["devices"])?);
            } else {
                print_device_table(body["devices"].as_array().map_or(&[][..], |v| v.as_slice()));
            }
        }
        "reading" | "readings" => {
            let mut url = format!("{base}/sensor/all");
            let mut params = Vec::new();
            if let Some(id) = id {
                params.push(format!("deviceId={id}"));
            }
            if let Some(l) = limit {
                params.push(format!("limit={l}"));
            }
            if !params.is_empty() {
                url.push('?');
                url.push_str(&params.join("&"));
            }
            let body = fetch_envelope(&url)?;
            if output_json {
                println!("{}", serde_json::to_string_pretty(&body["readings"])?);
            } else {
                print_reading_table(body["readings"].as_array().map_or(&[][..], |v| v.as_slice()));
            }
        }
        "latest" => {
            let body = if let Some(id) = id {
                let body = fetch_envelope(&format!("{base}/sensor/latest/{id}"))?;
                serde_json::json!([body["reading"]])
            } else {
                fetch_envelope(&format!("{base}/sensor/latest"))?["readings"].clone()
            };
            if output_json {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print_reading_table(body.as_array().map_or(&[][..], |v| v.as_slice()));
            }
        }
        _ => anyhow::bail!(
            "Unknown resource type: {} (expected devices, readings or latest)",
            resource
        ),
    }
    Ok(())
}

/// POST a device registration or a reading.
pub fn create(
    resource: &str,
    json_body: &str,
    client_config_path: &std::path::Path,
) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;

    let (singular, url) = match resource.to_lowercase().as_str() {
        "device" | "devices" => ("device", format!("{base}/devices/add")),
        "reading" | "readings" => ("reading", format!("{base}/sensor/add")),
        _ => anyhow::bail!(
            "Unknown resource type: {} (expected device or reading)",
            resource
        ),
    };

    let body: serde_json::Value = serde_json::from_str(json_body)
        .map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;

    let client = reqwest::blocking::Client::new();
    let result: serde_json::Value = client.post(&url).json(&body).send()?.json()?;
    check_envelope(&result)?;

    println!("{} created.", singular);
    println!("{}", serde_json::to_string_pretty(&result[singular])?);
    Ok(())
}

/// PUT a full device replacement.
pub fn update(
    resource: &str,
    id: i64,
    json_body: &str,
    client_config_path: &std::path::Path,
) -> Result<()> {
    if !matches!(resource.to_lowercase().as_str(), "device" | "devices") {
        anyhow::bail!("Only devices can be updated (readings are append-only).");
    }
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;

    let body: serde_json::Value = serde_json::from_str(json_body)
        .map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;

    let client = reqwest::blocking::Client::new();
    let result: serde_json::Value = client
        .put(format!("{base}/devices/update/{id}"))
        .json(&body)
        .send()?
        .json()?;
    check_envelope(&result)?;

    println!("device {} updated.", id);
    println!("{}", serde_json::to_string_pretty(&result["device"])?);
    Ok(())
}

/// DELETE a device (cascades to its readings server-side).
pub fn delete(
    resource: &str,
    id: i64,
    client_config_path: &std::path::Path,
) -> Result<()> {
    if !matches!(resource.to_lowercase().as_str(), "device" | "devices") {
        anyhow::bail!("Only devices can be deleted (readings are append-only).");
    }
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;

    let client = reqwest::blocking::Client::new();
    let result: serde_json::Value = client
        .delete(format!("{base}/devices/delete/{id}"))
        .send()?
        .json()?;
    check_envelope(&result)?;

    println!("device {} deleted.", id);
    Ok(())
}

/// STATUS — check server health.
pub fn status(client_config_path: &std::path::Path) -> Result<()> {
    let ctx = current_context(client_config_path)?;

    println!("Context:   {}", ctx.name);
    println!("Server:    {}", if ctx.server.is_empty() { "-" } else { &ctx.server });

    if ctx.server.is_empty() {
        println!("Status:    no server configured");
        return Ok(());
    }

    let base = base_url(&ctx)?;
    match reqwest::blocking::get(format!("{base}/health")) {
        Ok(resp) if resp.status().is_success() => {
            println!("Status:    connected");
        }
        Ok(resp) => {
            println!("Status:    error ({})", resp.status());
        }
        Err(e) => {
            println!("Status:    disconnected ({})", e);
        }
    }
    Ok(())
}

fn print_device_table(devices: &[serde_json::Value]) {
    println!(
        "{:>5} {:24} {:24} {:>10} {:>10}",
        "ID", "NAME", "LOCATION", "LAT", "LON"
    );
    for d in devices {
        println!(
            "{:>5} {:24} {:24} {:>10.4} {:>10.4}",
            d["id"].as_i64().unwrap_or_default(),
            d["name"].as_str().unwrap_or("-"),
            d["location"].as_str().unwrap_or("-"),
            d["latitude"].as_f64().unwrap_or_default(),
            d["longitude"].as_f64().unwrap_or_default(),
        );
    }
}

fn print_reading_table(readings: &[serde_json::Value]) {
    println!(
        "{:>7} {:>7} {:24} {:>8} {:>8} {:>8} {:8} {:24}",
        "ID", "DEVICE", "NAME", "AIR", "SURFACE", "VIS", "COND", "RECORDED"
    );
    for r in readings {
        println!(
            "{:>7} {:>7} {:24} {:>8.1} {:>8.1} {:>8.1} {:8} {:24}",
            r["id"].as_i64().unwrap_or_default(),
            r["deviceId"].as_i64().unwrap_or_default(),
            r["deviceName"].as_str().unwrap_or("-"),
            r["airTemp"].as_f64().unwrap_or_default(),
            r["surfaceTemp"].as_f64().unwrap_or_default(),
            r["visMean"].as_f64().unwrap_or_default(),
            r["surface"].as_str().unwrap_or("-"),
            r["recordedAt"].as_str().unwrap_or("-"),
        );
    }
}
