//! Admin login command.
//!
//! The server hands out no token — a successful login just confirms
//! the configured admin credentials, the same check the dashboard
//! makes before showing its admin controls.

use anyhow::Result;

use super::resource::{base_url, check_envelope, current_context};

/// Check credentials against the current context's server.
pub fn login(
    username: &str,
    password: &str,
    client_config_path: &std::path::Path,
) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let base = base_url(&ctx)?;

    let body = serde_json::json!({
        "username": username,
        "password": password,
    });

    let client = reqwest::blocking::Client::new();
    let resp = client
        .post(format!("{base}/admin/login"))
        .json(&body)
        .send()
        .map_err(|e| anyhow::anyhow!("failed to connect to server: {}", e))?;

    let result: serde_json::Value = resp.json()?;
    check_envelope(&result)?;

    println!("Logged in as {} on context \"{}\".", username, ctx.name);
    Ok(())
}
