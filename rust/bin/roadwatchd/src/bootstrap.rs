//! Bootstrap — startup checks before the server binds.

use crate::config::{AdminConfig, ServerConfig};

/// Verify server configuration is complete enough to start.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.admin.username.is_empty() || config.admin.password.is_empty() {
        anyhow::bail!(
            "Admin credentials missing from configuration.\n\
             Fill in the [admin] section before starting the server."
        );
    }
    if config.storage.data_dir.is_empty() {
        anyhow::bail!("Storage data_dir is empty in configuration.");
    }
    Ok(())
}

/// Check a login attempt against the configured admin account.
pub fn verify_admin_credentials(username: &str, password: &str, admin: &AdminConfig) -> bool {
    username == admin.username && password == admin.password
}
