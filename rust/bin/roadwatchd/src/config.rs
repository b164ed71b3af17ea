//! Server configuration loaded from TOML.
//!
//! ```toml
//! [storage]
//! data_dir = "/var/lib/roadwatch"
//!
//! [admin]
//! username = "admin"
//! password = "..."
//!
//! [server]
//! listen = "0.0.0.0:5157"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Directory where named contexts live (`-c prod` → `/etc/roadwatch/prod.toml`).
pub const CONFIG_DIR: &str = "/etc/roadwatch";

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    #[serde(default)]
    pub server: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the SQLite database. Created on startup if missing.
    pub data_dir: String,
}

/// The dashboard's single admin account, credentials in the clear.
///
/// Login is a UI gate, not an access-control system: there are no
/// sessions or tokens, and the data endpoints answer without it.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Listen address; the sensor gateways are flashed with port 5157.
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:5157".to_string()
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// Names resolve under [`CONFIG_DIR`]; anything containing `/` or
    /// `.` is taken as a literal path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            Path::new(CONFIG_DIR).join(format!("{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {e}", path.display()))?;
        let config: ServerConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("cannot parse config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Path of the SQLite database inside the data directory.
    pub fn sqlite_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join("roadwatch.sqlite")
    }
}
