//! Client-side context management.
//!
//! Reads/writes `~/.roadwatch/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single context — connection to a roadwatchd instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "e75-north").
    pub name: String,

    /// Server URL (e.g. "http://localhost:5157").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    /// List of configured contexts.
    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// Default config file path: ~/.roadwatch/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to disk.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the currently active context, if any.
    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    /// Get a mutable reference to a context by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Add or update a context.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

/// Return the roadwatch config directory (~/.roadwatch).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".roadwatch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.current_context.is_empty());
        assert!(config.contexts.is_empty());
    }

    #[test]
    fn test_roundtrip() {
        let mut config = ClientConfig::default();
        config.current_context = "e75".to_string();
        config.contexts.push(Context {
            name: "e75".to_string(),
            server: "http://localhost:5157".to_string(),
        });

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.current_context, "e75");
        assert_eq!(back.contexts.len(), 1);
        assert_eq!(back.contexts[0].server, "http://localhost:5157");
    }

    #[test]
    fn test_save_and_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = ClientConfig::default();
        config.upsert_context(Context {
            name: "e75".to_string(),
            server: "http://localhost:5157".to_string(),
        });
        config.current_context = "e75".to_string();
        config.save(&path).unwrap();

        let back = ClientConfig::load(&path).unwrap();
        assert_eq!(back.current().unwrap().server, "http://localhost:5157");

        // A missing file is an empty config, not an error.
        let missing = ClientConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(missing.contexts.is_empty());
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let mut config = ClientConfig::default();
        config.upsert_context(Context {
            name: "e75".to_string(),
            server: "http://old:5157".to_string(),
        });
        config.upsert_context(Context {
            name: "e75".to_string(),
            server: "http://new:5157".to_string(),
        });
        assert_eq!(config.contexts.len(), 1);
        assert_eq!(config.contexts[0].server, "http://new:5157");
    }

    #[test]
    fn test_remove_clears_current() {
        let mut config = ClientConfig::default();
        config.upsert_context(Context {
            name: "e75".to_string(),
            server: String::new(),
        });
        config.current_context = "e75".to_string();

        assert!(config.remove_context("e75"));
        assert!(config.current_context.is_empty());
        assert!(!config.remove_context("e75"));
    }
}
