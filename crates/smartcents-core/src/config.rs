//! Configuration
//!
//! Loaded from TOML. Resolution order: an explicit path, then the file named
//! by `SMARTCENTS_CONFIG`, then `<config dir>/smartcents/config.toml`, then
//! the bundled defaults. A few environment variables override file values
//! afterwards (see [`Config::apply_env`]).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bundled defaults (also serves as the documented example file)
const DEFAULT_CONFIG: &str = include_str!("../../../config/smartcents.toml");

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history: HistoryConfig,
    pub server: ServerSettings,
    pub tips: TipsConfig,
}

/// Score history retention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub minute_capacity: usize,
    pub hourly_capacity: usize,
    /// Seed a synthetic earlier snapshot when the minute series is brand new
    pub bootstrap_synthetic_entry: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            minute_capacity: 100,
            hourly_capacity: 24,
            bootstrap_synthetic_entry: true,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5500".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
        }
    }
}

/// Mentor tip backend selection
///
/// `model` and `host` are optional; each backend has its own defaults and
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TipsConfig {
    pub backend: String,
    pub model: Option<String>,
    pub host: Option<String>,
}

impl Default for TipsConfig {
    fn default() -> Self {
        Self {
            backend: "rules".to_string(),
            model: None,
            host: None,
        }
    }
}

/// Per-user config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("smartcents").join("config.toml"))
}

impl Config {
    /// Resolve and load configuration, then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_path(explicit) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config");
                Self::from_file(&path)?
            }
            None => Self::parse(DEFAULT_CONFIG)?,
        };
        config.apply_env();
        Ok(config)
    }

    fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            // An explicit path must exist; it is reported by from_file otherwise
            return Some(path.to_path_buf());
        }
        if let Ok(env_path) = std::env::var("SMARTCENTS_CONFIG") {
            if !env_path.is_empty() {
                return Some(PathBuf::from(env_path));
            }
        }
        default_config_path().filter(|p| p.exists())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    /// Parse TOML; missing sections and keys take their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.history.minute_capacity == 0 || self.history.hourly_capacity == 0 {
            return Err(Error::Config(
                "History capacities must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `SMARTCENTS_HOST`, `SMARTCENTS_PORT` and
    /// `SMARTCENTS_ALLOWED_ORIGINS` (comma separated)
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SMARTCENTS_HOST") {
            if !host.is_empty() {
                self.server.host = host;
            }
        }
        if let Ok(port) = std::env::var("SMARTCENTS_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid SMARTCENTS_PORT"),
            }
        }
        if let Ok(origins) = std::env::var("SMARTCENTS_ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !origins.is_empty() {
                self.server.allowed_origins = origins;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_config_matches_defaults() {
        let parsed = Config::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::parse(
            r#"
            [history]
            minute_capacity = 10

            [tips]
            backend = "ollama"
            model = "llama3.2:3b"
            "#,
        )
        .unwrap();
        assert_eq!(config.history.minute_capacity, 10);
        assert_eq!(config.history.hourly_capacity, 24);
        assert!(config.history.bootstrap_synthetic_entry);
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.tips.backend, "ollama");
        assert_eq!(config.tips.model.as_deref(), Some("llama3.2:3b"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Config::parse("[history]\nminute_capacity = 0\n").is_err());
        assert!(Config::parse("[server\nport = ").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[history]\nbootstrap_synthetic_entry = false").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.history.bootstrap_synthetic_entry);

        let missing = Path::new("/definitely/not/here/smartcents.toml");
        assert!(matches!(Config::from_file(missing), Err(Error::Config(_))));
    }
}
