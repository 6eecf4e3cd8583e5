//! Catalog client configuration types and loading

use eyre::{Context, Result};
use notifystore::NotifyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main catalog client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Notification timing
    pub notifications: NotifyConfig,

    /// Catalog service settings
    pub catalog: CatalogConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .catalog.yml
        let local_config = PathBuf::from(".catalog.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/catalog/catalog.yml
        if let Some(user_config) = user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at `log-level` before logging is set up
    ///
    /// Never fails; any problem just yields `None`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(".catalog.yml"))
                .chain(user_config_path())
                .collect(),
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Effective configuration rendered as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("catalog").join("catalog.yml"))
}

/// Catalog service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Backend base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Movies shown per dashboard page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    debug!("default_page_size: called");
    6
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            page_size: default_page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.notifications.default_duration_ms, 2000);
        assert_eq!(config.notifications.fade_window_ms, 300);
        assert_eq!(config.catalog.page_size, 6);
        assert_eq!(config.catalog.base_url, "http://localhost:8081");
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
notifications:
  default-duration-ms: 5000
  fade-window-ms: 150

catalog:
  base-url: http://catalog.internal:9000
  page-size: 12

log-level: debug
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.notifications.default_duration_ms, 5000);
        assert_eq!(config.notifications.fade_window_ms, 150);
        assert_eq!(config.catalog.base_url, "http://catalog.internal:9000");
        assert_eq!(config.catalog.page_size, 12);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
catalog:
  page-size: 3
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.catalog.page_size, 3);
        assert_eq!(config.catalog.base_url, "http://localhost:8081");
        assert_eq!(config.notifications.default_duration_ms, 2000);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "notifications:\n  fade-window-ms: 10\nlog-level: warn").unwrap();

        let path = file.path().to_path_buf();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.notifications.fade_window_ms, 10);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let path = PathBuf::from("/nonexistent/catalog.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_load_invalid_yaml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "notifications: [not, a, map]").unwrap();

        let path = file.path().to_path_buf();
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_to_yaml_roundtrip() {
        let config = Config::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("page-size: 6"));
        assert!(yaml.contains("default-duration-ms: 2000"));

        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.catalog.page_size, config.catalog.page_size);
    }
}
