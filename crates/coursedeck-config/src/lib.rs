//! Shared configuration for coursedeck consumers.
//!
//! TOML file + `COURSEDECK_*` environment overrides, resolved with
//! `figment`, and translation to `coursedeck_core::StoreConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coursedeck_core::{NotificationBus, StoreConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Backend base URL (e.g. "http://localhost:9000").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Notification batches a slow subscriber may fall behind.
    #[serde(default = "default_message_capacity")]
    pub message_capacity: usize,

    /// Where the logged-in session is kept. Defaults to the platform data dir.
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout: default_timeout(),
            message_capacity: default_message_capacity(),
            session_dir: None,
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:9000".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_message_capacity() -> usize {
    NotificationBus::DEFAULT_CAPACITY
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "coursedeck", "coursedeck")
}

fn home_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("coursedeck");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default directory for session data.
pub fn default_session_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback().join("session"),
        |dirs| dirs.data_dir().join("session"),
    )
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load the Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("COURSEDECK_"));

    Ok(figment.extract()?)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(cfg)?)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and convert into the core's runtime config.
    pub fn to_store_config(&self) -> Result<StoreConfig, ConfigError> {
        let api_url: url::Url = self.api_url.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {}", self.api_url),
        })?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("unsupported scheme '{}'", api_url.scheme()),
            });
        }

        if self.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        let session_dir = self
            .session_dir
            .clone()
            .unwrap_or_else(default_session_dir);

        let mut store = StoreConfig::new(api_url, session_dir);
        store.timeout = Duration::from_secs(self.timeout);
        store.message_capacity = self.message_capacity.max(1);
        Ok(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_translate() {
        let store = Config::default().to_store_config().unwrap();
        assert_eq!(store.api_url.as_str(), "http://localhost:9000/");
        assert_eq!(store.timeout, Duration::from_secs(30));
        assert_eq!(store.message_capacity, NotificationBus::DEFAULT_CAPACITY);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://courses.example.test\"\ntimeout = 5\nsession_dir = \"/tmp/cd\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.api_url, "https://courses.example.test");
        assert_eq!(cfg.timeout, 5);
        assert_eq!(cfg.message_capacity, NotificationBus::DEFAULT_CAPACITY);

        let store = cfg.to_store_config().unwrap();
        assert_eq!(store.session_dir, PathBuf::from("/tmp/cd"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.timeout, Config::default().timeout);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            api_url: "http://127.0.0.1:4000".into(),
            timeout: 12,
            message_capacity: 8,
            session_dir: Some(dir.path().join("session")),
        };

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.api_url, cfg.api_url);
        assert_eq!(loaded.message_capacity, 8);
    }

    #[test]
    fn invalid_url_rejected() {
        let cfg = Config {
            api_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_store_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(cfg.to_store_config().is_err());
    }
}
