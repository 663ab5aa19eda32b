//! Configuration management.
//!
//! Settings come from an optional TOML file layered under `SURMADO_*`
//! environment variables (`SURMADO_API_KEY`, `SURMADO_BASE_URL`,
//! `SURMADO_TIMEOUT_SECS`). See [`file_config`] for the file format.

mod file_config;

pub use file_config::{ConfigFile, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_BASE_URL;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key; `None` leaves the client to read `SURMADO_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            polling: PollingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Defaults for waiting on reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            timeout_minutes: default_timeout_minutes(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level for the `surmado` tracing target when neither `-v` nor
    /// `RUST_LOG` is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_timeout_minutes() -> u64 {
    20
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load configuration from a file, with `SURMADO_*` environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("SURMADO"))
        .build()?
        .try_deserialize()
}

/// Get configuration from `SURMADO_*` environment variables and defaults
pub fn get_config() -> Result<Config, config::ConfigError> {
    config::Config::builder()
        .add_source(config::Environment::with_prefix("SURMADO"))
        .build()?
        .try_deserialize()
}

/// Default location of the configuration file (`<config dir>/surmado/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("surmado").join("config.toml"))
}

/// Find an existing configuration file in the current directory or the
/// user configuration directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("surmado.toml");
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Tests that read or set SURMADO_* variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://api.surmado.com/v1");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.polling.timeout_minutes, 20);
        assert_eq!(config.polling.poll_interval_secs, 30);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_load_config_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut file = File::create(&path).unwrap();
        file.write_all(
            br#"
api_key = "sur_test_file"
base_url = "https://staging.surmado.com/v1"
timeout_secs = 10

[polling]
poll_interval_secs = 5
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_url, "https://staging.surmado.com/v1");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.polling.poll_interval_secs, 5);
        assert_eq!(config.polling.timeout_minutes, 20);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_environment_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
base_url = "https://staging.surmado.com/v1"
timeout_secs = 10

[logging]
level = "debug"
"#,
        )
        .unwrap();

        std::env::set_var("SURMADO_TIMEOUT_SECS", "45");
        std::env::set_var("SURMADO_BASE_URL", "https://env.surmado.test/v1");
        let layered = load_config(&path);
        let from_env = get_config();
        std::env::remove_var("SURMADO_TIMEOUT_SECS");
        std::env::remove_var("SURMADO_BASE_URL");

        let config = layered.unwrap();
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.base_url, "https://env.surmado.test/v1");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.polling.timeout_minutes, 20);

        let config = from_env.unwrap();
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.base_url, "https://env.surmado.test/v1");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("/nonexistent/surmado.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("surmado/config.toml"));
        }
    }
}
