//! Configuration file support for the surmado CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! api_key = "sur_live_xxx"
//! base_url = "https://api.surmado.com/v1"
//! timeout_secs = 30
//!
//! [polling]
//! timeout_minutes = 20
//! poll_interval_secs = 30
//!
//! [logging]
//! level = "warn"
//! ```

use std::path::Path;

use super::Config;

/// Configuration file structure
#[derive(Debug, Default)]
pub struct ConfigFile {
    pub config: Config,
}

impl ConfigFile {
    /// Load configuration from a TOML file (no environment overrides)
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigFileError::Io(e.to_string()))?;

        let config = toml::from_str::<Config>(&content)
            .map_err(|e| ConfigFileError::Parse(e.to_string()))?;
        Ok(Self { config })
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }

    /// Create default configuration, optionally holding an API key
    pub fn create_default(api_key: Option<String>) -> Self {
        Self {
            config: Config {
                api_key,
                ..Config::default()
            },
        }
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut file = ConfigFile::create_default(Some("sur_test_saved".to_string()));
        file.config.polling.poll_interval_secs = 10;
        file.save(&path).unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.config.api_key.as_deref(), Some("sur_test_saved"));
        assert_eq!(loaded.config.polling.poll_interval_secs, 10);
        assert_eq!(loaded.config.base_url, "https://api.surmado.com/v1");
    }

    #[test]
    fn test_config_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/config.toml");
        assert!(matches!(
            ConfigFile::load(&path),
            Err(ConfigFileError::Io(_))
        ));
    }

    #[test]
    fn test_config_file_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");

        std::fs::write(&path, "invalid = toml = content").unwrap();

        assert!(matches!(
            ConfigFile::load(&path),
            Err(ConfigFileError::Parse(_))
        ));
    }
}
