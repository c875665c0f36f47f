//! Configuration management for the file server
//!
//! Settings come from `config.toml` with `FILEDOCK_*` environment overrides.
//! Every value is read once at startup; changing one requires a restart.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Locations tried for the config file, without the `.toml` extension
const CONFIG_PATHS: [&str; 2] = [
    "filedock-server/config", // Docker production: /app/filedock-server/config.toml
    "config",                 // Local development: ./config.toml
];

const ENV_PREFIX: &str = "FILEDOCK";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    // ═══ NETWORK (Environment Override Supported) ═══
    /// IP address to bind the HTTP listener
    pub bind_address: String,

    /// Port for the HTTP listener
    pub port: u16,

    // ═══ STORAGE ═══
    /// Directory all operations are confined to
    pub storage_root: String,

    // ═══ LIMITS ═══
    /// Maximum accepted upload size in MB
    pub max_upload_size_mb: u64,

    /// Per-request timeout applied by the HTTP layer
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// Load from the first config file found, with environment overrides.
    ///
    /// A missing file is not an error: defaults and the environment still apply.
    pub fn load() -> Result<Self, ConfigError> {
        let config_file = CONFIG_PATHS
            .iter()
            .map(|p| PathBuf::from(format!("{}.toml", p)))
            .find(|p| p.is_file());

        Self::load_from(config_file.as_deref())
    }

    /// Load from an explicit config file (or none), with environment overrides
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("bind_address", "0.0.0.0")?
            .set_default("port", 8000_i64)?
            .set_default("storage_root", "./storage")?
            .set_default("max_upload_size_mb", 100_i64)?
            .set_default("request_timeout_secs", 300_i64)?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "max_upload_size_mb must be greater than 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Get maximum upload size in bytes
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::load_from(None).unwrap();
        assert!(config.port > 0);
        assert!(!config.storage_root.is_empty());
        assert!(config.max_upload_bytes() > 0);
    }

    #[test]
    fn test_file_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
bind_address = "127.0.0.1"
port = 9123
storage_root = "/srv/files"
max_upload_size_mb = 2
request_timeout_secs = 15
"#,
        );

        let config = ServerConfig::load_from(Some(path.as_path())).unwrap();
        assert_eq!(config.socket_addr(), "127.0.0.1:9123");
        assert_eq!(config.storage_root_path(), PathBuf::from("/srv/files"));
        assert_eq!(config.max_upload_bytes(), 2 * 1024 * 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_rejects_empty_storage_root() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "storage_root = \"\"\n");
        assert!(ServerConfig::load_from(Some(path.as_path())).is_err());
    }

    #[test]
    fn test_rejects_zero_upload_limit() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "max_upload_size_mb = 0\n");
        assert!(ServerConfig::load_from(Some(path.as_path())).is_err());
    }
}
