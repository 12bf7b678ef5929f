//! Configuration management module.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crt571::{ChecksumPolicy, SessionOptions};

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing.
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Baud rates the CRT-571 can be strapped to.
const SUPPORTED_BAUD_RATES: [u32; 5] = [1200, 2400, 9600, 19200, 38400];

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Serial line and protocol settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Serial device path, e.g. `/dev/ttyUSB0` or `COM3`.
    pub path: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Protocol address (ADDR byte).
    #[serde(default)]
    pub address: u8,
    /// Idle timeout ending each read, in milliseconds (default: 200).
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    /// Reject replies with a bad BCC (default: true).
    #[serde(default = "default_strict_checksum")]
    pub strict_checksum: bool,
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout_ms() -> u64 {
    200
}

fn default_strict_checksum() -> bool {
    true
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Also write logs to this file.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Get config file path (same directory as executable).
    pub fn default_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("crt571.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.path.trim().is_empty() {
            return Err(ConfigError::Validation("Device path cannot be empty".to_string()));
        }
        if !SUPPORTED_BAUD_RATES.contains(&self.device.baud_rate) {
            return Err(ConfigError::Validation(format!(
                "Baud rate must be one of {SUPPORTED_BAUD_RATES:?}"
            )));
        }
        if self.device.read_timeout_ms < 10 {
            return Err(ConfigError::Validation(
                "Read timeout must be at least 10 milliseconds".to_string(),
            ));
        }
        if self.device.read_timeout_ms > 60_000 {
            return Err(ConfigError::Validation(
                "Read timeout cannot exceed 60 seconds".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("Log level cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl DeviceConfig {
    /// Session settings for this device.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            address: self.address,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            checksum: if self.strict_checksum {
                ChecksumPolicy::Strict
            } else {
                ChecksumPolicy::Lenient
            },
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: default_device_path().to_string(),
            baud_rate: default_baud_rate(),
            address: 0,
            read_timeout_ms: default_read_timeout_ms(),
            strict_checksum: default_strict_checksum(),
        }
    }
}

fn default_device_path() -> &'static str {
    if cfg!(windows) { "COM1" } else { "/dev/ttyUSB0" }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("[device]\npath = \"/dev/ttyS1\"\n").unwrap();
        assert_eq!(config.device.path, "/dev/ttyS1");
        assert_eq!(config.device.baud_rate, 9600);
        assert_eq!(config.device.read_timeout_ms, 200);
        assert!(config.device.strict_checksum);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_session_options() {
        let mut config = AppConfig::default();
        config.device.address = 0x0F;
        config.device.read_timeout_ms = 500;
        config.device.strict_checksum = false;

        let options = config.device.session_options();
        assert_eq!(options.address, 0x0F);
        assert_eq!(options.read_timeout, Duration::from_millis(500));
        assert_eq!(options.checksum, ChecksumPolicy::Lenient);
    }

    #[test]
    fn test_validation_empty_path() {
        let mut config = AppConfig::default();
        config.device.path = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_baud_rate() {
        let mut config = AppConfig::default();
        config.device.baud_rate = 12345;
        assert!(config.validate().is_err());

        config.device.baud_rate = 38400;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_timeout_bounds() {
        let mut config = AppConfig::default();

        config.device.read_timeout_ms = 5;
        assert!(config.validate().is_err());

        config.device.read_timeout_ms = 60_001;
        assert!(config.validate().is_err());

        config.device.read_timeout_ms = 1000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("definitely/not/here/crt571.toml");
        assert!(matches!(AppConfig::try_load(path), ConfigLoadResult::Missing));
    }
}
