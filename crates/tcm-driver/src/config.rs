//! Driver configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DriverError, DriverResult};

/// Baud rates the module supports. The index of each rate is the value of
/// the `BaudRate` configuration parameter that selects it.
pub const BAUD_RATES: [u32; 15] = [
    300, 600, 1200, 1800, 2400, 3600, 4800, 7200, 9600, 14400, 19200, 28800, 38400, 57600,
    115200,
];

/// Baud rate the module ships with.
pub const DEFAULT_BAUD_RATE: u32 = 38400;

/// Value of the `BaudRate` configuration parameter for `baud_rate`.
pub fn baud_rate_index(baud_rate: u32) -> Option<u8> {
    BAUD_RATES
        .iter()
        .position(|&rate| rate == baud_rate)
        .map(|index| index as u8)
}

/// Serial connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Serial device path.
    pub port: String,
    /// Line speed. Framing is always 8N1.
    pub baud_rate: u32,
    /// How long a read may block before giving up, in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 1000,
        }
    }
}

impl DriverConfig {
    /// Config for `port` with default line settings.
    pub fn for_port(port: impl Into<String>) -> Self {
        DriverConfig {
            port: port.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a YAML document. Missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> DriverResult<Self> {
        let config: DriverConfig =
            serde_yaml::from_str(yaml).map_err(|e| DriverError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file.
    pub fn from_file(path: impl AsRef<Path>) -> DriverResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check the settings against what the module can do.
    pub fn validate(&self) -> DriverResult<()> {
        if self.port.is_empty() {
            return Err(DriverError::Config("serial port path is empty".to_string()));
        }
        if baud_rate_index(self.baud_rate).is_none() {
            return Err(DriverError::Config(format!(
                "unsupported baud rate {}",
                self.baud_rate
            )));
        }
        if self.read_timeout_ms == 0 {
            return Err(DriverError::Config(
                "read timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Read timeout as a [`Duration`].
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.port, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, 38400);
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = DriverConfig::from_yaml_str("port: /dev/ttyS3\n").unwrap();
        assert_eq!(config.port, "/dev/ttyS3");
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.read_timeout_ms, 1000);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = "port: /dev/ttyUSB1\nbaud_rate: 115200\nread_timeout_ms: 250\n";
        let config = DriverConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config,
            DriverConfig {
                port: "/dev/ttyUSB1".to_string(),
                baud_rate: 115200,
                read_timeout_ms: 250,
            }
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            DriverConfig::from_yaml_str("baud_rate: 12345\n"),
            Err(DriverError::Config(_))
        ));
        assert!(matches!(
            DriverConfig::from_yaml_str("read_timeout_ms: 0\n"),
            Err(DriverError::Config(_))
        ));
        assert!(matches!(
            DriverConfig::from_yaml_str("baud_rate: [1, 2]\n"),
            Err(DriverError::Config(_))
        ));
    }

    #[test]
    fn test_baud_rate_index() {
        assert_eq!(baud_rate_index(300), Some(0));
        assert_eq!(baud_rate_index(38400), Some(12));
        assert_eq!(baud_rate_index(115200), Some(14));
        assert_eq!(baud_rate_index(250000), None);
    }
}
