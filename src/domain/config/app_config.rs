//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidVolumeError;
use crate::domain::recording::Duration;

/// Default playback volume (unity gain)
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Highest accepted playback volume
pub const MAX_VOLUME: f32 = 2.0;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input device name; the system default when unset
    pub device: Option<String>,
    /// Interval between emitted audio chunks
    pub chunk_interval: Option<String>,
    /// Playback volume
    pub volume: Option<f32>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            device: None,
            chunk_interval: Some(Duration::default_chunk_interval().to_string()),
            volume: Some(DEFAULT_VOLUME),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            device: other.device.or(self.device),
            chunk_interval: other.chunk_interval.or(self.chunk_interval),
            volume: other.volume.or(self.volume),
        }
    }

    /// Get the chunk interval, or the default if not set/invalid.
    /// A zero interval means a single chunk at stop.
    pub fn chunk_interval_or_default(&self) -> Duration {
        self.chunk_interval
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_chunk_interval)
    }

    /// Get the playback volume, or the default if not set/out of range
    pub fn volume_or_default(&self) -> f32 {
        self.volume
            .filter(|v| is_valid_volume(*v))
            .unwrap_or(DEFAULT_VOLUME)
    }

    /// Get the configured device name, if any
    pub fn device_name(&self) -> Option<&str> {
        self.device.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Whether a volume lies in the accepted range
pub fn is_valid_volume(volume: f32) -> bool {
    volume.is_finite() && (0.0..=MAX_VOLUME).contains(&volume)
}

/// Parse a volume string such as "0.8"
pub fn parse_volume(input: &str) -> Result<f32, InvalidVolumeError> {
    input
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| is_valid_volume(*v))
        .ok_or_else(|| InvalidVolumeError {
            input: input.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_set() {
        let config = AppConfig::defaults();
        assert_eq!(config.chunk_interval, Some("1s".to_string()));
        assert_eq!(config.volume, Some(1.0));
        assert!(config.device.is_none());
    }

    #[test]
    fn merge_prefers_other() {
        let base = AppConfig::defaults();
        let other = AppConfig {
            device: Some("USB Mic".to_string()),
            volume: Some(0.5),
            ..Default::default()
        };

        let merged = base.merge(other);
        assert_eq!(merged.device, Some("USB Mic".to_string()));
        assert_eq!(merged.volume, Some(0.5));
        assert_eq!(merged.chunk_interval, Some("1s".to_string()));
    }

    #[test]
    fn chunk_interval_falls_back_on_garbage() {
        let config = AppConfig {
            chunk_interval: Some("soon".to_string()),
            ..Default::default()
        };
        assert_eq!(config.chunk_interval_or_default().as_millis(), 1000);

        let config = AppConfig {
            chunk_interval: Some("250ms".to_string()),
            ..Default::default()
        };
        assert_eq!(config.chunk_interval_or_default().as_millis(), 250);
    }

    #[test]
    fn volume_out_of_range_uses_default() {
        let config = AppConfig {
            volume: Some(7.5),
            ..Default::default()
        };
        assert_eq!(config.volume_or_default(), DEFAULT_VOLUME);
    }

    #[test]
    fn blank_device_is_default_device() {
        let config = AppConfig {
            device: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.device_name().is_none());
    }

    #[test]
    fn parse_volume_values() {
        assert_eq!(parse_volume("0.8").unwrap(), 0.8);
        assert_eq!(parse_volume(" 2 ").unwrap(), 2.0);
        assert!(parse_volume("-1").is_err());
        assert!(parse_volume("loud").is_err());
        assert!(parse_volume("NaN").is_err());
    }
}
