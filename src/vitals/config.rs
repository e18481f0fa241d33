use std::fs;
use std::path::Path;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::types::VitalChannel;
use crate::vitals::error::ConfigError;
use crate::vitals::profile::ChannelProfile;

/// Shortest real tick period, however large a speed multiplier gets.
const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Base tick period before the channel's speed multiplier is applied.
    pub tick_period_ms: u64,
    /// How often the aggregator samples the four channels.
    pub sample_cadence_ms: u64,
    /// Rolling history length per channel.
    pub buffer_length: usize,
    /// Clamp generated values into each profile's display domain.
    pub clamp_to_domain: bool,
    /// Fixed seed for the noise generators; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        // Bedside monitor defaults: 100 ms base tick, one summary per second, 150-point trace.
        Self {
            tick_period_ms: 100,
            sample_cadence_ms: 1000,
            buffer_length: 150,
            clamp_to_domain: false,
            seed: None,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::InvalidTickPeriod);
        }
        if self.sample_cadence_ms == 0 {
            return Err(ConfigError::InvalidSampleCadence);
        }
        if self.buffer_length < 2 {
            return Err(ConfigError::BufferTooShort(self.buffer_length));
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!("loaded monitor config from {}", path.display());
        Ok(config)
    }

    pub fn sample_cadence(&self) -> Duration {
        Duration::from_millis(self.sample_cadence_ms)
    }

    /// Real tick period of a channel: a faster multiplier means a shorter period.
    pub fn tick_period_for(&self, profile: &ChannelProfile) -> Duration {
        let speed = profile.tick_speed_multiplier.max(f64::EPSILON);
        Duration::from_secs_f64(self.tick_period_ms as f64 / 1000.0 / speed).max(MIN_TICK_PERIOD)
    }

    pub fn channel_seed(&self, channel: VitalChannel) -> Option<u64> {
        self.seed.map(|seed| channel.derive_seed(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::profile::ProfileSet;

    #[test]
    fn defaults_are_valid() {
        let config = MonitorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_length, 150);
        assert_eq!(config.sample_cadence(), Duration::from_millis(1000));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = MonitorConfig::from_json_str(r#"{ "buffer_length": 60, "seed": 7 }"#).unwrap();
        assert_eq!(config.buffer_length, 60);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.tick_period_ms, 100);
        assert!(!config.clamp_to_domain);
    }

    #[test]
    fn rejects_degenerate_values() {
        let err = MonitorConfig::from_json_str(r#"{ "tick_period_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTickPeriod));
        let err = MonitorConfig::from_json_str(r#"{ "buffer_length": 1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::BufferTooShort(1)));
        let err = MonitorConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn speed_multiplier_shortens_period() {
        let config = MonitorConfig::default();
        let stable = ProfileSet::STABLE_ADULT;
        let resp = config.tick_period_for(&stable.resp);
        assert!((resp.as_secs_f64() - 0.1).abs() < 1e-9);
        let hr = config.tick_period_for(&stable.hr);
        assert!((hr.as_secs_f64() - 0.1 / 1.5).abs() < 1e-9);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MonitorConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monitor.json");
        fs::write(&path, r#"{ "clamp_to_domain": true, "sample_cadence_ms": 250 }"#).unwrap();
        let config = MonitorConfig::from_json_file(&path).unwrap();
        assert!(config.clamp_to_domain);
        assert_eq!(config.sample_cadence(), Duration::from_millis(250));
    }
}
