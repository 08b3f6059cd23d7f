//! Serializable analysis configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use premia_core::clean::DateSystem;

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

/// Rolling windows for most series stay within this bound.
pub const WINDOW_MAX: usize = 4000;
/// The GDP ratio is monthly, so its windows are bounded tighter.
pub const GDP_WINDOW_MAX: usize = 1000;
/// Window for the ten-year band view (roughly eight trading years).
pub const DEFAULT_ROLLING_WINDOW: usize = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{name} must be between 1 and {max}, got {value}")]
    WindowOutOfRange {
        name: &'static str,
        value: usize,
        max: usize,
    },
}

/// Moving-average and percentile windows for one thermometer metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWindows {
    pub moving_average: usize,
    pub rolling_period: usize,
}

impl Default for MetricWindows {
    fn default() -> Self {
        Self {
            moving_average: 20,
            rolling_period: 2000,
        }
    }
}

impl MetricWindows {
    fn validate(&self, name: &'static str, max: usize) -> Result<(), ConfigError> {
        for value in [self.moving_average, self.rolling_period] {
            if value == 0 || value > max {
                return Err(ConfigError::WindowOutOfRange { name, value, max });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollingConfig {
    pub window: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_ROLLING_WINDOW,
        }
    }
}

/// Per-metric thermometer windows. The GDP ratio is sampled monthly, so
/// its caps are a quarter of the daily ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThermometerConfig {
    pub gdp: MetricWindows,
    pub volume: MetricWindows,
    pub securities_lend: MetricWindows,
    pub erp: MetricWindows,
}

/// A known-missing close value to patch in during PE cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackfillEntry {
    pub date: NaiveDate,
    pub close: f64,
}

/// Complete analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub date_system: Option<DateSystem>,
    pub rolling: RollingConfig,
    pub thermometer: ThermometerConfig,
    pub close_backfill: Vec<BackfillEntry>,
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rolling.window == 0 || self.rolling.window > WINDOW_MAX {
            return Err(ConfigError::WindowOutOfRange {
                name: "rolling.window",
                value: self.rolling.window,
                max: WINDOW_MAX,
            });
        }
        self.thermometer.gdp.validate("thermometer.gdp", GDP_WINDOW_MAX)?;
        self.thermometer
            .volume
            .validate("thermometer.volume", WINDOW_MAX)?;
        self.thermometer
            .securities_lend
            .validate("thermometer.securities_lend", WINDOW_MAX)?;
        self.thermometer.erp.validate("thermometer.erp", WINDOW_MAX)?;
        Ok(())
    }

    /// Deterministic hash of this configuration. Two runs with identical
    /// configs share a RunId.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config.rolling.window, DEFAULT_ROLLING_WINDOW);
        assert_eq!(config.thermometer.gdp, MetricWindows::default());
        assert!(config.close_backfill.is_empty());
        assert_eq!(config.date_system, None);
    }

    #[test]
    fn parses_a_full_configuration() {
        let text = r#"
            date_system = "excel_1904"

            [rolling]
            window = 250

            [thermometer.gdp]
            moving_average = 5
            rolling_period = 120

            [[close_backfill]]
            date = "2018-08-03"
            close = 3892.88
        "#;
        let config = AnalysisConfig::from_toml(text).unwrap();
        assert_eq!(config.date_system, Some(DateSystem::Excel1904));
        assert_eq!(config.rolling.window, 250);
        assert_eq!(config.thermometer.gdp.rolling_period, 120);
        assert_eq!(config.close_backfill.len(), 1);
        assert_eq!(config.close_backfill[0].close, 3892.88);
    }

    #[test]
    fn rejects_windows_outside_their_caps() {
        let err = AnalysisConfig::from_toml("[rolling]\nwindow = 4001").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WindowOutOfRange {
                name: "rolling.window",
                value: 4001,
                max: WINDOW_MAX,
            }
        ));

        // GDP has the tighter cap.
        let err =
            AnalysisConfig::from_toml("[thermometer.gdp]\nrolling_period = 1500").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::WindowOutOfRange {
                name: "thermometer.gdp",
                max: GDP_WINDOW_MAX,
                ..
            }
        ));

        let err = AnalysisConfig::from_toml("[rolling]\nwindow = 0").unwrap_err();
        assert!(matches!(err, ConfigError::WindowOutOfRange { .. }));
    }

    #[test]
    fn run_id_is_deterministic_and_config_sensitive() {
        let a = AnalysisConfig::default();
        let b = AnalysisConfig::default();
        assert_eq!(a.run_id(), b.run_id());

        let c = AnalysisConfig::from_toml("[rolling]\nwindow = 250").unwrap();
        assert_ne!(a.run_id(), c.run_id());
    }
}
