//! Configuration for PlotPass
//!
//! Supports JSON and TOML files, stored by default in the platform
//! configuration directory.
//!
//! Configuration is organized into sections:
//! - Engine settings (travel budget, optimization, flattening)
//! - Worker settings (timeout, bootstrap, resource caps)
//! - Logging preferences

use plotpass_core::TravelBudget;
use plotpass_worker::{ClientConfig, ResourceCaps, WorkerOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Pass planning settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Drawn-length budget per pass in meters, unlimited when absent
    pub max_travel_per_layer_meters: Option<f64>,
    /// Reorder paths to reduce pen-up travel
    pub optimize_travel: bool,
    /// Curve flattening tolerance in mm
    pub flatten_tolerance: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_travel_per_layer_meters: None,
            optimize_travel: true,
            flatten_tolerance: 0.05,
        }
    }
}

impl EngineSettings {
    pub fn budget(&self) -> Option<TravelBudget> {
        TravelBudget::from_meters(self.max_travel_per_layer_meters)
    }
}

/// Background worker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Render timeout in milliseconds
    pub timeout_ms: u64,
    pub bootstrap_delay_ms: u64,
    pub max_paths_per_layer: usize,
    pub max_points_per_path: usize,
    pub max_total_fragments: usize,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        let caps = ResourceCaps::default();
        Self {
            timeout_ms: 30_000,
            bootstrap_delay_ms: 0,
            max_paths_per_layer: caps.max_paths_per_layer,
            max_points_per_path: caps.max_points_per_path,
            max_total_fragments: caps.max_total_fragments,
        }
    }
}

impl WorkerSettings {
    pub fn caps(&self) -> ResourceCaps {
        ResourceCaps {
            max_paths_per_layer: self.max_paths_per_layer,
            max_points_per_path: self.max_points_per_path,
            max_total_fragments: self.max_total_fragments,
        }
    }

    pub fn worker_options(&self) -> WorkerOptions {
        WorkerOptions {
            caps: self.caps(),
            bootstrap_delay: Duration::from_millis(self.bootstrap_delay_ms),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            ..ClientConfig::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineSettings,
    pub worker: WorkerSettings,
    pub logging: LoggingSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/plotpass/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("plotpass").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform config directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| SettingsError::LoadError(format!("{}: {}", path.display(), e)))?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `path`, or the defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::SaveError(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(budget) = self.engine.max_travel_per_layer_meters {
            if !budget.is_finite() {
                return Err(ConfigError::out_of_range(
                    "engine.max_travel_per_layer_meters",
                    budget,
                ));
            }
        }

        let tolerance = self.engine.flatten_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(ConfigError::out_of_range("engine.flatten_tolerance", tolerance));
        }

        if self.worker.timeout_ms == 0 {
            return Err(ConfigError::out_of_range("worker.timeout_ms", 0));
        }

        let caps = [
            ("worker.max_paths_per_layer", self.worker.max_paths_per_layer),
            ("worker.max_points_per_path", self.worker.max_points_per_path),
            ("worker.max_total_fragments", self.worker.max_total_fragments),
        ];
        for (key, value) in caps {
            if value == 0 {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> SettingsResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.budget(), None);
        assert!(config.engine.optimize_travel);
        assert_eq!(config.worker.timeout_ms, 30_000);
        assert_eq!(config.worker.caps(), ResourceCaps::default());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.worker.timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.flatten_tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.engine.max_travel_per_layer_meters = Some(f64::INFINITY);
        assert!(config.validate().is_err());

        // Non-positive budgets are valid and mean "no limit"
        let mut config = Config::default();
        config.engine.max_travel_per_layer_meters = Some(-1.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.budget(), None);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[engine]\nmax_travel_per_layer_meters = 2.5\n").unwrap();
        assert_eq!(config.engine.max_travel_per_layer_meters, Some(2.5));
        assert!(config.engine.optimize_travel);
        assert_eq!(config.worker, WorkerSettings::default());
    }

    #[test]
    fn test_worker_conversions() {
        let worker = WorkerSettings {
            timeout_ms: 1500,
            bootstrap_delay_ms: 20,
            ..WorkerSettings::default()
        };
        assert_eq!(worker.client_config().timeout, Duration::from_millis(1500));
        assert_eq!(worker.worker_options().bootstrap_delay, Duration::from_millis(20));
    }
}
