//! PlotPass Settings Crate
//!
//! Loads, validates and saves the engine, worker and logging configuration.

pub mod config;
pub mod error;

pub use config::{Config, EngineSettings, LoggingSettings, WorkerSettings};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
