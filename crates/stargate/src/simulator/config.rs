//! Gate timing and hazard configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::types::{RegionSize, ADDRESS_REGISTRY_CAPACITY};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "stargate.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub registry_capacity: usize,
    pub unload_spacing_min: u64,
    pub unload_spacing_max: u64,
    pub idle_threshold_min: u64,
    pub idle_threshold_max: u64,
    pub unstable_window_ticks: u64,
    pub hazard_interval_ticks: u64,
    pub hazard_radius: u32,
    pub evacuation_margin: u32,
    pub evacuation_search_radius: u32,
    pub evacuation_search_attempts: u32,
    pub evacuation_hold_floor: u64,
    pub evacuation_hold_margin: u64,
    pub region_size_hint: RegionSize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            registry_capacity: ADDRESS_REGISTRY_CAPACITY,
            unload_spacing_min: 10,
            unload_spacing_max: 80,
            idle_threshold_min: 1_900,
            idle_threshold_max: 2_500,
            unstable_window_ticks: 150,
            hazard_interval_ticks: 10,
            hazard_radius: 1,
            evacuation_margin: 3,
            evacuation_search_radius: 8,
            evacuation_search_attempts: 40,
            evacuation_hold_floor: 300,
            evacuation_hold_margin: 200,
            region_size_hint: RegionSize::default(),
        }
    }
}

impl GateConfig {
    pub fn sanitized(mut self) -> Self {
        if self.unload_spacing_max < self.unload_spacing_min {
            self.unload_spacing_max = self.unload_spacing_min;
        }
        if self.idle_threshold_max < self.idle_threshold_min {
            self.idle_threshold_max = self.idle_threshold_min;
        }
        if self.hazard_interval_ticks == 0 {
            self.hazard_interval_ticks = 1;
        }
        if self.evacuation_search_attempts == 0 {
            self.evacuation_search_attempts = 1;
        }
        if self.region_size_hint.width == 0 {
            self.region_size_hint.width = 1;
        }
        if self.region_size_hint.depth == 0 {
            self.region_size_hint.depth = 1;
        }
        self
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input).map_err(|err| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: err.to_string(),
        })?;
        Ok(config.sanitized())
    }

    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Ok(config.sanitized())
    }

    /// Loads `stargate.toml` from the working directory, or defaults when absent.
    pub fn from_default_sources() -> Result<Self, ConfigError> {
        let path = Path::new(DEFAULT_CONFIG_FILE_NAME);
        if path.exists() {
            return Self::from_config_file(path);
        }
        Ok(Self::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}
