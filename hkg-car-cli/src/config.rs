//! Session configuration loading

use anyhow::{Context, Result};
use hkg_car_interface::VehicleConfiguration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Replay session configuration (loaded from session.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub vehicle: VehicleConfiguration,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReplayConfig {
    /// Include the decoded vehicle state in every output record
    #[serde(default)]
    pub emit_state: bool,
    /// Stop after this many cycles
    pub max_cycles: Option<u64>,
    /// Frame index of the first trace line without an explicit frame
    #[serde(default)]
    pub start_frame: u64,
}

/// Load configuration from a TOML file
///
/// The vehicle table is validated here so a bad session never reaches the
/// replay loop.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .vehicle
        .validate()
        .with_context(|| format!("Invalid vehicle in config file: {:?}", path))?;

    Ok(config)
}
