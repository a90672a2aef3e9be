//! Engine configuration
//!
//! Coordinates and local clock, per-feature day horizons and the tuning
//! constants of the energy score. Defaults reproduce the fixed behaviour;
//! everything can be loaded from JSON.

use crate::error::ComputeError;
use crate::types::Location;
use serde::{Deserialize, Serialize};

/// Default number of archive years scanned for historical records
pub const DEFAULT_HISTORY_YEARS: u32 = 45;

/// Number of forecast days produced per feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Horizons {
    pub gardening: usize,
    pub photography: usize,
    pub energy: usize,
    pub wind: usize,
}

impl Default for Horizons {
    fn default() -> Self {
        Self {
            gardening: 7,
            photography: 5,
            energy: 3,
            wind: 7,
        }
    }
}

/// Coefficients of the biometeorological energy score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyWeights {
    pub baseline: f64,
    /// Comfortable apparent temperature (°C)
    pub comfort_temp: f64,
    pub temp_weight: f64,
    pub humidity_low: f64,
    pub humidity_high: f64,
    pub humidity_low_weight: f64,
    pub humidity_high_weight: f64,
    /// Reference pressure (hPa)
    pub reference_pressure: f64,
    pub pressure_weight: f64,
    /// Largest penalty the day-to-day pressure change may contribute
    pub trend_cap: f64,
    pub uv_threshold: f64,
    pub uv_penalty: f64,
    pub high_threshold: f64,
    pub balanced_threshold: f64,
    pub low_threshold: f64,
}

impl Default for EnergyWeights {
    fn default() -> Self {
        Self {
            baseline: 65.0,
            comfort_temp: 20.0,
            temp_weight: 1.2,
            humidity_low: 40.0,
            humidity_high: 70.0,
            humidity_low_weight: 0.4,
            humidity_high_weight: 0.6,
            reference_pressure: 1016.0,
            pressure_weight: 0.15,
            trend_cap: 12.0,
            uv_threshold: 7.0,
            uv_penalty: 5.0,
            high_threshold: 70.0,
            balanced_threshold: 55.0,
            low_threshold: 40.0,
        }
    }
}

/// Top-level configuration for an aggregation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub location: Location,
    #[serde(default)]
    pub horizons: Horizons,
    #[serde(default)]
    pub energy: EnergyWeights,
    #[serde(default = "default_history_years")]
    pub history_years: u32,
}

fn default_history_years() -> u32 {
    DEFAULT_HISTORY_YEARS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            location: Location::default(),
            horizons: Horizons::default(),
            energy: EnergyWeights::default(),
            history_years: DEFAULT_HISTORY_YEARS,
        }
    }
}

impl EngineConfig {
    /// Create a configuration for a location with default tuning
    pub fn for_location(latitude: f64, longitude: f64, timezone: &str, utc_offset_minutes: i32) -> Self {
        Self {
            location: Location {
                latitude,
                longitude,
                timezone: timezone.to_string(),
                utc_offset_minutes,
            },
            ..Default::default()
        }
    }

    /// Check coordinates, offset and horizons
    pub fn validate(&self) -> Result<(), ComputeError> {
        let loc = &self.location;
        if !(-90.0..=90.0).contains(&loc.latitude) {
            return Err(ComputeError::InvalidConfig(format!(
                "latitude {} outside [-90, 90]",
                loc.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&loc.longitude) {
            return Err(ComputeError::InvalidConfig(format!(
                "longitude {} outside [-180, 180]",
                loc.longitude
            )));
        }
        // Real-world offsets span UTC-12:00 to UTC+14:00
        if !(-12 * 60..=14 * 60).contains(&loc.utc_offset_minutes) {
            return Err(ComputeError::InvalidConfig(format!(
                "UTC offset {} minutes out of range",
                loc.utc_offset_minutes
            )));
        }
        let h = &self.horizons;
        if h.gardening == 0 || h.photography == 0 || h.energy == 0 || h.wind == 0 {
            return Err(ComputeError::InvalidConfig(
                "horizons must be at least one day".to_string(),
            ));
        }
        if self.history_years == 0 {
            return Err(ComputeError::InvalidConfig(
                "history_years must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
