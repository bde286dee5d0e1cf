//! Configuration schema definitions
//!
//! Every field has a default so an empty file (or no file) is valid.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub proximity: ProximityConfig,

    #[serde(default)]
    pub tray: TrayConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl ConfigSchema {
    /// Validate cross-field and range constraints
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.proximity.validate()?;
        if self.api.timeout_secs == 0 {
            return Err(Error::invalid_config_value("api.timeout_secs", "must be positive"));
        }
        Ok(())
    }
}

/// Vehicle position simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Interval between position updates
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Width of the uniform jitter window applied to ambient vehicles, in degrees
    #[serde(default = "default_jitter_degrees")]
    pub jitter_degrees: f64,

    /// Lower bound for randomized ambient ETAs
    #[serde(default = "default_eta_min")]
    pub eta_min_minutes: u32,

    /// Upper bound (inclusive) for randomized ambient ETAs
    #[serde(default = "default_eta_max")]
    pub eta_max_minutes: u32,

    /// Fraction of the remaining distance the target covers each tick
    #[serde(default = "default_approach_fraction")]
    pub approach_fraction: f64,

    /// Meters counted as one minute of ETA for the target vehicle
    #[serde(default = "default_meters_per_minute")]
    pub meters_per_eta_minute: f64,

    /// Vehicle designated as the pickup target (first vehicle when unset)
    #[serde(default)]
    pub target_vehicle: Option<String>,

    /// Seed for reproducible simulations
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// Tick interval as a duration
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::invalid_config_value(
                "simulation.tick_interval_ms",
                "must be positive",
            ));
        }
        if !(self.approach_fraction > 0.0 && self.approach_fraction <= 1.0) {
            return Err(Error::invalid_config_value(
                "simulation.approach_fraction",
                format!("{} is outside (0, 1]", self.approach_fraction),
            ));
        }
        if !(self.jitter_degrees >= 0.0 && self.jitter_degrees.is_finite()) {
            return Err(Error::invalid_config_value(
                "simulation.jitter_degrees",
                "must be a non-negative number",
            ));
        }
        if self.eta_min_minutes > self.eta_max_minutes {
            return Err(Error::invalid_config_value(
                "simulation.eta_min_minutes",
                "must not exceed eta_max_minutes",
            ));
        }
        if self.meters_per_eta_minute <= 0.0 {
            return Err(Error::invalid_config_value(
                "simulation.meters_per_eta_minute",
                "must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            jitter_degrees: default_jitter_degrees(),
            eta_min_minutes: default_eta_min(),
            eta_max_minutes: default_eta_max(),
            approach_fraction: default_approach_fraction(),
            meters_per_eta_minute: default_meters_per_minute(),
            target_vehicle: None,
            seed: None,
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    2000
}

fn default_jitter_degrees() -> f64 {
    0.001
}

fn default_eta_min() -> u32 {
    5
}

fn default_eta_max() -> u32 {
    24
}

fn default_approach_fraction() -> f64 {
    0.08
}

fn default_meters_per_minute() -> f64 {
    60.0
}

/// Proximity evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProximityConfig {
    /// A vehicle is in range when strictly closer than this
    #[serde(default = "default_range_meters")]
    pub range_meters: f64,
}

impl ProximityConfig {
    fn validate(&self) -> Result<()> {
        if !(self.range_meters > 0.0 && self.range_meters.is_finite()) {
            return Err(Error::invalid_config_value(
                "proximity.range_meters",
                "must be a positive number",
            ));
        }
        Ok(())
    }
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            range_meters: default_range_meters(),
        }
    }
}

fn default_range_meters() -> f64 {
    200.0
}

/// Confirmation tray animation timings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrayConfig {
    #[serde(default = "default_slide_in_ms")]
    pub slide_in_ms: u64,

    #[serde(default = "default_slide_out_ms")]
    pub slide_out_ms: u64,

    /// How long the confirmed tray stays on screen
    #[serde(default = "default_confirm_display_ms")]
    pub confirm_display_ms: u64,

    #[serde(default = "default_confirm_slide_out_ms")]
    pub confirm_slide_out_ms: u64,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            slide_in_ms: default_slide_in_ms(),
            slide_out_ms: default_slide_out_ms(),
            confirm_display_ms: default_confirm_display_ms(),
            confirm_slide_out_ms: default_confirm_slide_out_ms(),
        }
    }
}

fn default_slide_in_ms() -> u64 {
    500
}

fn default_slide_out_ms() -> u64 {
    300
}

fn default_confirm_display_ms() -> u64 {
    2000
}

fn default_confirm_slide_out_ms() -> u64 {
    700
}

/// Remote API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://edsondoes.pythonanywhere.com/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

/// Local session persistence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Path of the session file (platform data dir when unset)
    #[serde(default)]
    pub store_path: Option<String>,

    /// Points granted when the server does not report a balance
    #[serde(default = "default_points")]
    pub default_points: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            default_points: default_points(),
        }
    }
}

fn default_points() -> u64 {
    1250
}

/// Pickup request dispatch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    /// Delay between requesting a pickup and the unit being assigned
    #[serde(default = "default_assignment_delay_ms")]
    pub assignment_delay_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            assignment_delay_ms: default_assignment_delay_ms(),
        }
    }
}

fn default_assignment_delay_ms() -> u64 {
    3500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let schema = ConfigSchema::default();
        assert!(schema.validate().is_ok());
        assert_eq!(schema.proximity.range_meters, 200.0);
        assert_eq!(schema.simulation.tick_interval(), Duration::from_secs(2));
        assert_eq!(schema.tray.confirm_display_ms, 2000);
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let mut schema = ConfigSchema::default();
        schema.simulation.approach_fraction = 1.5;
        assert!(schema.validate().is_err());

        schema.simulation.approach_fraction = 0.0;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_interval_and_range() {
        let mut schema = ConfigSchema::default();
        schema.simulation.tick_interval_ms = 0;
        assert!(schema.validate().is_err());

        let mut schema = ConfigSchema::default();
        schema.proximity.range_meters = 0.0;
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_eta_range() {
        let mut schema = ConfigSchema::default();
        schema.simulation.eta_min_minutes = 30;
        assert!(schema.validate().is_err());
    }
}
