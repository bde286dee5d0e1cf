//! Vehicle position simulator.
//!
//! Every tick, ambient vehicles wander by a small random jitter and get a
//! fresh random ETA. The pursued vehicle, if any, instead closes a fixed
//! fraction of its remaining distance to the anchor and its ETA is derived
//! from that distance.

use crate::vehicle::{Fleet, VehicleId};
use ecoroute_core::config::SimulationConfig;
use ecoroute_geo::{haversine_distance_meters, lerp, Coordinate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Numeric parameters of the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    /// Full width of the uniform jitter window, in degrees
    pub jitter_degrees: f64,
    pub eta_min_minutes: u32,
    pub eta_max_minutes: u32,
    /// Share of the remaining distance the pursued vehicle covers per tick
    pub approach_fraction: f64,
    /// Assumed ground speed of the pursued vehicle
    pub meters_per_eta_minute: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

impl From<&SimulationConfig> for SimulatorSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            jitter_degrees: config.jitter_degrees,
            eta_min_minutes: config.eta_min_minutes,
            eta_max_minutes: config.eta_max_minutes,
            approach_fraction: config.approach_fraction,
            meters_per_eta_minute: config.meters_per_eta_minute,
        }
    }
}

/// A vehicle being driven toward a point.
#[derive(Debug, Clone, Copy)]
pub struct Pursuit<'a> {
    pub vehicle: &'a VehicleId,
    pub toward: Coordinate,
}

/// Advances a [`Fleet`] one step at a time.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    settings: SimulatorSettings,
}

impl Simulator {
    pub fn new(settings: SimulatorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SimulatorSettings {
        &self.settings
    }

    /// Advance every vehicle by one tick.
    ///
    /// `pursuit` is only given while tracking is active and an anchor exists;
    /// without it every vehicle is ambient.
    pub fn tick<R: Rng + ?Sized>(&self, fleet: &mut Fleet, pursuit: Option<Pursuit<'_>>, rng: &mut R) {
        for vehicle in fleet.iter_mut() {
            match pursuit {
                Some(p) if &vehicle.id == p.vehicle => {
                    vehicle.position =
                        lerp(&vehicle.position, &p.toward, self.settings.approach_fraction);
                    let remaining = haversine_distance_meters(&vehicle.position, &p.toward);
                    vehicle.eta_minutes = self.eta_for(remaining);
                    trace!(vehicle = %vehicle.id, remaining_m = remaining, "Pursuit step");
                }
                _ => {
                    let j = self.settings.jitter_degrees;
                    vehicle.position = Coordinate::new(
                        vehicle.position.latitude + (rng.gen_range(0.0..1.0) - 0.5) * j,
                        vehicle.position.longitude + (rng.gen_range(0.0..1.0) - 0.5) * j,
                    );
                    vehicle.eta_minutes = rng
                        .gen_range(self.settings.eta_min_minutes..=self.settings.eta_max_minutes);
                }
            }
        }
    }

    /// Minutes to cover `distance_m`, at least one
    pub fn eta_for(&self, distance_m: f64) -> u32 {
        let minutes = (distance_m / self.settings.meters_per_eta_minute).ceil();
        if minutes.is_finite() && minutes >= 1.0 {
            minutes.min(f64::from(u32::MAX)) as u32
        } else {
            1
        }
    }
}
