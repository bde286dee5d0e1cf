//! Proximity evaluation between the anchor and the fleet.

use crate::tray::{TrayEvent, TrayState};
use crate::vehicle::{Fleet, VehicleId};
use ecoroute_core::config::ProximityConfig;
use ecoroute_geo::{nearest, Coordinate};
use serde::{Deserialize, Serialize};

/// Nearest vehicle to the anchor, recomputed on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    pub nearest_vehicle_id: VehicleId,
    pub distance_m: f64,
}

/// Find the vehicle nearest to `anchor`.
///
/// Returns `None` without an anchor or with an empty fleet. Equidistant
/// vehicles resolve to the one listed first.
pub fn evaluate(fleet: &Fleet, anchor: Option<&Coordinate>) -> Option<ProximityResult> {
    let anchor = anchor?;
    let hit = nearest(anchor, fleet.positions())?;
    let vehicle = fleet.at(hit.index)?;
    Some(ProximityResult {
        nearest_vehicle_id: vehicle.id.clone(),
        distance_m: hit.distance_m,
    })
}

/// Range check and tray visibility policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityRule {
    pub range_m: f64,
}

impl Default for ProximityRule {
    fn default() -> Self {
        Self::from(&ProximityConfig::default())
    }
}

impl From<&ProximityConfig> for ProximityRule {
    fn from(config: &ProximityConfig) -> Self {
        Self {
            range_m: config.range_meters,
        }
    }
}

impl ProximityRule {
    pub fn new(range_m: f64) -> Self {
        Self { range_m }
    }

    /// Strictly closer than the range; the boundary itself is out
    #[inline]
    pub fn in_range(&self, distance_m: f64) -> bool {
        distance_m < self.range_m
    }

    /// Whether the confirmation tray should be on screen.
    ///
    /// While tracking, only the tracked vehicle counts; otherwise any vehicle
    /// in range does. Nothing shows once the pickup is confirmed.
    pub fn should_show(
        &self,
        result: &ProximityResult,
        tracked: Option<&VehicleId>,
        confirmed: bool,
    ) -> bool {
        if confirmed || !self.in_range(result.distance_m) {
            return false;
        }
        match tracked {
            Some(target) => &result.nearest_vehicle_id == target,
            None => true,
        }
    }
}

/// Map a visibility decision onto a tray event, if one is needed
pub fn decide(should_show: bool, tray: TrayState) -> Option<TrayEvent> {
    match (should_show, tray) {
        (true, TrayState::Hidden) => Some(TrayEvent::Show),
        (false, state) if state.is_visible() => Some(TrayEvent::Hide),
        _ => None,
    }
}
