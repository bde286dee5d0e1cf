//! Synchronous core of the live map.
//!
//! [`MapFlow`] owns the fleet, the anchor, the tracking assignment, the latest
//! proximity result, the tray and its single pending timer. Every operation
//! returns the [`FlowEvent`]s it produced so a driver can forward them. Time
//! only moves through [`MapFlow::advance`], which makes the whole flow
//! testable without a clock.

use crate::error::{TrackerError, TrackerResult};
use crate::proximity::{self, ProximityResult, ProximityRule};
use crate::simulator::{Pursuit, Simulator, SimulatorSettings};
use crate::tray::{Easing, Motion, TrayEffect, TrayEvent, TrayState, TrayTimings};
use crate::vehicle::{Fleet, Vehicle, VehicleCategory, VehicleId};
use ecoroute_core::config::ConfigSchema;
use ecoroute_geo::Coordinate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Something that happened on the map, in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FlowEvent {
    TrayAnimation {
        motion: Motion,
        duration_ms: u64,
        easing: Easing,
    },
    Haptic,
    /// The user confirmed a pickup; the session counter must be incremented
    PickupConfirmed,
    TrayStateChanged {
        from: TrayState,
        to: TrayState,
    },
    /// Nearest vehicle changed, or the result appeared or was cleared
    ProximityChanged {
        result: Option<ProximityResult>,
    },
    TrackingStarted {
        vehicle: VehicleId,
        category: VehicleCategory,
    },
    TrackingCancelled,
    /// Tracking ended after a confirmed pickup and all flow state was cleared
    FlowReset,
}

/// Current tracking assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    pub vehicle: VehicleId,
    pub category: VehicleCategory,
}

/// Everything a [`MapFlow`] needs besides its fleet.
#[derive(Debug, Clone, Default)]
pub struct FlowSettings {
    pub simulator: SimulatorSettings,
    pub proximity: ProximityRule,
    pub timings: TrayTimings,
    /// Vehicle assigned to pickup requests; the first vehicle when unset
    pub target: Option<VehicleId>,
}

impl From<&ConfigSchema> for FlowSettings {
    fn from(schema: &ConfigSchema) -> Self {
        Self {
            simulator: SimulatorSettings::from(&schema.simulation),
            proximity: ProximityRule::from(&schema.proximity),
            timings: TrayTimings::from(&schema.tray),
            target: schema.simulation.target_vehicle.as_deref().map(VehicleId::from),
        }
    }
}

/// Serializable view of a [`MapFlow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub anchor: Option<Coordinate>,
    pub tray: TrayState,
    pub proximity: Option<ProximityResult>,
    pub tracking: Option<Tracking>,
    pub confirmed: bool,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Debug, Clone)]
pub struct MapFlow {
    fleet: Fleet,
    simulator: Simulator,
    rule: ProximityRule,
    timings: TrayTimings,
    target: Option<VehicleId>,
    anchor: Option<Coordinate>,
    tracking: Option<Tracking>,
    confirmed: bool,
    proximity: Option<ProximityResult>,
    tray: TrayState,
    timer: Option<Duration>,
}

impl MapFlow {
    /// Create a flow over `fleet`.
    ///
    /// Fails when the configured target vehicle is not in the fleet.
    pub fn new(fleet: Fleet, settings: FlowSettings) -> TrackerResult<Self> {
        let target = match settings.target {
            Some(id) if fleet.get(&id).is_none() => return Err(TrackerError::UnknownVehicle(id)),
            Some(id) => Some(id),
            None => fleet.first().map(|v| v.id.clone()),
        };

        Ok(Self {
            fleet,
            simulator: Simulator::new(settings.simulator),
            rule: settings.proximity,
            timings: settings.timings,
            target,
            anchor: None,
            tracking: None,
            confirmed: false,
            proximity: None,
            tray: TrayState::Hidden,
            timer: None,
        })
    }

    /// Place the anchor. Any tray on screen disappears immediately and
    /// confirmation state is cleared.
    pub fn set_anchor(&mut self, anchor: Coordinate) -> Vec<FlowEvent> {
        info!(%anchor, "Anchor set");
        self.anchor = Some(anchor);
        self.invalidate()
    }

    /// Remove the anchor, hiding the tray
    pub fn clear_anchor(&mut self) -> Vec<FlowEvent> {
        info!("Anchor cleared");
        self.anchor = None;
        self.invalidate()
    }

    fn invalidate(&mut self) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        self.apply(TrayEvent::ForceHide, &mut out);
        self.confirmed = false;
        self.clear_proximity(&mut out);
        out
    }

    /// Assign a pickup to the target vehicle and start driving it to the anchor
    pub fn start_tracking(&mut self, category: VehicleCategory) -> TrackerResult<Vec<FlowEvent>> {
        let id = self.target.clone().ok_or(TrackerError::NoTargetVehicle)?;
        let vehicle = self
            .fleet
            .get_mut(&id)
            .ok_or_else(|| TrackerError::UnknownVehicle(id.clone()))?;
        vehicle.category = category;

        info!(vehicle = %id, %category, "Tracking started");
        self.confirmed = false;
        self.tracking = Some(Tracking {
            vehicle: id.clone(),
            category,
        });

        Ok(vec![FlowEvent::TrackingStarted {
            vehicle: id,
            category,
        }])
    }

    /// Abandon the current pickup request
    pub fn cancel_tracking(&mut self) -> Vec<FlowEvent> {
        if self.tracking.take().is_none() {
            return Vec::new();
        }
        info!("Tracking cancelled");
        self.confirmed = false;
        vec![FlowEvent::TrackingCancelled]
    }

    /// Move the fleet one step and re-evaluate proximity
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<FlowEvent> {
        let mut out = Vec::new();

        let pursuit = match (&self.tracking, self.anchor) {
            (Some(tracking), Some(toward)) => Some(Pursuit {
                vehicle: &tracking.vehicle,
                toward,
            }),
            _ => None,
        };
        self.simulator.tick(&mut self.fleet, pursuit, rng);

        let Some(result) = proximity::evaluate(&self.fleet, self.anchor.as_ref()) else {
            return out;
        };

        let tracked = self.tracking.as_ref().map(|t| &t.vehicle);
        let show = self.rule.should_show(&result, tracked, self.confirmed);
        debug!(
            nearest = %result.nearest_vehicle_id,
            distance_m = result.distance_m,
            show,
            "Proximity evaluated"
        );

        let changed = self
            .proximity
            .as_ref()
            .is_none_or(|prev| prev.nearest_vehicle_id != result.nearest_vehicle_id);
        self.proximity = Some(result);
        if changed {
            out.push(FlowEvent::ProximityChanged {
                result: self.proximity.clone(),
            });
        }

        if let Some(event) = proximity::decide(show, self.tray) {
            self.apply(event, &mut out);
        }
        out
    }

    /// Confirm the pickup.
    ///
    /// Only acts while the tray is visible and a proximity result exists;
    /// anything else is a no-op, so the counter is never incremented twice.
    pub fn confirm(&mut self) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        if self.proximity.is_none() || self.confirmed {
            debug!(tray = %self.tray, "Confirm ignored");
            return out;
        }
        self.apply(TrayEvent::Confirm, &mut out);
        out
    }

    /// Let `elapsed` pass on the pending timer, firing it (and any timer it
    /// starts) as often as the elapsed time allows.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<FlowEvent> {
        let mut out = Vec::new();
        let mut left = elapsed;

        while let Some(remaining) = self.timer {
            if left < remaining {
                self.timer = Some(remaining - left);
                break;
            }
            left -= remaining;
            self.timer = None;
            self.apply(TrayEvent::TimerElapsed, &mut out);
        }
        out
    }

    fn apply(&mut self, event: TrayEvent, out: &mut Vec<FlowEvent>) {
        let Some(transition) = self.tray.transition(event, &self.timings) else {
            return;
        };

        for effect in transition.effects {
            match effect {
                TrayEffect::Animate {
                    motion,
                    duration,
                    easing,
                } => out.push(FlowEvent::TrayAnimation {
                    motion,
                    duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
                    easing,
                }),
                TrayEffect::Haptic => out.push(FlowEvent::Haptic),
                TrayEffect::IncrementPickups => {
                    self.confirmed = true;
                    out.push(FlowEvent::PickupConfirmed);
                }
                TrayEffect::StartTimer(duration) => self.timer = Some(duration),
                TrayEffect::CancelTimer => self.timer = None,
                TrayEffect::ClearProximity => self.clear_proximity(out),
                TrayEffect::ResetFlow => {
                    self.tracking = None;
                    self.confirmed = false;
                    self.clear_proximity(out);
                    out.push(FlowEvent::FlowReset);
                }
            }
        }

        if transition.next != self.tray {
            let from = std::mem::replace(&mut self.tray, transition.next);
            info!(%from, to = %self.tray, "Tray transition");
            out.push(FlowEvent::TrayStateChanged {
                from,
                to: self.tray,
            });
        }
    }

    fn clear_proximity(&mut self, out: &mut Vec<FlowEvent>) {
        if self.proximity.take().is_some() {
            out.push(FlowEvent::ProximityChanged { result: None });
        }
    }

    /// Time left on the pending tray timer
    pub fn pending_timer(&self) -> Option<Duration> {
        self.timer
    }

    pub fn tray(&self) -> TrayState {
        self.tray
    }

    pub fn anchor(&self) -> Option<Coordinate> {
        self.anchor
    }

    pub fn proximity(&self) -> Option<&ProximityResult> {
        self.proximity.as_ref()
    }

    pub fn tracking(&self) -> Option<&Tracking> {
        self.tracking.as_ref()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn target(&self) -> Option<&VehicleId> {
        self.target.as_ref()
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            anchor: self.anchor,
            tray: self.tray,
            proximity: self.proximity.clone(),
            tracking: self.tracking.clone(),
            confirmed: self.confirmed,
            vehicles: self.fleet.iter().cloned().collect(),
        }
    }
}
