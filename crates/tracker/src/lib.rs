//! Live collection-truck map for EcoRoute
//!
//! - [`vehicle`]: trucks and the seeded reference fleet
//! - [`simulator`]: ambient jitter and pursuit of the anchor
//! - [`proximity`]: nearest truck and tray visibility policy
//! - [`tray`]: the confirmation tray as a pure state machine
//! - [`flow`]: everything above wired together, driven by explicit time
//! - [`driver`]: the flow running on a tokio task
//! - [`dispatch`]: operators that accept pickup requests
//! - [`schedule`]: the recurring weekly collection windows
//!
//! # Example
//!
//! ```rust,no_run
//! use ecoroute_geo::Coordinate;
//! use ecoroute_session::{MemoryStore, Session};
//! use ecoroute_tracker::{Fleet, FlowSettings, MapFlow, MapSession, VehicleCategory};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Arc::new(Session::new(MemoryStore::new(), None));
//! let flow = MapFlow::new(Fleet::seeded(), FlowSettings::default())?;
//!
//! let handle = MapSession::spawn(
//!     flow,
//!     Duration::from_secs(2),
//!     Arc::clone(&session),
//!     ChaCha8Rng::seed_from_u64(7),
//! );
//! handle.set_anchor(Coordinate::new(-9.9300, -76.2425))?;
//! handle.start_tracking(VehicleCategory::Organic).await?;
//! // ... later
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod flow;
pub mod proximity;
pub mod schedule;
pub mod simulator;
pub mod tray;
pub mod vehicle;

pub use dispatch::{Operator, PickupRequest, Roster};
pub use driver::{MapSession, MapSessionHandle, PICKUPS_COUNTER, TICKS_COUNTER, TICK_TIMER};
pub use error::{DispatchError, TrackerError, TrackerResult};
pub use flow::{FlowEvent, FlowSettings, FlowSnapshot, MapFlow, Tracking};
pub use proximity::{ProximityResult, ProximityRule};
pub use schedule::{CollectionSlot, Schedule};
pub use simulator::{Simulator, SimulatorSettings};
pub use tray::{Easing, Motion, TrayEffect, TrayEvent, TrayState, TrayTimings};
pub use vehicle::{Fleet, Vehicle, VehicleCategory, VehicleId};
