//! Configuration loading and schema definitions
//!
//! One TOML file configures the simulation, proximity range, tray timings,
//! API endpoint and session storage.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
