//! HTTP client for the EcoRoute backend
//!
//! Covers the three routes the app consumes:
//!
//! - `POST token/`: sign in, returns a bearer token and profile
//! - `POST register/`: create a citizen account
//! - `POST update-stats/`: bearer-authenticated counter deltas
//!
//! # Example
//!
//! ```rust,no_run
//! use ecoroute_api_client::{EcoRouteClient, StatsUpdate};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EcoRouteClient::new()?;
//!
//!     let login = client.auth().login("ana@example.org", "secret").await?;
//!     client.stats().update(&login.access, &StatsUpdate::pickup()).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;

pub use client::EcoRouteClient;
pub use config::{ClientConfig, Environment};
pub use endpoints::auth::{LoginResponse, RegisterRequest, RegisterResponse};
pub use endpoints::stats::StatsUpdate;
pub use error::{ApiError, ApiResult};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::EcoRouteClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{AuthApi, StatsApi};
    pub use crate::error::{ApiError, ApiResult};
}
