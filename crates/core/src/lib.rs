//! Core utilities for EcoRoute
//!
//! This crate provides shared functionality used across the workspace:
//!
//! - **Error handling**: errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Retry**: async exponential backoff for best-effort remote calls
//!
//! # Example
//!
//! ```rust,no_run
//! use ecoroute_core::config::Config;
//!
//! let config = Config::load(None).expect("invalid configuration");
//! println!("Proximity range: {} m", config.schema.proximity.range_meters);
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod retry;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::retry::{retry_async, RetryConfig, RetryFailure, RetryResult};
}
