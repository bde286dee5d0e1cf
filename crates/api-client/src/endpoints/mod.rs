//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for a specific set of backend endpoints.
//!
//! | Module | Backend route | Description |
//! |--------|---------------|-------------|
//! | `auth` | `token/`, `register/` | Sign-in and account creation |
//! | `stats` | `update-stats/` | Incremental points / pickup counters |

pub mod auth;
pub mod stats;

pub use auth::AuthApi;
pub use stats::StatsApi;
