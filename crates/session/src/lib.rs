//! User session for EcoRoute
//!
//! - Flat key-value persistence ([`MemoryStore`], [`FileStore`])
//! - An explicit [`Session`] object: hydrate, sign in, sign out, counters
//! - Fire-and-forget stats synchronization ([`StatsSyncer`])
//! - Citizen level derived from the pickup count
//!
//! ```rust,no_run
//! use ecoroute_api_client::EcoRouteClient;
//! use ecoroute_session::{FileStore, Session, StatsSyncer};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = EcoRouteClient::new()?;
//! let store = FileStore::open(FileStore::default_path())?;
//! let session = Session::new(store, Some(StatsSyncer::spawn(client.clone())));
//!
//! session.hydrate();
//! session.sign_in(&client, "ana@example.org", "secret").await?;
//! session.increment_pickup_count()?;
//! session.close().await;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod level;
pub mod session;
pub mod store;
pub mod sync;

pub use error::{SessionError, SessionResult};
pub use level::{level_progress, CitizenLevel};
pub use session::{
    keys, AuthBackend, PickupSink, Session, SessionData, SessionState, DEFAULT_POINTS,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use sync::{StatsSink, StatsSyncer, SyncReport};
