//! The user session object.
//!
//! A [`Session`] is created once at startup, hydrated from its
//! [`KeyValueStore`], and handed by reference to whatever needs identity or
//! the gamification counters. Counter mutations commit locally first and then
//! enqueue a delta on the [`StatsSyncer`]; remote failures never undo them.

use crate::error::{SessionError, SessionResult};
use crate::level::{level_progress, CitizenLevel};
use crate::store::KeyValueStore;
use crate::sync::{StatsSyncer, SyncReport};
use ecoroute_api_client::{ApiError, EcoRouteClient, LoginResponse, StatsUpdate};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Points granted to a fresh sign-in when the server reports none
pub const DEFAULT_POINTS: u64 = 1250;

/// Persisted keys
pub mod keys {
    pub const TOKEN: &str = "userToken";
    pub const ROLE: &str = "userRol";
    pub const NAME: &str = "userName";
    pub const EMAIL: &str = "userEmail";
    pub const POINTS: &str = "userPuntos";
    pub const PICKUPS: &str = "userRecolecciones";
    pub const PHONE: &str = "userTelf";
    pub const ADDRESS: &str = "userDireccion";
    pub const SECTOR: &str = "userSector";

    /// Every key the session owns, cleared together on sign-out
    pub const ALL: [&str; 9] = [
        TOKEN, ROLE, NAME, EMAIL, POINTS, PICKUPS, PHONE, ADDRESS, SECTOR,
    ];
}

/// Identity and counters of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub points: u64,
    pub pickup_count: u64,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub sector: Option<String>,
}

impl SessionData {
    /// Signed in means both a token and a role are known
    pub fn is_signed_in(&self) -> bool {
        self.token.is_some() && self.role.is_some()
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Not yet hydrated from the store
    Loading,
    SignedOut,
    SignedIn,
}

/// Something that can exchange credentials for a login payload.
pub trait AuthBackend: Send + Sync {
    fn login(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;
}

impl AuthBackend for EcoRouteClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.auth().login(email, password).await
    }
}

/// Receiver of confirmed pickups from the map flow.
pub trait PickupSink: Send + Sync + 'static {
    /// Record one completed pickup, returning the new local count
    fn record_pickup(&self) -> SessionResult<u64>;
}

impl<T: PickupSink> PickupSink for Arc<T> {
    fn record_pickup(&self) -> SessionResult<u64> {
        T::record_pickup(self)
    }
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    data: SessionData,
}

/// Explicit, shareable user session.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    inner: RwLock<Inner>,
    syncer: Mutex<Option<StatsSyncer>>,
    default_points: u64,
}

impl<S: KeyValueStore> Session<S> {
    /// Create an unhydrated session. Pass `None` to keep counters local only.
    pub fn new(store: S, syncer: Option<StatsSyncer>) -> Self {
        Self {
            store,
            inner: RwLock::new(Inner {
                state: SessionState::Loading,
                data: SessionData::default(),
            }),
            syncer: Mutex::new(syncer),
            default_points: DEFAULT_POINTS,
        }
    }

    /// Override the points granted when none are known
    #[must_use]
    pub fn with_default_points(mut self, points: u64) -> Self {
        self.default_points = points;
        self
    }

    /// Load persisted state.
    ///
    /// A store that cannot be read leaves the session signed out rather than
    /// failing; the error is logged.
    pub fn hydrate(&self) -> SessionState {
        let data = match self.read_persisted() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Could not read stored session; starting signed out");
                SessionData::default()
            }
        };

        let state = if data.is_signed_in() {
            SessionState::SignedIn
        } else {
            SessionState::SignedOut
        };

        info!(?state, "Session hydrated");
        let mut inner = self.write_inner();
        inner.state = state;
        inner.data = if data.is_signed_in() {
            data
        } else {
            SessionData::default()
        };
        state
    }

    fn read_persisted(&self) -> SessionResult<SessionData> {
        let token = self.store.get(keys::TOKEN)?;
        let role = self.store.get(keys::ROLE)?;

        let points = self
            .store
            .get(keys::POINTS)?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.default_points);
        let pickup_count = self
            .store
            .get(keys::PICKUPS)?
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        Ok(SessionData {
            token,
            role,
            name: self.store.get(keys::NAME)?,
            email: self.store.get(keys::EMAIL)?,
            points,
            pickup_count,
            phone: self.store.get(keys::PHONE)?,
            address: self.store.get(keys::ADDRESS)?,
            sector: self.store.get(keys::SECTOR)?,
        })
    }

    /// Authenticate and replace the whole session with the server's profile
    pub async fn sign_in<A: AuthBackend>(
        &self,
        auth: &A,
        email: &str,
        password: &str,
    ) -> SessionResult<SessionData> {
        let response = auth
            .login(email, password)
            .await
            .map_err(|e| SessionError::Auth(e.user_message()))?;

        let data = SessionData {
            token: Some(response.access),
            role: Some(response.role),
            name: Some(response.full_name.unwrap_or_else(|| "User".to_string())),
            email: Some(response.email.unwrap_or_default()),
            points: response.points.unwrap_or(self.default_points),
            pickup_count: response.pickups.unwrap_or(0),
            phone: response.phone,
            address: response.address,
            sector: response.sector,
        };

        if let Err(e) = self.persist_all(&data) {
            let previous = self.data();
            if let Err(restore) = self.persist_all(&previous) {
                warn!(error = %restore, "Failed to restore stored session");
            }
            return Err(e);
        }

        {
            let mut inner = self.write_inner();
            inner.state = SessionState::SignedIn;
            inner.data = data.clone();
        }

        info!(role = data.role.as_deref().unwrap_or_default(), "Signed in");
        Ok(data)
    }

    fn persist_all(&self, data: &SessionData) -> SessionResult<()> {
        self.store.remove(&keys::ALL)?;

        let points = data.points.to_string();
        let pickups = data.pickup_count.to_string();
        let fields = [
            (keys::TOKEN, data.token.as_deref()),
            (keys::ROLE, data.role.as_deref()),
            (keys::NAME, data.name.as_deref()),
            (keys::EMAIL, data.email.as_deref()),
            (keys::POINTS, Some(points.as_str())),
            (keys::PICKUPS, Some(pickups.as_str())),
            (keys::PHONE, data.phone.as_deref()),
            (keys::ADDRESS, data.address.as_deref()),
            (keys::SECTOR, data.sector.as_deref()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                self.store.set(key, value)?;
            }
        }
        Ok(())
    }

    /// Clear everything. Memory is always cleared even if storage fails.
    pub fn sign_out(&self) {
        if let Err(e) = self.store.remove(&keys::ALL) {
            warn!(error = %e, "Failed to clear stored session");
        }

        let mut inner = self.write_inner();
        inner.state = SessionState::SignedOut;
        inner.data = SessionData::default();
        info!("Signed out");
    }

    /// Add one completed pickup; returns the new count.
    ///
    /// The in-memory count is authoritative: a failed write is logged and the
    /// delta is still queued for sync.
    pub fn increment_pickup_count(&self) -> SessionResult<u64> {
        let (count, token) = {
            let mut inner = self.write_inner();
            inner.data.pickup_count = inner.data.pickup_count.saturating_add(1);
            (inner.data.pickup_count, inner.data.token.clone())
        };

        self.persist_counter(keys::PICKUPS, count);
        debug!(pickup_count = count, "Pickup recorded");

        self.enqueue(token, StatsUpdate::pickup());
        Ok(count)
    }

    /// Award points; returns the new balance
    pub fn add_points(&self, amount: u64) -> SessionResult<u64> {
        let (points, token) = {
            let mut inner = self.write_inner();
            inner.data.points = inner.data.points.saturating_add(amount);
            (inner.data.points, inner.data.token.clone())
        };

        self.persist_counter(keys::POINTS, points);
        debug!(points, amount, "Points added");

        let delta = i64::try_from(amount).unwrap_or(i64::MAX);
        self.enqueue(token, StatsUpdate::points(delta));
        Ok(points)
    }

    fn persist_counter(&self, key: &str, value: u64) {
        if let Err(e) = self.store.set(key, &value.to_string()) {
            warn!(error = %e, key, value, "Failed to persist counter; keeping it in memory");
        }
    }

    fn enqueue(&self, token: Option<String>, update: StatsUpdate) {
        let Some(token) = token else {
            return;
        };
        let syncer = self.syncer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(syncer) = syncer.as_ref() {
            if !syncer.enqueue(&token, update) {
                warn!("Stats sync task is gone; update kept locally only");
            }
        }
    }

    /// Stop the sync task after it drains, if one is attached
    pub async fn close(&self) -> Option<SyncReport> {
        let syncer = self
            .syncer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match syncer {
            Some(syncer) => Some(syncer.shutdown().await),
            None => None,
        }
    }

    /// Snapshot of the current data
    pub fn data(&self) -> SessionData {
        self.read_inner().data.clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.read_inner().state
    }

    pub fn is_signed_in(&self) -> bool {
        self.state() == SessionState::SignedIn
    }

    /// Tier for the current pickup count
    pub fn citizen_level(&self) -> CitizenLevel {
        CitizenLevel::for_pickups(self.read_inner().data.pickup_count)
    }

    /// Progress toward the next tier cycle, in `[0, 1)`
    pub fn level_progress(&self) -> f64 {
        level_progress(self.read_inner().data.pickup_count)
    }

    /// Backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_inner(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: KeyValueStore + 'static> PickupSink for Session<S> {
    fn record_pickup(&self) -> SessionResult<u64> {
        self.increment_pickup_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::sync::testing::RecordingSink;

    struct FakeAuth {
        response: Result<LoginResponse, u16>,
    }

    impl FakeAuth {
        fn ok() -> Self {
            Self {
                response: Ok(LoginResponse {
                    access: "tok-123".to_string(),
                    refresh: None,
                    role: "ciudadano".to_string(),
                    email: Some("ana@example.org".to_string()),
                    full_name: None,
                    phone: Some("+51900000000".to_string()),
                    address: None,
                    sector: Some("Centro".to_string()),
                    points: None,
                    pickups: Some(7),
                }),
            }
        }

        fn rejecting() -> Self {
            Self { response: Err(401) }
        }
    }

    impl AuthBackend for FakeAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse, ApiError> {
            match &self.response {
                Ok(r) => Ok(r.clone()),
                Err(status) => Err(ApiError::api_response(
                    *status,
                    "No active account found with the given credentials",
                )),
            }
        }
    }

    /// Store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> SessionResult<Option<String>> {
            Err(SessionError::storage("disk gone"))
        }
        fn set(&self, _key: &str, _value: &str) -> SessionResult<()> {
            Err(SessionError::storage("disk gone"))
        }
        fn remove(&self, _keys: &[&str]) -> SessionResult<()> {
            Err(SessionError::storage("disk gone"))
        }
    }

    /// Memory store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: std::sync::atomic::AtomicBool,
    }

    impl FlakyStore {
        fn break_writes(&self) {
            self.fail_writes.store(true, std::sync::atomic::Ordering::SeqCst);
        }

        fn check(&self) -> SessionResult<()> {
            if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
                Err(SessionError::storage("disk full"))
            } else {
                Ok(())
            }
        }
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> SessionResult<Option<String>> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> SessionResult<()> {
            self.check()?;
            self.inner.set(key, value)
        }
        fn remove(&self, keys: &[&str]) -> SessionResult<()> {
            self.check()?;
            self.inner.remove(keys)
        }
    }

    #[test]
    fn test_hydrate_requires_token_and_role() {
        let store = MemoryStore::new();
        store.set(keys::TOKEN, "tok").unwrap();
        let session = Session::new(store, None);
        assert_eq!(session.state(), SessionState::Loading);

        assert_eq!(session.hydrate(), SessionState::SignedOut);
        assert_eq!(session.data(), SessionData::default());

        session.store().set(keys::ROLE, "ciudadano").unwrap();
        assert_eq!(session.hydrate(), SessionState::SignedIn);
    }

    #[test]
    fn test_hydrate_falls_back_on_bad_numbers() {
        let store = MemoryStore::new();
        store.set(keys::TOKEN, "tok").unwrap();
        store.set(keys::ROLE, "ciudadano").unwrap();
        store.set(keys::POINTS, "lots").unwrap();
        store.set(keys::PICKUPS, "-3").unwrap();

        let session = Session::new(store, None);
        session.hydrate();

        let data = session.data();
        assert_eq!(data.points, DEFAULT_POINTS);
        assert_eq!(data.pickup_count, 0);
    }

    #[test]
    fn test_hydrate_unreadable_store_is_signed_out() {
        let session = Session::new(BrokenStore, None);
        assert_eq!(session.hydrate(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_in_replaces_and_persists() {
        let store = MemoryStore::new();
        store.set(keys::ADDRESS, "stale address").unwrap();
        let session = Session::new(store, None);
        session.hydrate();

        let data = session.sign_in(&FakeAuth::ok(), "ana@example.org", "pw").await.unwrap();

        assert_eq!(data.name.as_deref(), Some("User"));
        assert_eq!(data.points, DEFAULT_POINTS);
        assert_eq!(data.pickup_count, 7);
        assert!(session.is_signed_in());

        let store = session.store();
        assert_eq!(store.get(keys::TOKEN).unwrap().as_deref(), Some("tok-123"));
        assert_eq!(store.get(keys::POINTS).unwrap().as_deref(), Some("1250"));
        assert_eq!(store.get(keys::ADDRESS).unwrap(), None);

        let reloaded = Session::new(MemoryStore::new(), None);
        for key in keys::ALL {
            if let Some(v) = store.get(key).unwrap() {
                reloaded.store().set(key, &v).unwrap();
            }
        }
        reloaded.hydrate();
        assert_eq!(reloaded.data(), data);
    }

    #[tokio::test]
    async fn test_sign_in_failure_keeps_state() {
        let session = Session::new(MemoryStore::new(), None);
        session.hydrate();

        let err = session
            .sign_in(&FakeAuth::rejecting(), "ana@example.org", "bad")
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Auth(ref m) if m.contains("No active account")));
        assert_eq!(session.state(), SessionState::SignedOut);
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let session = Session::new(MemoryStore::new(), None);
        session.sign_in(&FakeAuth::ok(), "a", "b").await.unwrap();
        session.increment_pickup_count().unwrap();

        session.sign_out();

        assert_eq!(session.state(), SessionState::SignedOut);
        assert_eq!(session.data(), SessionData::default());
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_sign_out_survives_storage_failure() {
        let session = Session::new(BrokenStore, None);
        session.sign_out();
        assert_eq!(session.state(), SessionState::SignedOut);
    }

    #[tokio::test]
    async fn test_increment_syncs_when_signed_in() {
        let sink = Arc::new(RecordingSink::default());
        let session = Session::new(MemoryStore::new(), Some(StatsSyncer::spawn(Arc::clone(&sink))));
        session.sign_in(&FakeAuth::ok(), "a", "b").await.unwrap();

        assert_eq!(session.increment_pickup_count().unwrap(), 8);
        assert_eq!(session.add_points(40).unwrap(), 1290);
        assert_eq!(
            session.store().get(keys::PICKUPS).unwrap().as_deref(),
            Some("8")
        );

        let report = session.close().await.unwrap();
        assert_eq!(report.failed, 0);

        let total = sink
            .pushes()
            .into_iter()
            .inspect(|(token, _)| assert_eq!(token, "tok-123"))
            .fold(StatsUpdate::default(), |acc, (_, u)| acc + u);
        assert_eq!(total, StatsUpdate { points_delta: 40, pickups_delta: 1 });
    }

    #[tokio::test]
    async fn test_sync_failure_never_rolls_back() {
        let sink = Arc::new(RecordingSink::failing());
        let session = Session::new(MemoryStore::new(), Some(StatsSyncer::spawn(Arc::clone(&sink))));
        session.sign_in(&FakeAuth::ok(), "a", "b").await.unwrap();

        session.increment_pickup_count().unwrap();
        session.increment_pickup_count().unwrap();
        let report = session.close().await.unwrap();

        assert!(report.failed >= 1);
        assert_eq!(session.data().pickup_count, 9);
        assert_eq!(
            session.store().get(keys::PICKUPS).unwrap().as_deref(),
            Some("9")
        );
    }

    #[tokio::test]
    async fn test_no_sync_without_token() {
        let sink = Arc::new(RecordingSink::default());
        let session = Session::new(MemoryStore::new(), Some(StatsSyncer::spawn(Arc::clone(&sink))));
        session.hydrate();

        assert_eq!(session.increment_pickup_count().unwrap(), 1);
        session.close().await;

        assert!(sink.pushes().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_with_unwritable_store_stays_signed_out() {
        let session = Session::new(BrokenStore, None);
        session.hydrate();

        let err = session.sign_in(&FakeAuth::ok(), "a", "b").await.unwrap_err();

        assert!(matches!(err, SessionError::Storage(_)));
        assert!(!session.is_signed_in());
        assert_eq!(session.state(), SessionState::SignedOut);
        assert_eq!(session.data(), SessionData::default());
    }

    #[tokio::test]
    async fn test_sign_in_write_failure_keeps_previous_identity() {
        let session = Session::new(FlakyStore::default(), None);
        session.sign_in(&FakeAuth::ok(), "a", "b").await.unwrap();
        let before = session.data();

        session.store().break_writes();
        assert!(session.sign_in(&FakeAuth::ok(), "a", "b").await.is_err());

        assert!(session.is_signed_in());
        assert_eq!(session.data(), before);
    }

    #[tokio::test]
    async fn test_increment_survives_write_failure_and_still_syncs() {
        let sink = Arc::new(RecordingSink::default());
        let session = Session::new(
            FlakyStore::default(),
            Some(StatsSyncer::spawn(Arc::clone(&sink))),
        );
        session.sign_in(&FakeAuth::ok(), "a", "b").await.unwrap();
        session.store().break_writes();

        assert_eq!(session.increment_pickup_count().unwrap(), 8);
        assert_eq!(session.add_points(10).unwrap(), DEFAULT_POINTS + 10);
        assert_eq!(session.data().pickup_count, 8);
        assert_eq!(
            session.store().get(keys::PICKUPS).unwrap().as_deref(),
            Some("7")
        );

        session.close().await;
        let total = sink
            .pushes()
            .into_iter()
            .fold(StatsUpdate::default(), |acc, (_, u)| acc + u);
        assert_eq!(total, StatsUpdate { points_delta: 10, pickups_delta: 1 });
    }

    #[test]
    fn test_pickup_sink_and_level() {
        let session = Arc::new(Session::new(MemoryStore::new(), None));
        session.hydrate();

        for _ in 0..10 {
            session.record_pickup().unwrap();
        }
        assert_eq!(session.citizen_level(), CitizenLevel::Responsible);
        assert!((session.level_progress() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_custom_default_points() {
        let store = MemoryStore::new();
        store.set(keys::TOKEN, "t").unwrap();
        store.set(keys::ROLE, "ciudadano").unwrap();
        let session = Session::new(store, None).with_default_points(10);
        session.hydrate();
        assert_eq!(session.data().points, 10);
    }
}
