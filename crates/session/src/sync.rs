//! Fire-and-forget synchronization of counter deltas to the backend.
//!
//! Local mutations enqueue a [`StatsUpdate`] and return immediately. A single
//! background task drains the queue, merges consecutive updates for the same
//! token, and pushes them through a [`StatsSink`]. Failures are logged and
//! dropped; they never touch local state.

use ecoroute_api_client::{ApiError, EcoRouteClient, StatsUpdate};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Destination for counter deltas.
pub trait StatsSink: Send + Sync + 'static {
    /// Push one (possibly merged) update authenticated with `token`
    fn push(
        &self,
        token: &str,
        update: StatsUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl StatsSink for EcoRouteClient {
    async fn push(&self, token: &str, update: StatsUpdate) -> Result<(), ApiError> {
        let attempts = self.stats().update_with_retry(token, &update).await?;
        debug!(attempts, ?update, "Stats synced");
        Ok(())
    }
}

impl<T: StatsSink> StatsSink for Arc<T> {
    fn push(
        &self,
        token: &str,
        update: StatsUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        T::push(self, token, update)
    }
}

#[derive(Debug)]
struct SyncJob {
    token: String,
    update: StatsUpdate,
}

/// Outcome counters of the sync task, reported at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Updates handed to the sink (after merging)
    pub pushed: u64,
    /// Pushes that failed and were discarded
    pub failed: u64,
    /// Enqueued updates folded into a neighbor
    pub merged: u64,
}

/// Handle to the background sync task.
#[derive(Debug)]
pub struct StatsSyncer {
    tx: mpsc::UnboundedSender<SyncJob>,
    task: JoinHandle<SyncReport>,
}

impl StatsSyncer {
    /// Spawn the sync task on the current tokio runtime
    pub fn spawn<K: StatsSink>(sink: K) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(sink, rx));
        Self { tx, task }
    }

    /// Queue an update; never blocks. Returns false if the task is gone.
    pub fn enqueue(&self, token: &str, update: StatsUpdate) -> bool {
        if update.is_empty() {
            return true;
        }
        self.tx
            .send(SyncJob {
                token: token.to_string(),
                update,
            })
            .is_ok()
    }

    /// Stop accepting updates, drain what is queued, and wait for the task
    pub async fn shutdown(self) -> SyncReport {
        let Self { tx, task } = self;
        drop(tx);
        match task.await {
            Ok(report) => report,
            Err(e) => {
                warn!(error = %e, "Stats sync task ended abnormally");
                SyncReport::default()
            }
        }
    }
}

async fn run<K: StatsSink>(sink: K, mut rx: mpsc::UnboundedReceiver<SyncJob>) -> SyncReport {
    let mut report = SyncReport::default();
    let mut carry: Option<SyncJob> = None;

    loop {
        let job = match carry.take() {
            Some(job) => job,
            None => match rx.recv().await {
                Some(job) => job,
                None => break,
            },
        };

        // Fold whatever is already queued for the same token into one push
        let mut update = job.update;
        while let Ok(next) = rx.try_recv() {
            let merged = (next.token == job.token)
                .then(|| update.checked_add(next.update))
                .flatten();
            match merged {
                Some(sum) => {
                    update = sum;
                    report.merged += 1;
                }
                None => {
                    carry = Some(next);
                    break;
                }
            }
        }

        report.pushed += 1;
        if let Err(e) = sink.push(&job.token, update).await {
            report.failed += 1;
            warn!(
                error = %e,
                unauthorized = e.is_unauthorized(),
                points_delta = update.points_delta,
                pickups_delta = update.pickups_delta,
                "Stats sync failed; keeping local values"
            );
        }
    }

    debug!(?report, "Stats sync task stopped");
    report
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every push; optionally fails all of them.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub pushes: Mutex<Vec<(String, StatsUpdate)>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn pushes(&self) -> Vec<(String, StatsUpdate)> {
            self.pushes.lock().unwrap().clone()
        }
    }

    impl StatsSink for RecordingSink {
        async fn push(&self, token: &str, update: StatsUpdate) -> Result<(), ApiError> {
            self.pushes.lock().unwrap().push((token.to_string(), update));
            if self.fail {
                Err(ApiError::api_response(503, "Service Unavailable"))
            } else {
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSink;
    use super::*;

    #[tokio::test]
    async fn test_updates_reach_sink() {
        let sink = Arc::new(RecordingSink::default());
        let syncer = StatsSyncer::spawn(Arc::clone(&sink));

        assert!(syncer.enqueue("tok", StatsUpdate::pickup()));
        let report = syncer.shutdown().await;

        assert_eq!(report.failed, 0);
        let total = sink
            .pushes()
            .into_iter()
            .fold(StatsUpdate::default(), |acc, (_, u)| acc + u);
        assert_eq!(total, StatsUpdate::pickup());
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let sink = Arc::new(RecordingSink::failing());
        let syncer = StatsSyncer::spawn(Arc::clone(&sink));

        syncer.enqueue("tok", StatsUpdate::points(10));
        syncer.enqueue("tok", StatsUpdate::pickup());
        let report = syncer.shutdown().await;

        assert_eq!(report.pushed, report.failed);
        assert!(report.pushed >= 1);
    }

    #[tokio::test]
    async fn test_merges_only_same_token() {
        let sink = Arc::new(RecordingSink::default());
        let syncer = StatsSyncer::spawn(Arc::clone(&sink));

        syncer.enqueue("a", StatsUpdate::pickup());
        syncer.enqueue("a", StatsUpdate::points(5));
        syncer.enqueue("b", StatsUpdate::pickup());
        syncer.shutdown().await;

        let pushes = sink.pushes();
        let total_a = pushes
            .iter()
            .filter(|(t, _)| t == "a")
            .fold(StatsUpdate::default(), |acc, (_, u)| acc + *u);
        let total_b = pushes
            .iter()
            .filter(|(t, _)| t == "b")
            .fold(StatsUpdate::default(), |acc, (_, u)| acc + *u);
        assert_eq!(total_a, StatsUpdate { points_delta: 5, pickups_delta: 1 });
        assert_eq!(total_b, StatsUpdate::pickup());
    }

    #[tokio::test]
    async fn test_overflowing_deltas_are_pushed_separately() {
        let sink = Arc::new(RecordingSink::default());
        let syncer = StatsSyncer::spawn(Arc::clone(&sink));

        assert!(syncer.enqueue("tok", StatsUpdate::points(i64::MAX)));
        assert!(syncer.enqueue("tok", StatsUpdate::points(1)));
        assert!(syncer.enqueue("tok", StatsUpdate::pickup()));
        let report = syncer.shutdown().await;

        assert_eq!(report.failed, 0);
        assert_eq!(report.pushed, 2);
        assert_eq!(
            sink.pushes(),
            vec![
                ("tok".to_string(), StatsUpdate::points(i64::MAX)),
                ("tok".to_string(), StatsUpdate { points_delta: 1, pickups_delta: 1 }),
            ]
        );
    }

    #[tokio::test]
    async fn test_worker_survives_overflow_and_keeps_syncing() {
        let sink = Arc::new(RecordingSink::default());
        let syncer = StatsSyncer::spawn(Arc::clone(&sink));

        syncer.enqueue("tok", StatsUpdate::points(i64::MAX));
        syncer.enqueue("tok", StatsUpdate::points(i64::MAX));
        tokio::task::yield_now().await;
        assert!(syncer.enqueue("tok", StatsUpdate::pickup()));
        let report = syncer.shutdown().await;

        assert_eq!(report.pushed as usize, sink.pushes().len());
        let pickups: i64 = sink.pushes().iter().map(|(_, u)| u.pickups_delta).sum();
        assert_eq!(pickups, 1);
    }

    #[tokio::test]
    async fn test_empty_updates_are_not_sent() {
        let sink = Arc::new(RecordingSink::default());
        let syncer = StatsSyncer::spawn(Arc::clone(&sink));

        assert!(syncer.enqueue("tok", StatsUpdate::default()));
        let report = syncer.shutdown().await;

        assert_eq!(report.pushed, 0);
        assert!(sink.pushes().is_empty());
    }
}
