//! Async driver for a [`MapFlow`].
//!
//! One tokio task owns the flow. Ticks, tray timer deadlines and commands are
//! serialized through a single `select!` loop, so the flow never sees two
//! things at once. Confirmed pickups reach the [`PickupSink`] before the next
//! event is handled. The task stops on [`MapSessionHandle::shutdown`] and is
//! aborted when the handle is dropped; nothing fires after teardown.

use crate::error::{TrackerError, TrackerResult};
use crate::flow::{FlowEvent, FlowSnapshot, MapFlow};
use crate::vehicle::VehicleCategory;
use ecoroute_geo::Coordinate;
use ecoroute_session::PickupSink;
use ecoroute_telemetry::{metrics, Timer};
use rand::Rng;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Capacity of the event broadcast; slow observers skip old events
const EVENT_BUFFER: usize = 256;

/// Counter of simulation ticks run by any session
pub const TICKS_COUNTER: &str = "map_ticks";
/// Counter of pickups confirmed by any session
pub const PICKUPS_COUNTER: &str = "pickups_confirmed";
/// Histogram of time spent in one tick, in milliseconds
pub const TICK_TIMER: &str = "map_tick_ms";

enum Command {
    SetAnchor(Coordinate),
    ClearAnchor,
    StartTracking {
        category: VehicleCategory,
        reply: oneshot::Sender<TrackerResult<()>>,
    },
    CancelTracking,
    Confirm,
    Snapshot(oneshot::Sender<FlowSnapshot>),
}

/// Entry point for running a flow in the background.
pub struct MapSession;

impl MapSession {
    /// Spawn the flow on the current runtime, ticking every `tick_interval`
    pub fn spawn<P, R>(flow: MapFlow, tick_interval: Duration, sink: P, rng: R) -> MapSessionHandle
    where
        P: PickupSink,
        R: Rng + Send + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let worker = Worker {
            flow,
            sink,
            rng,
            events: events_tx.clone(),
        };
        let task = tokio::spawn(worker.run(tick_interval, commands_rx, shutdown_rx));

        info!(tick_ms = tick_interval.as_millis() as u64, "Map session started");
        MapSessionHandle {
            commands: commands_tx,
            events: events_tx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Owner of a running map session.
pub struct MapSessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<FlowEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<MapFlow>>,
}

impl MapSessionHandle {
    /// Receive every event produced from now on
    pub fn subscribe(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    fn send(&self, command: Command) -> TrackerResult<()> {
        self.commands
            .send(command)
            .map_err(|_| TrackerError::SessionClosed)
    }

    pub fn set_anchor(&self, anchor: Coordinate) -> TrackerResult<()> {
        self.send(Command::SetAnchor(anchor))
    }

    pub fn clear_anchor(&self) -> TrackerResult<()> {
        self.send(Command::ClearAnchor)
    }

    /// Start tracking; resolves once the flow has accepted or rejected it
    pub async fn start_tracking(&self, category: VehicleCategory) -> TrackerResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::StartTracking { category, reply })?;
        rx.await.map_err(|_| TrackerError::SessionClosed)?
    }

    pub fn cancel_tracking(&self) -> TrackerResult<()> {
        self.send(Command::CancelTracking)
    }

    pub fn confirm(&self) -> TrackerResult<()> {
        self.send(Command::Confirm)
    }

    /// Current state, after every previously sent command has been handled
    pub async fn snapshot(&self) -> TrackerResult<FlowSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx))?;
        rx.await.map_err(|_| TrackerError::SessionClosed)
    }

    /// Stop the task and take back the flow
    pub async fn shutdown(mut self) -> TrackerResult<MapFlow> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let task = self.task.take().ok_or(TrackerError::SessionClosed)?;
        let flow = task.await.map_err(|e| {
            warn!(error = %e, "Map session task failed");
            TrackerError::SessionClosed
        })?;
        info!("Map session stopped");
        Ok(flow)
    }
}

impl Drop for MapSessionHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Worker<P, R> {
    flow: MapFlow,
    sink: P,
    rng: R,
    events: broadcast::Sender<FlowEvent>,
}

impl<P: PickupSink, R: Rng + Send + 'static> Worker<P, R> {
    async fn run(
        mut self,
        tick_interval: Duration,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut shutdown: oneshot::Receiver<()>,
    ) -> MapFlow {
        let mut ticker = time::interval_at(Instant::now() + tick_interval, tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = Instant::now();

        loop {
            let deadline = self.flow.pending_timer().map(|left| last + left);

            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                command = commands.recv() => {
                    let Some(command) = command else { break };
                    self.catch_up(&mut last);
                    self.handle(command);
                }

                _ = wait_until(deadline) => {
                    self.catch_up(&mut last);
                }

                _ = ticker.tick() => {
                    self.catch_up(&mut last);
                    let timer = Timer::start(TICK_TIMER);
                    let events = self.flow.tick(&mut self.rng);
                    timer.stop();
                    metrics().increment(TICKS_COUNTER);
                    self.publish(events);
                }
            }
        }

        debug!("Map session loop exited");
        self.flow
    }

    /// Run the tray timer up to now
    fn catch_up(&mut self, last: &mut Instant) {
        let now = Instant::now();
        let events = self.flow.advance(now - *last);
        *last = now;
        self.publish(events);
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::SetAnchor(anchor) => {
                let events = self.flow.set_anchor(anchor);
                self.publish(events);
            }
            Command::ClearAnchor => {
                let events = self.flow.clear_anchor();
                self.publish(events);
            }
            Command::StartTracking { category, reply } => {
                let result = self.flow.start_tracking(category).map(|events| {
                    self.publish(events);
                });
                let _ = reply.send(result);
            }
            Command::CancelTracking => {
                let events = self.flow.cancel_tracking();
                self.publish(events);
            }
            Command::Confirm => {
                let events = self.flow.confirm();
                self.publish(events);
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.flow.snapshot());
            }
        }
    }

    fn publish(&self, events: Vec<FlowEvent>) {
        for event in events {
            if event == FlowEvent::PickupConfirmed {
                metrics().increment(PICKUPS_COUNTER);
                match self.sink.record_pickup() {
                    Ok(count) => info!(pickup_count = count, "Pickup recorded"),
                    Err(e) => warn!(error = %e, "Failed to record pickup"),
                }
            }
            // no subscribers is fine
            let _ = self.events.send(event);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
