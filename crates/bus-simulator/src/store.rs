//! # Fleet Store
//!
//! Owned, per-screen store around a [`FleetSimulator`]. Consumers read the
//! latest snapshot or subscribe to every new one; the screen starts the timer
//! when it becomes active and stops it when it is torn down.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bus_domain::FleetSnapshot;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::fleet::FleetSimulator;

const SUBSCRIBER_BUFFER: usize = 16;

struct State {
    simulator: FleetSimulator,
    latest: Arc<FleetSnapshot>,
    /// Bumped on every stop so a timer that already woke up cannot publish.
    generation: u64,
}

struct Shared {
    state: Mutex<State>,
    tx: broadcast::Sender<Arc<FleetSnapshot>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tick and publish; `None` when `generation` is stale.
    fn advance(&self, generation: Option<u64>) -> Option<Arc<FleetSnapshot>> {
        let mut state = self.lock();
        if generation.is_some_and(|g| g != state.generation) {
            return None;
        }

        let snapshot = Arc::new(state.simulator.tick());
        state.latest = Arc::clone(&snapshot);
        // No receivers is fine; the snapshot is still retained as latest.
        let delivered = self.tx.send(Arc::clone(&snapshot)).unwrap_or(0);
        debug!(sequence = snapshot.sequence, subscribers = delivered, "snapshot published");
        Some(snapshot)
    }
}

/// Store owning the canonical vehicle set for one screen.
pub struct FleetStore {
    shared: Arc<Shared>,
    ticker: Option<JoinHandle<()>>,
}

impl FleetStore {
    pub fn new(simulator: FleetSimulator) -> Self {
        let latest = Arc::new(simulator.snapshot());
        let (tx, _) = broadcast::channel(SUBSCRIBER_BUFFER);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    simulator,
                    latest,
                    generation: 0,
                }),
                tx,
            }),
            ticker: None,
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<FleetSnapshot> {
        Arc::clone(&self.shared.lock().latest)
    }

    /// Advance once immediately and notify subscribers.
    pub fn tick(&self) -> Arc<FleetSnapshot> {
        // Unconditional advance always yields a snapshot.
        self.shared
            .advance(None)
            .unwrap_or_else(|| self.snapshot())
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> SnapshotSubscription {
        SnapshotSubscription {
            rx: self.shared.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.tx.receiver_count()
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start ticking every `period`, replacing any running timer.
    ///
    /// The first tick fires one full period after the call. Must be called
    /// from within a tokio runtime.
    pub fn start(&mut self, period: Duration) {
        self.stop();

        let generation = self.shared.lock().generation;
        let shared = Arc::clone(&self.shared);
        let period = period.max(Duration::from_millis(1));

        self.ticker = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if shared.advance(Some(generation)).is_none() {
                    break;
                }
            }
        }));

        info!(period_ms = period.as_millis() as u64, "fleet ticker started");
    }

    /// Stop the timer. No tick fires after this returns.
    pub fn stop(&mut self) {
        let Some(handle) = self.ticker.take() else {
            return;
        };
        self.shared.lock().generation += 1;
        handle.abort();
        info!("fleet ticker stopped");
    }
}

impl Drop for FleetStore {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Handle receiving published snapshots; dropping it unsubscribes.
pub struct SnapshotSubscription {
    rx: broadcast::Receiver<Arc<FleetSnapshot>>,
}

impl SnapshotSubscription {
    /// Wait for the next snapshot. `None` once the store is gone.
    ///
    /// A subscriber that fell behind skips the snapshots it missed.
    pub async fn next(&mut self) -> Option<Arc<FleetSnapshot>> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged, skipping stale snapshots");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take a snapshot that is already waiting, if any.
    pub fn try_next(&mut self) -> Option<Arc<FleetSnapshot>> {
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber lagged, skipping stale snapshots");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
