//! # Refresh Controller
//!
//! Owns the board and keeps it current by polling a [`TripSource`].
//!
//! - One recurring timer per controller, started by [`RefreshController::start`]
//!   and owned by the returned [`MonitorHandle`]. The first tick fires
//!   immediately.
//! - At most one fetch in flight. A trigger arriving while a fetch runs is
//!   coalesced into it: it returns [`RefreshOutcome::Coalesced`] without
//!   fetching and without cancelling the running fetch.
//! - A failed fetch keeps the previous trips and refresh time, records the
//!   error and is logged. It never stops the timer.
//! - Teardown is final. A fetch still running at teardown completes, but
//!   its result is dropped; every later trigger returns
//!   [`RefreshOutcome::Stopped`].
//!
//! The board lock is a `parking_lot::Mutex` and is never held across an
//! `.await`. Board writes and teardown both happen under it, so no
//! `Refreshed` or `Failed` event follows `Stopped`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tripwatch_client::TripSource;
use tripwatch_core::{Timestamp, TripId};
use tripwatch_query::{TripQuery, DEFAULT_PAGE_SIZE};
use tripwatch_state::{TransitionOutcome, TripCommand};

use crate::board::{Board, BoardSnapshot};
use crate::error::MonitorError;
use crate::view::TripViewModel;

/// Default refresh period.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Capacity of the event channel. Slow subscribers see `Lagged`.
const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub period: Duration,
    pub page_size: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_REFRESH_PERIOD,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Result of one refresh trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The board was replaced.
    Refreshed { trip_count: usize },
    /// Another fetch was already in flight.
    Coalesced,
    /// The fetch failed; the board keeps its previous contents.
    Failed { error: String },
    /// The controller was torn down while the fetch ran.
    Discarded,
    /// The controller is torn down; nothing was fetched.
    Stopped,
}

/// Broadcast to subscribers whenever the board changes or a refresh fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RefreshEvent {
    Refreshed { trip_count: usize, at: Timestamp },
    Failed { error: String, at: Timestamp },
    CommandApplied { trip_id: TripId, at: Timestamp },
    Stopped,
}

/// Cheaply cloneable handle to a shared controller.
#[derive(Clone)]
pub struct RefreshController {
    inner: Arc<Inner>,
}

struct Inner {
    source: Arc<dyn TripSource>,
    config: RefreshConfig,
    board: Mutex<Board>,
    busy: AtomicBool,
    started: AtomicBool,
    torn_down: AtomicBool,
    events: broadcast::Sender<RefreshEvent>,
}

impl std::fmt::Debug for RefreshController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshController")
            .field("source", &self.inner.source.source_name())
            .field("config", &self.inner.config)
            .field("busy", &self.inner.busy.load(Ordering::Relaxed))
            .field("torn_down", &self.inner.torn_down.load(Ordering::Relaxed))
            .finish()
    }
}

impl RefreshController {
    pub fn new(source: Arc<dyn TripSource>, config: RefreshConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                source,
                config,
                board: Mutex::new(Board::default()),
                busy: AtomicBool::new(false),
                started: AtomicBool::new(false),
                torn_down: AtomicBool::new(false),
                events,
            }),
        }
    }

    pub fn config(&self) -> RefreshConfig {
        self.inner.config
    }

    /// Start the recurring timer. The warehouse lookup is loaded first;
    /// its failure is logged and does not prevent monitoring.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(&self) -> Result<MonitorHandle, MonitorError> {
        if self.inner.torn_down.load(Ordering::Acquire) {
            return Err(MonitorError::TornDown);
        }
        if self.inner.started.swap(true, Ordering::AcqRel) {
            return Err(MonitorError::AlreadyStarted);
        }

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = &mut stop_rx => {
                    tracing::debug!(source = inner.source.source_name(), "stopped during warehouse lookup");
                    return;
                }
                _ = inner.load_warehouses() => {}
            }
            let mut ticker = tokio::time::interval(inner.config.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        inner.refresh().await;
                    }
                }
            }
            tracing::debug!(source = inner.source.source_name(), "refresh timer stopped");
        });

        tracing::info!(
            source = self.inner.source.source_name(),
            period_secs = self.inner.config.period.as_secs(),
            "refresh controller started"
        );
        Ok(MonitorHandle {
            inner: Arc::clone(&self.inner),
            stop_tx: Some(stop_tx),
            task: Some(task),
        })
    }

    /// Fetch now, outside the timer schedule.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.inner.refresh().await
    }

    /// Load warehouse names without starting the timer. Failure is logged
    /// and rows keep showing warehouse ids.
    pub async fn load_warehouses(&self) {
        self.inner.load_warehouses().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.events.subscribe()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.inner.board.lock().snapshot()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.busy.load(Ordering::Acquire)
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::Acquire)
    }

    /// Apply a lifecycle command to a trip on the board. A rejected command
    /// leaves the board unchanged.
    pub fn apply_command(&self, trip_id: &TripId, command: TripCommand) -> Result<TransitionOutcome, MonitorError> {
        let at = Timestamp::now();
        let outcome = {
            let mut board = self.inner.board.lock();
            let trip = board.trip_mut(trip_id).ok_or_else(|| MonitorError::TripNotFound {
                trip_id: trip_id.to_string(),
            })?;
            trip.apply(command, at)?
        };
        tracing::debug!(%trip_id, changes = outcome.changes.len(), "command applied");
        self.inner.emit(RefreshEvent::CommandApplied {
            trip_id: trip_id.clone(),
            at,
        });
        Ok(outcome)
    }

    /// Build the view model for one page of the board.
    pub fn view(&self, query: &TripQuery, page: usize, page_size: usize) -> TripViewModel {
        self.view_at(query, page, page_size, Timestamp::now())
    }

    /// As [`view`](Self::view) with an explicit evaluation instant.
    pub fn view_at(&self, query: &TripQuery, page: usize, page_size: usize, now: Timestamp) -> TripViewModel {
        TripViewModel {
            is_fetching: self.is_busy(),
            ..TripViewModel::build(&self.snapshot(), query, page, page_size, now)
        }
    }
}

impl Inner {
    async fn refresh(&self) -> RefreshOutcome {
        if self.torn_down.load(Ordering::Acquire) {
            return RefreshOutcome::Stopped;
        }
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::trace!("refresh already in flight, coalesced");
            return RefreshOutcome::Coalesced;
        };

        let result = self.source.list_active_trips().await;

        // Teardown flips the flag under the board lock, so the check and the
        // write below cannot straddle a `Stopped` event.
        let at = Timestamp::now();
        let mut board = self.board.lock();
        if self.torn_down.load(Ordering::Acquire) {
            drop(board);
            tracing::debug!("controller torn down during fetch, result discarded");
            return RefreshOutcome::Discarded;
        }
        match result {
            Ok(trips) => {
                let trip_count = trips.len();
                board.replace(trips, at);
                self.emit(RefreshEvent::Refreshed { trip_count, at });
                drop(board);
                tracing::debug!(trip_count, "board refreshed");
                RefreshOutcome::Refreshed { trip_count }
            }
            Err(e) => {
                let error = e.to_string();
                board.record_failure(error.clone());
                self.emit(RefreshEvent::Failed {
                    error: error.clone(),
                    at,
                });
                drop(board);
                tracing::warn!(source = self.source.source_name(), error = %error, "refresh failed, keeping previous data");
                RefreshOutcome::Failed { error }
            }
        }
    }

    async fn load_warehouses(&self) {
        match self.source.lookup_warehouses().await {
            Ok(warehouses) => {
                tracing::debug!(count = warehouses.len(), "warehouses loaded");
                self.board.lock().set_warehouses(warehouses);
            }
            Err(e) => tracing::warn!("warehouse lookup failed, showing ids: {e}"),
        }
    }

    fn tear_down(&self) -> bool {
        let _board = self.board.lock();
        let first = !self.torn_down.swap(true, Ordering::AcqRel);
        if first {
            self.emit(RefreshEvent::Stopped);
        }
        first
    }

    fn emit(&self, event: RefreshEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Holds the in-flight flag; clears it on every exit path.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns a running refresh timer. Dropping the handle stops the timer.
#[derive(Debug)]
pub struct MonitorHandle {
    inner: Arc<Inner>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Inner")
            .field("source", &self.source.source_name())
            .field("torn_down", &self.torn_down.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl MonitorHandle {
    /// Stop the timer and tear the controller down. Idempotent.
    pub fn stop(&mut self) {
        if self.inner.tear_down() {
            tracing::info!(source = self.inner.source.source_name(), "refresh controller stopped");
        }
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Stop and wait for the timer task to finish, including a fetch that
    /// was in flight.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("refresh task ended abnormally: {e}");
            }
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_tx.is_none()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripwatch_client::InMemoryTripSource;

    fn controller() -> RefreshController {
        RefreshController::new(Arc::new(InMemoryTripSource::default()), RefreshConfig::default())
    }

    #[test]
    fn busy_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        {
            let guard = BusyGuard::acquire(&flag);
            assert!(guard.is_some());
            assert!(BusyGuard::acquire(&flag).is_none());
        }
        assert!(!flag.load(Ordering::SeqCst));
        assert!(BusyGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let c = controller();
        let handle = c.start().unwrap();
        assert!(matches!(c.start(), Err(MonitorError::AlreadyStarted)));
        handle.shutdown().await;
        assert!(matches!(c.start(), Err(MonitorError::TornDown)));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let c = controller();
        let mut events = c.subscribe();
        let mut handle = c.start().unwrap();
        handle.stop();
        handle.stop();
        assert!(handle.is_stopped());
        assert!(c.is_torn_down());
        assert_eq!(c.refresh_now().await, RefreshOutcome::Stopped);
        drop(handle);
        // Exactly one Stopped event, whatever else was emitted.
        let mut stopped = 0;
        while let Ok(event) = events.try_recv() {
            if event == RefreshEvent::Stopped {
                stopped += 1;
            }
        }
        assert_eq!(stopped, 1);
    }

    #[test]
    fn teardown_waits_for_board_writer() {
        let c = controller();
        let board = c.inner.board.lock();
        let inner = Arc::clone(&c.inner);
        let stopper = std::thread::spawn(move || inner.tear_down());
        std::thread::sleep(Duration::from_millis(50));
        assert!(!c.is_torn_down());
        drop(board);
        assert!(stopper.join().unwrap());
        assert!(c.is_torn_down());
    }

    #[test]
    fn unknown_trip_command_is_reported() {
        let c = controller();
        let err = c
            .apply_command(&TripId::new("TRP-X"), TripCommand::Dispatch)
            .unwrap_err();
        assert!(matches!(err, MonitorError::TripNotFound { .. }));
    }
}
