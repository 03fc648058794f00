//! Key statistics engine
//!
//! Drains `(key, size)` events from an [`EventSource`] into a
//! [`StatCollection`], evicts keys whose lifetime request rate decays below
//! the discard threshold, and serves ranked snapshots on demand.
//!
//! Two background tasks do the work once [`Stats::start`] is called:
//! - **ingest**: polls the source, backing off while it is empty
//! - **prune**: sweeps the table every prune interval
//!
//! Both stop cooperatively. [`Stats::shutdown`] signals them and waits for
//! each with a bounded timeout, reporting loops that did not exit.

mod backoff;
mod collection;
mod sort;
mod stat;
mod state;

pub use backoff::Backoff;
pub use collection::{PruneReport, StatCollection};
pub use sort::{
    Comparator, SortMode, SortOrder, by_bandwidth, by_count, by_request_rate, by_size, rank,
};
pub use stat::{Fingerprint, Stat, StatSnapshot};
pub use state::{EngineState, StateCell};

use crate::capture::{Consumed, EventSource};
use crate::config::StatsConfig;
use crate::error::{ShutdownError, Task};
use crate::formatting::write_stats_table;
use crate::types::DiscardThreshold;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, trace, warn};

/// State shared between the engine handle and its background tasks
#[derive(Debug, Default)]
struct Shared {
    collection: StatCollection,
    state: StateCell,
}

struct Tasks {
    ingest: JoinHandle<()>,
    prune: JoinHandle<()>,
}

/// Live key statistics engine
pub struct Stats {
    shared: Arc<Shared>,
    config: StatsConfig,
    source: Mutex<Option<Box<dyn EventSource>>>,
    tasks: Mutex<Option<Tasks>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stats")
            .field("state", &self.state())
            .field("keys", &self.stat_count())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Stats {
    /// Create an engine in the `New` state reading from `source`
    pub fn new(config: StatsConfig, source: impl EventSource) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            shared: Arc::new(Shared::default()),
            config,
            source: Mutex::new(Some(Box::new(source))),
            tasks: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Spawn the ingest and prune tasks
    ///
    /// Only the first call on a `New` engine does anything; later calls log a
    /// warning and return `false`. Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        // Claim the source before the transition; it goes back if the
        // transition is refused, so Running always implies spawned tasks
        let mut slot = self.source.lock();
        let Some(source) = slot.take() else {
            warn!(state = %self.state(), "Stats engine already started");
            return false;
        };
        if !self
            .shared
            .state
            .check_and_set(EngineState::New, EngineState::Running)
        {
            *slot = Some(source);
            warn!(state = %self.state(), "Stats engine cannot start");
            return false;
        }
        drop(slot);

        info!(
            threshold = %self.config.discard_threshold,
            prune_interval_secs = self.config.prune_interval.as_secs(),
            "Starting stats engine"
        );

        let prune = tokio::spawn(run_prune(
            Arc::clone(&self.shared),
            self.config.discard_threshold,
            self.config.prune_interval,
            self.shutdown_tx.subscribe(),
        ));
        let ingest = tokio::spawn(run_ingest(
            Arc::clone(&self.shared),
            source,
            self.config.backoff(),
            self.shutdown_tx.subscribe(),
        ));

        *self.tasks.lock() = Some(Tasks { ingest, prune });
        true
    }

    /// Stop both background tasks and wait for them
    ///
    /// Returns `Ok(false)` without doing anything unless the engine is
    /// running. Each task gets `shutdown_timeout` to exit, ingest first; a
    /// task that overruns is aborted and reported as an error.
    pub async fn shutdown(&self) -> Result<bool, ShutdownError> {
        if !self
            .shared
            .state
            .check_and_set(EngineState::Running, EngineState::Stopping)
        {
            warn!(state = %self.state(), "Stats engine not running, nothing to stop");
            return Ok(false);
        }

        info!("Stopping stats engine");
        // No receivers only means both tasks already exited
        let _ = self.shutdown_tx.send(());

        let Some(tasks) = self.tasks.lock().take() else {
            return Ok(true);
        };

        let timeout = self.config.shutdown_timeout;
        let ingest = join_task(Task::Ingest, tasks.ingest, timeout).await;
        let prune = join_task(Task::Prune, tasks.prune, timeout).await;
        ingest.and(prune).map(|()| true)
    }

    /// Record one event directly, bypassing the event source
    pub fn increment(&self, key: &str, size: u32) {
        self.shared.collection.increment(key, size);
    }

    /// Ranked copies of every tracked key
    ///
    /// Entries are copied under the table lock; sorting happens after it is
    /// released.
    #[must_use]
    pub fn get_leaders(&self, mode: SortMode, order: SortOrder) -> Vec<StatSnapshot> {
        let mut leaders = self.shared.collection.snapshot_at(Instant::now());
        rank(&mut leaders, mode, order);
        leaders
    }

    /// Number of distinct keys currently tracked
    #[must_use]
    pub fn stat_count(&self) -> usize {
        self.shared.collection.len()
    }

    /// Copy of the entry for `key`, if tracked
    #[must_use]
    pub fn stat(&self, key: &str) -> Option<Stat> {
        self.shared.collection.get(key)
    }

    /// Events merged into an entry owned by a different key
    #[must_use]
    pub fn collisions(&self) -> u64 {
        self.shared.collection.collisions()
    }

    /// Run one pruning sweep now with the configured threshold
    pub fn prune_now(&self) -> PruneReport {
        let report = self
            .shared
            .collection
            .prune(self.config.discard_threshold, Instant::now());
        debug!(
            before = report.before,
            after = report.after,
            "Stats collection size"
        );
        report
    }

    /// Write the top `limit` keys ranked by `mode` as a fixed-width table
    pub fn write_leaders<W: Write>(
        &self,
        out: &mut W,
        mode: SortMode,
        order: SortOrder,
        limit: usize,
    ) -> io::Result<()> {
        let leaders = self.get_leaders(mode, order);
        write_stats_table(out, &leaders, limit)
    }

    /// Write the top `limit` keys by call count as a fixed-width table
    pub fn write_stats<W: Write>(&self, out: &mut W, limit: usize) -> io::Result<()> {
        self.write_leaders(out, SortMode::Calls, SortOrder::Desc, limit)
    }

    /// Print the top `limit` keys by call count to stdout
    pub fn print_stats(&self, limit: usize) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_stats(&mut out, limit)?;
        out.flush()
    }

    #[must_use]
    pub fn state(&self) -> EngineState {
        self.shared.state.get()
    }

    #[must_use]
    pub fn config(&self) -> &StatsConfig {
        &self.config
    }
}

impl Drop for Stats {
    fn drop(&mut self) {
        if self
            .shared
            .state
            .check_and_set(EngineState::Stopping, EngineState::Terminated)
        {
            info!("Stats successfully shut down");
        } else {
            error!(state = %self.state(), "Stats not successfully shut down");
        }

        if let Some(tasks) = self.tasks.get_mut().take() {
            tasks.ingest.abort();
            tasks.prune.abort();
        }
    }
}

async fn join_task(
    task: Task,
    mut handle: JoinHandle<()>,
    timeout: Duration,
) -> Result<(), ShutdownError> {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(Ok(())) => {
            info!(%task, "Stats task stopped");
            Ok(())
        }
        Ok(Err(source)) => {
            error!(%task, error = %source, "Stats task failed");
            Err(ShutdownError::TaskFailed { task, source })
        }
        Err(_) => {
            handle.abort();
            error!(%task, timeout_ms = timeout.as_millis() as u64, "Stats task did not stop in time, aborted");
            Err(ShutdownError::TaskTimeout { task, timeout })
        }
    }
}

async fn run_ingest(
    shared: Arc<Shared>,
    mut source: Box<dyn EventSource>,
    mut backoff: Backoff,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Starting stats collection");
    let mut closed = false;

    while shared.state.is_running() {
        match source.try_consume() {
            Consumed::Event(event) => {
                trace!(key = %event.key, size = event.size, "Consumed stat");
                shared.collection.increment(&event.key, event.size);
                backoff.reset();
                // A busy source must not starve other tasks on this worker
                tokio::task::consume_budget().await;
            }
            empty => {
                if empty == Consumed::Closed && !closed {
                    closed = true;
                    info!("Event source closed, idling until shutdown");
                }
                let wait = backoff.next_backoff();
                trace!(wait_ms = wait.as_millis() as u64, "No stat to consume");
                tokio::select! {
                    _ = sleep(wait) => {}
                    _ = shutdown_rx.recv() => break,
                }
            }
        }
    }

    info!("Stats collect task stopped");
}

async fn run_prune(
    shared: Arc<Shared>,
    threshold: DiscardThreshold,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!(%threshold, "Starting prune");

    if threshold.is_disabled() {
        // Either the stop signal or a dropped engine handle ends the wait
        let _ = shutdown_rx.recv().await;
        info!("Stats prune task stopped");
        return;
    }

    while shared.state.is_running() {
        tokio::select! {
            _ = sleep(interval) => {}
            _ = shutdown_rx.recv() => break,
        }
        if !shared.state.is_running() {
            break;
        }
        let report = shared.collection.prune(threshold, Instant::now());
        debug!(
            before = report.before,
            after = report.after,
            "Stats collection size"
        );
    }

    info!("Stats prune task stopped");
}
