//! The directory monitor: tick scheduling, probe fan-out, and lifecycle.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::event::ChangeEvent;
use crate::probe::{ProbeOutcome, probe_file};
use crate::scanner::Scanner;
use crate::state::StateStore;

/// Capacity of the event channel toward the reporter.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// A polling monitor for a single directory.
///
/// Each instance owns its own lifecycle: the running flag, the stop signal,
/// and the loop task handle. Independent monitors for different directories
/// can coexist in one process.
pub struct DirectoryMonitor {
    /// Configuration.
    config: MonitorConfig,

    /// Directory lister.
    scanner: Scanner,

    /// Reconciled per-file state.
    store: Arc<StateStore>,

    /// Event sender toward the reporter.
    event_tx: mpsc::Sender<ChangeEvent>,

    /// Whether the scan loop is running.
    running: Arc<AtomicBool>,

    /// Stop signal for the loop task.
    stop_tx: watch::Sender<bool>,

    /// Handle of the spawned loop task.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl DirectoryMonitor {
    /// Create a monitor and the receiver its change events arrive on.
    pub fn new(config: MonitorConfig) -> Result<(Self, mpsc::Receiver<ChangeEvent>)> {
        if !config.dir.exists() {
            return Err(MonitorError::DirectoryNotFound(
                config.dir.display().to_string(),
            ));
        }
        if !config.dir.is_dir() {
            return Err(MonitorError::NotADirectory(
                config.dir.display().to_string(),
            ));
        }

        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (stop_tx, _) = watch::channel(false);
        let scanner = Scanner::new(&config.dir, &config.mask);

        let monitor = Self {
            config,
            scanner,
            store: Arc::new(StateStore::new()),
            event_tx,
            running: Arc::new(AtomicBool::new(false)),
            stop_tx,
            task: Mutex::new(None),
        };

        Ok((monitor, event_rx))
    }

    /// Start the recurring scan loop.
    ///
    /// The first scan only establishes a baseline; change events flow from
    /// the second scan on. Fails with [`MonitorError::AlreadyRunning`] if
    /// this monitor is already running, leaving the active run untouched.
    pub async fn start(&self) -> Result<()> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(MonitorError::AlreadyRunning(
                self.config.dir.display().to_string(),
            ));
        }

        // Every start rebuilds state from a fresh baseline scan.
        self.store.clear().await;
        self.stop_tx.send_replace(false);

        let ctx = TickContext {
            scanner: self.scanner.clone(),
            store: self.store.clone(),
            event_tx: self.event_tx.clone(),
            lock_timeout: self.config.lock_timeout,
            probe_permits: Arc::new(Semaphore::new(self.config.max_concurrent_probes.max(1))),
        };
        let interval = self.config.poll_interval;
        let running = self.running.clone();
        let mut stop_rx = self.stop_tx.subscribe();

        let handle = tokio::spawn(async move {
            let mut baseline = true;

            loop {
                let started = Instant::now();
                ctx.run_tick(baseline).await;
                baseline = false;

                if *stop_rx.borrow_and_update() {
                    break;
                }

                let delay = next_delay(interval, started.elapsed());
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = stop_rx.changed() => break,
                }
            }

            running.store(false, Ordering::Release);
            debug!("monitor loop exited");
        });

        *self.task.lock().await = Some(handle);
        info!(
            "monitor started: {} ({})",
            self.config.dir.display(),
            self.config.mask
        );
        Ok(())
    }

    /// Stop the monitor.
    ///
    /// A tick already in progress is allowed to finish; the pending wait
    /// before the next tick is cancelled. Returns once the loop task has
    /// exited. Stopping an idle monitor is a no-op.
    pub async fn stop(&self) {
        let handle = self.task.lock().await.take();
        self.stop_tx.send_replace(true);

        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("monitor loop task failed: {err}");
            }
            info!("monitor stopped: {}", self.config.dir.display());
        }

        self.running.store(false, Ordering::Release);
    }

    /// Whether the scan loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Delay before the next tick: the nominal interval minus the time the scan
/// consumed, floored at zero so an overrunning scan fires again immediately.
fn next_delay(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// The pieces of the monitor the loop task needs for each tick.
struct TickContext {
    scanner: Scanner,
    store: Arc<StateStore>,
    event_tx: mpsc::Sender<ChangeEvent>,
    lock_timeout: Duration,
    probe_permits: Arc<Semaphore>,
}

impl TickContext {
    /// One complete scan-and-reconcile cycle.
    async fn run_tick(&self, baseline: bool) {
        let paths = match self.scanner.scan().await {
            Ok(paths) => paths,
            Err(err) => {
                // A failed listing is indistinguishable from mass deletion,
                // so the tick is abandoned and retried on the next cycle.
                error!("directory scan failed: {err}");
                return;
            }
        };

        let live: HashSet<PathBuf> = paths.iter().cloned().collect();

        let mut probes = Vec::with_capacity(paths.len());
        for path in paths {
            let Ok(permit) = self.probe_permits.clone().acquire_owned().await else {
                // The semaphore is never closed.
                break;
            };
            let lock_timeout = self.lock_timeout;

            probes.push(tokio::spawn(async move {
                let outcome = probe_file(&path, lock_timeout).await;
                drop(permit);
                (path, outcome)
            }));
        }

        let mut events = Vec::new();
        for probe in probes {
            let (path, outcome) = match probe.await {
                Ok(result) => result,
                Err(err) => {
                    warn!("probe task failed: {err}");
                    continue;
                }
            };

            match outcome {
                Ok(ProbeOutcome::Snapshot(snapshot)) => {
                    if let Some(event) = self.store.apply(&path, &snapshot).await {
                        events.push(event);
                    }
                }
                Ok(ProbeOutcome::Vanished) => {
                    // Deletion is detected by the listing sweep; the stale
                    // record stays until the path drops out of a listing.
                    debug!("file vanished mid-probe: {}", path.display());
                }
                Ok(ProbeOutcome::LockTimeout) => {
                    warn!(
                        "file stayed locked past the wait budget, skipping until next scan: {}",
                        path.display()
                    );
                }
                Err(err) => {
                    warn!("probe failed for {}: {err}", path.display());
                }
            }
        }

        // All probes have completed; the sweep sees a stable key set.
        events.extend(self.store.sweep(&live).await);

        if baseline {
            debug!(
                "baseline scan complete: {} files tracked",
                self.store.len().await
            );
            return;
        }

        debug!("scan complete: {} change events", events.len());
        for event in events {
            if self.event_tx.send(event).await.is_err() {
                warn!("event receiver dropped, discarding change events");
                return;
            }
        }
    }
}
