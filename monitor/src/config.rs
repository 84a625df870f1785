//! Configuration for the directory monitor.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between scans.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default budget for waiting out a locked file.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default bound on concurrently probed files.
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 8;

/// Configuration for a monitored directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Directory to watch (top level only, no recursion).
    pub dir: PathBuf,

    /// Filename mask using `*` and `?` wildcards.
    pub mask: String,

    /// Nominal interval between scans.
    pub poll_interval: Duration,

    /// How long a probe may wait for a locked file before skipping it.
    pub lock_timeout: Duration,

    /// Maximum number of files probed concurrently within one scan.
    pub max_concurrent_probes: usize,
}

impl MonitorConfig {
    /// Create a config for a directory and filename mask.
    pub fn new(dir: impl Into<PathBuf>, mask: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            mask: mask.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            max_concurrent_probes: DEFAULT_MAX_CONCURRENT_PROBES,
        }
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the lock-wait budget.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Set the probe concurrency bound.
    pub fn with_max_concurrent_probes(mut self, max: usize) -> Self {
        self.max_concurrent_probes = max;
        self
    }
}
