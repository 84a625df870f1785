//! # Linewatch Monitor
//!
//! Polling change detection for a single directory of text files. On a
//! fixed cadence the monitor lists the files matching a wildcard mask,
//! probes each one for its modified timestamp and line count, and reports
//! what changed since the previous scan.
//!
//! ## Features
//!
//! - **Self-Pacing Scheduler**: ticks never overlap, and the cadence never
//!   drifts below the nominal interval even when a scan overruns it
//! - **Lock-Tolerant Probing**: transiently locked files are retried with a
//!   bounded wait instead of failing the scan
//! - **Bounded Fan-Out**: per-file probes run concurrently under an explicit
//!   concurrency limit
//! - **Baseline Scans**: the first scan only populates state and emits no
//!   events
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       DirectoryMonitor                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  tick ──► Scanner ──► probe_file (concurrent, per file)         │
//! │    ▲                        │                                   │
//! │    │                        ▼                                   │
//! │  next_delay ◄──────── StateStore ──► ChangeEvent ──► receiver   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use linewatch_monitor::{DirectoryMonitor, MonitorConfig};
//!
//! let config = MonitorConfig::new("/var/log/app", "*.txt");
//! let (monitor, mut events) = DirectoryMonitor::new(config)?;
//! monitor.start().await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{event}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod monitor;
pub mod probe;
pub mod scanner;
pub mod state;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use event::ChangeEvent;
pub use monitor::DirectoryMonitor;
pub use probe::{FileSnapshot, ProbeOutcome, probe_file};
pub use scanner::Scanner;
pub use state::{FileRecord, StateStore};
