//! Command-line entry point for the linewatch directory monitor.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linewatch_monitor::{DirectoryMonitor, MonitorConfig};

/// Watch a directory and report line-count changes to matching text files.
#[derive(Debug, Parser)]
#[command(name = "linewatch", version, about)]
struct Args {
    /// Directory to watch (top level only).
    dir: PathBuf,

    /// Filename mask using `*` and `?` wildcards.
    #[arg(default_value = "*.txt")]
    mask: String,

    /// Seconds between scans.
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Milliseconds to wait out a locked file before skipping it.
    #[arg(long, default_value_t = 5000)]
    lock_timeout: u64,

    /// Maximum number of files probed concurrently.
    #[arg(long, default_value_t = 8)]
    max_probes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = MonitorConfig::new(&args.dir, args.mask.as_str())
        .with_poll_interval(Duration::from_secs(args.interval))
        .with_lock_timeout(Duration::from_millis(args.lock_timeout))
        .with_max_concurrent_probes(args.max_probes);

    let (monitor, mut events) = DirectoryMonitor::new(config)?;
    monitor.start().await?;
    info!("watching {} for {}", args.dir.display(), args.mask);

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Some(event) => println!("{event}"),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                monitor.stop().await;
                break;
            }
        }
    }

    Ok(())
}
