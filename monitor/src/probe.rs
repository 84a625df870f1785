//! Per-file probing: timestamp capture and line counting with lock retry.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, sleep};
use tracing::trace;

use crate::error::Result;

/// Delay between retries while a file is lock-protected.
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Timestamp and line count captured from one successful read of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSnapshot {
    /// When the file was last modified.
    pub modified: DateTime<Utc>,

    /// Number of lines in the file.
    pub line_count: u64,
}

/// Outcome of probing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The file was opened and read successfully.
    Snapshot(FileSnapshot),

    /// The file no longer exists. A normal race outcome when a file is
    /// deleted between listing and opening, distinct from a lock failure.
    Vanished,

    /// The file stayed lock-protected past the wait budget.
    LockTimeout,
}

/// Probe a file for its modified timestamp and line count.
///
/// Retries while the file is held by another writer, backing off
/// [`LOCK_RETRY_INTERVAL`] per attempt until `lock_timeout` is exhausted.
/// Errors other than lock contention and disappearance are propagated.
pub async fn probe_file(path: &Path, lock_timeout: Duration) -> Result<ProbeOutcome> {
    let deadline = Instant::now() + lock_timeout;

    loop {
        match read_snapshot(path).await {
            Ok(snapshot) => return Ok(ProbeOutcome::Snapshot(snapshot)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(ProbeOutcome::Vanished);
            }
            Err(err) if is_lock_contention(&err) => {
                if Instant::now() >= deadline {
                    return Ok(ProbeOutcome::LockTimeout);
                }
                trace!("file locked, retrying: {}", path.display());
                sleep(LOCK_RETRY_INTERVAL).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// One open-and-read attempt.
async fn read_snapshot(path: &Path) -> io::Result<FileSnapshot> {
    let file = File::open(path).await?;
    let modified = DateTime::<Utc>::from(file.metadata().await?.modified()?);

    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut line_count = 0u64;

    // Count terminator-delimited chunks; a trailing line without a
    // terminator still counts as one line.
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).await?;
        if read == 0 {
            break;
        }
        line_count += 1;
    }

    Ok(FileSnapshot {
        modified,
        line_count,
    })
}

/// Whether an error indicates the file is transiently held by another writer.
fn is_lock_contention(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::PermissionDenied
    ) {
        return true;
    }

    // ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION only surface as raw
    // OS codes.
    #[cfg(windows)]
    if matches!(err.raw_os_error(), Some(32) | Some(33)) {
        return true;
    }

    false
}
