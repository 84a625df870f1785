//! Error types for the directory monitor.

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur in the directory monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Watched directory not found.
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    /// Watched path is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Monitor already running.
    #[error("monitor already running for: {0}")]
    AlreadyRunning(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
