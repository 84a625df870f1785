//! Change events produced by scan reconciliation.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A change observed between two consecutive scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    /// A file appeared that was absent from the previous scan.
    Added {
        /// Path to the new file.
        path: PathBuf,

        /// Its line count at first observation.
        line_count: u64,
    },

    /// A known file was observed with a strictly newer timestamp.
    ///
    /// `delta` may be zero: a timestamp bump without a line-count change is
    /// still reported.
    Modified {
        /// Path to the modified file.
        path: PathBuf,

        /// The new line count.
        line_count: u64,

        /// Signed difference from the previously stored count.
        delta: i64,
    },

    /// A previously known file dropped out of the listing.
    Deleted {
        /// Path to the removed file.
        path: PathBuf,
    },
}

impl ChangeEvent {
    /// Path of the affected file.
    pub fn path(&self) -> &Path {
        match self {
            Self::Added { path, .. } | Self::Modified { path, .. } | Self::Deleted { path } => path,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { path, line_count } => {
                write!(f, "Added: [{}] of {line_count} lines", path.display())
            }
            Self::Modified {
                path,
                line_count,
                delta,
            } => {
                write!(
                    f,
                    "Modified: [{}] is now {line_count} lines ({delta:+})",
                    path.display()
                )
            }
            Self::Deleted { path } => write!(f, "Deleted: [{}]", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_added_rendering() {
        let event = ChangeEvent::Added {
            path: PathBuf::from("/watch/notes.txt"),
            line_count: 12,
        };

        assert_eq!(event.to_string(), "Added: [/watch/notes.txt] of 12 lines");
    }

    #[test]
    fn test_modified_rendering_negative_delta() {
        let event = ChangeEvent::Modified {
            path: PathBuf::from("/watch/notes.txt"),
            line_count: 7,
            delta: -3,
        };

        assert_eq!(
            event.to_string(),
            "Modified: [/watch/notes.txt] is now 7 lines (-3)"
        );
    }

    #[test]
    fn test_modified_rendering_zero_delta() {
        let event = ChangeEvent::Modified {
            path: PathBuf::from("/watch/notes.txt"),
            line_count: 7,
            delta: 0,
        };

        assert_eq!(
            event.to_string(),
            "Modified: [/watch/notes.txt] is now 7 lines (+0)"
        );
    }

    #[test]
    fn test_deleted_rendering() {
        let event = ChangeEvent::Deleted {
            path: PathBuf::from("/watch/notes.txt"),
        };

        assert_eq!(event.to_string(), "Deleted: [/watch/notes.txt]");
    }

    #[test]
    fn test_event_path() {
        let event = ChangeEvent::Deleted {
            path: PathBuf::from("/watch/gone.txt"),
        };

        assert_eq!(event.path(), Path::new("/watch/gone.txt"));
    }
}
