//! Directory listing with wildcard filename matching.

use std::path::PathBuf;

use tokio::fs;
use tracing::warn;
use wildmatch::WildMatch;

use crate::error::Result;

/// Lists the files in one directory (no recursion) matching a filename mask.
#[derive(Debug, Clone)]
pub struct Scanner {
    dir: PathBuf,
    mask: WildMatch,
}

impl Scanner {
    /// Create a scanner for `dir` with a `*`/`?` filename mask.
    pub fn new(dir: impl Into<PathBuf>, mask: &str) -> Self {
        Self {
            dir: dir.into(),
            mask: WildMatch::new(mask),
        }
    }

    /// List the current set of matching file paths.
    ///
    /// A listing failure is returned as an error rather than an empty set:
    /// an empty result would be indistinguishable from every file having
    /// been deleted.
    pub async fn scan(&self) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(err) => {
                    // The entry may have vanished between listing and stat.
                    warn!("skipping unreadable entry {}: {err}", entry.path().display());
                    continue;
                }
            };

            if !file_type.is_file() {
                continue;
            }

            if self.mask.matches(&entry.file_name().to_string_lossy()) {
                paths.push(entry.path());
            }
        }

        Ok(paths)
    }
}
