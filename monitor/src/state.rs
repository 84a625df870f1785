//! Concurrent state store reconciling scan results into change events.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::event::ChangeEvent;
use crate::probe::FileSnapshot;

/// Last observed state of one watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRecord {
    /// Modified timestamp from the most recent accepted probe.
    pub modified: DateTime<Utc>,

    /// Line count from the most recent accepted probe.
    pub line_count: u64,
}

/// Mapping from file path to its last observed record.
///
/// Updates are linearized per key under the map's write lock: a record is
/// only overwritten when the incoming timestamp is strictly newer, so a
/// stale or duplicate concurrent observation can never clobber a newer one.
/// A vanished probe result never reaches [`StateStore::apply`] — deletion is
/// detected solely by the listing comparison in [`StateStore::sweep`].
#[derive(Debug, Default)]
pub struct StateStore {
    records: RwLock<HashMap<PathBuf, FileRecord>>,
}

impl StateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one probe snapshot into the store.
    ///
    /// Returns the event this observation produces, if any. The caller
    /// decides whether to forward it; events from a baseline scan are
    /// suppressed there.
    pub async fn apply(&self, path: &Path, snapshot: &FileSnapshot) -> Option<ChangeEvent> {
        let mut records = self.records.write().await;

        match records.get_mut(path) {
            None => {
                records.insert(
                    path.to_path_buf(),
                    FileRecord {
                        modified: snapshot.modified,
                        line_count: snapshot.line_count,
                    },
                );
                Some(ChangeEvent::Added {
                    path: path.to_path_buf(),
                    line_count: snapshot.line_count,
                })
            }
            Some(record) => {
                if snapshot.modified <= record.modified {
                    return None;
                }

                let delta = snapshot.line_count as i64 - record.line_count as i64;
                record.modified = snapshot.modified;
                record.line_count = snapshot.line_count;

                // A timestamp bump always reports, delta zero included.
                Some(ChangeEvent::Modified {
                    path: path.to_path_buf(),
                    line_count: snapshot.line_count,
                    delta,
                })
            }
        }
    }

    /// Remove every stored path absent from `live` and return the deletions.
    ///
    /// Runs after all probes of a tick have completed, over a stable
    /// snapshot of the keys.
    pub async fn sweep(&self, live: &HashSet<PathBuf>) -> Vec<ChangeEvent> {
        let mut records = self.records.write().await;

        let stored: Vec<PathBuf> = records.keys().cloned().collect();
        let mut events = Vec::new();
        for path in stored {
            if !live.contains(&path) {
                records.remove(&path);
                events.push(ChangeEvent::Deleted { path });
            }
        }

        events
    }

    /// Look up the stored record for a path.
    pub async fn get(&self, path: &Path) -> Option<FileRecord> {
        self.records.read().await.get(path).copied()
    }

    /// Number of tracked files.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store tracks no files.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Drop all records, so the next scan rebuilds a fresh baseline.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    fn snapshot(modified: DateTime<Utc>, line_count: u64) -> FileSnapshot {
        FileSnapshot {
            modified,
            line_count,
        }
    }

    #[tokio::test]
    async fn test_first_observation_is_added() {
        let store = StateStore::new();
        let path = Path::new("/watch/a.txt");
        let now = Utc::now();

        let event = store.apply(path, &snapshot(now, 10)).await;

        assert_eq!(
            event,
            Some(ChangeEvent::Added {
                path: path.to_path_buf(),
                line_count: 10,
            })
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_identical_timestamp_is_silent() {
        let store = StateStore::new();
        let path = Path::new("/watch/a.txt");
        let now = Utc::now();

        store.apply(path, &snapshot(now, 10)).await;
        let event = store.apply(path, &snapshot(now, 10)).await;

        assert_eq!(event, None);
        let record = store.get(path).await.unwrap();
        assert_eq!(record.line_count, 10);
        assert_eq!(record.modified, now);
    }

    #[tokio::test]
    async fn test_stale_timestamp_never_clobbers() {
        let store = StateStore::new();
        let path = Path::new("/watch/a.txt");
        let now = Utc::now();
        let earlier = now - TimeDelta::seconds(5);

        store.apply(path, &snapshot(now, 10)).await;
        let event = store.apply(path, &snapshot(earlier, 3)).await;

        assert_eq!(event, None);
        assert_eq!(store.get(path).await.unwrap().line_count, 10);
    }

    #[tokio::test]
    async fn test_newer_timestamp_reports_delta() {
        let store = StateStore::new();
        let path = Path::new("/watch/a.txt");
        let now = Utc::now();
        let later = now + TimeDelta::seconds(5);

        store.apply(path, &snapshot(now, 10)).await;
        let event = store.apply(path, &snapshot(later, 7)).await;

        assert_eq!(
            event,
            Some(ChangeEvent::Modified {
                path: path.to_path_buf(),
                line_count: 7,
                delta: -3,
            })
        );
        assert_eq!(store.get(path).await.unwrap().line_count, 7);
    }

    #[tokio::test]
    async fn test_timestamp_bump_with_same_count_reports_zero_delta() {
        let store = StateStore::new();
        let path = Path::new("/watch/a.txt");
        let now = Utc::now();
        let later = now + TimeDelta::seconds(5);

        store.apply(path, &snapshot(now, 10)).await;
        let event = store.apply(path, &snapshot(later, 10)).await;

        assert_eq!(
            event,
            Some(ChangeEvent::Modified {
                path: path.to_path_buf(),
                line_count: 10,
                delta: 0,
            })
        );
        assert_eq!(store.get(path).await.unwrap().modified, later);
    }

    #[tokio::test]
    async fn test_sweep_removes_missing_paths() {
        let store = StateStore::new();
        let kept = Path::new("/watch/kept.txt");
        let gone = Path::new("/watch/gone.txt");
        let now = Utc::now();

        store.apply(kept, &snapshot(now, 1)).await;
        store.apply(gone, &snapshot(now, 2)).await;

        let live: HashSet<PathBuf> = [kept.to_path_buf()].into_iter().collect();
        let events = store.sweep(&live).await;

        assert_eq!(
            events,
            vec![ChangeEvent::Deleted {
                path: gone.to_path_buf(),
            }]
        );
        assert_eq!(store.get(gone).await, None);
        assert!(store.get(kept).await.is_some());
    }

    #[tokio::test]
    async fn test_sweep_with_full_listing_is_empty() {
        let store = StateStore::new();
        let path = Path::new("/watch/a.txt");
        store.apply(path, &snapshot(Utc::now(), 1)).await;

        let live: HashSet<PathBuf> = [path.to_path_buf()].into_iter().collect();

        assert!(store.sweep(&live).await.is_empty());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_resets_the_store() {
        let store = StateStore::new();
        store
            .apply(Path::new("/watch/a.txt"), &snapshot(Utc::now(), 1))
            .await;

        store.clear().await;

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_newest() {
        let store = std::sync::Arc::new(StateStore::new());
        let path = PathBuf::from("/watch/a.txt");
        let now = Utc::now();
        store.apply(&path, &snapshot(now, 10)).await;

        let newer = now + TimeDelta::seconds(2);
        let stale = now - TimeDelta::seconds(2);

        let mut tasks = Vec::new();
        for observation in [snapshot(newer, 7), snapshot(stale, 99)] {
            let store = store.clone();
            let path = path.clone();
            tasks.push(tokio::spawn(async move {
                store.apply(&path, &observation).await
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let record = store.get(&path).await.unwrap();
        assert_eq!(record.modified, newer);
        assert_eq!(record.line_count, 7);
    }
}
