//! Versioned snapshot file with atomic replace semantics.
//!
//! # Responsibility
//! - Read, replace and clear the single snapshot file.
//!
//! # Invariants
//! - `replace` writes a complete new file and renames it over the old one;
//!   a concurrent reader observes either the old or the new snapshot.
//! - `read` returns `None` when no snapshot has ever been written.

use super::{StoreError, StoreResult};
use crate::model::icon::IconId;
use crate::model::snapshot::Snapshot;
use log::info;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const SNAPSHOT_FILE_NAME: &str = "snapshot.json";

/// File-backed store for the full-catalog snapshot.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store rooted at `cache_dir`; nothing is touched on disk.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: cache_dir.into().join(SNAPSHOT_FILE_NAME),
        }
    }

    /// Path of the snapshot file, present or not.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current snapshot, or `None` when absent.
    ///
    /// # Errors
    /// - `Io` for any filesystem failure other than not-found.
    /// - `Corrupt` when the file exists but does not decode.
    pub fn read(&self) -> StoreResult<Option<Snapshot>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        let snapshot = serde_json::from_str::<Snapshot>(&text).map_err(|err| {
            StoreError::Corrupt {
                path: self.path.clone(),
                message: err.to_string(),
            }
        })?;
        Ok(Some(snapshot))
    }

    /// Atomically replaces the snapshot with a fresh one built from `icons`.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the target, never writing in place.
    pub fn replace(&self, icons: BTreeSet<IconId>) -> StoreResult<Snapshot> {
        let parent = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&parent).map_err(|err| self.io_error(err))?;

        let snapshot = Snapshot::now(icons);

        let tmp = NamedTempFile::new_in(&parent).map_err(|err| self.io_error(err))?;
        serde_json::to_writer(&tmp, &snapshot).map_err(|err| StoreError::Io {
            path: self.path.clone(),
            source: std::io::Error::other(err),
        })?;
        tmp.as_file()
            .sync_all()
            .map_err(|err| self.io_error(err))?;
        tmp.persist(&self.path)
            .map_err(|err| self.io_error(err.error))?;

        info!(
            "event=snapshot_replace module=store status=ok total={} path={}",
            snapshot.total,
            self.path.display()
        );
        Ok(snapshot)
    }

    /// Deletes the snapshot file. Returns whether a file was removed.
    pub fn clear(&self) -> StoreResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(
                    "event=snapshot_clear module=store status=ok path={}",
                    self.path.display()
                );
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotStore;
    use crate::model::icon::IconId;
    use crate::store::StoreError;
    use std::collections::BTreeSet;

    fn ids(values: &[&str]) -> BTreeSet<IconId> {
        values
            .iter()
            .map(|v| IconId::parse(v).expect("test id should parse"))
            .collect()
    }

    #[test]
    fn read_returns_none_before_first_sync() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let store = SnapshotStore::new(dir.path());
        assert!(store.read().expect("read should succeed").is_none());
    }

    #[test]
    fn replace_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let store = SnapshotStore::new(dir.path());

        let written = store
            .replace(ids(&["mdi:home", "emoji:bacon"]))
            .expect("replace should succeed");
        assert_eq!(written.total, 2);

        let read = store
            .read()
            .expect("read should succeed")
            .expect("snapshot should exist after replace");
        assert_eq!(read, written);
    }

    #[test]
    fn replace_overwrites_wholesale() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let store = SnapshotStore::new(dir.path());

        store
            .replace(ids(&["mdi:home", "mdi:garage"]))
            .expect("first replace should succeed");
        store
            .replace(ids(&["emoji:bacon"]))
            .expect("second replace should succeed");

        let read = store
            .read()
            .expect("read should succeed")
            .expect("snapshot should exist");
        assert_eq!(read.total, 1);
        assert!(read.contains(&IconId::parse("emoji:bacon").expect("id should parse")));
    }

    #[test]
    fn clear_reports_whether_a_file_was_removed() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let store = SnapshotStore::new(dir.path());

        assert!(!store.clear().expect("clear on empty store should succeed"));
        store
            .replace(ids(&["mdi:home"]))
            .expect("replace should succeed");
        assert!(store.clear().expect("clear should succeed"));
        assert!(store.read().expect("read should succeed").is_none());
    }

    #[test]
    fn corrupt_file_is_reported_not_masked() {
        let dir = tempfile::tempdir().expect("tempdir should create");
        let store = SnapshotStore::new(dir.path());
        std::fs::write(store.path(), b"not json").expect("write should succeed");

        let err = store.read().expect_err("corrupt snapshot should error");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }
}
