//! Catalog-to-snapshot synchronization.
//!
//! # Responsibility
//! - Pull every collection from the remote catalog under bounded
//!   concurrency and atomically replace the local snapshot.
//!
//! # Invariants
//! - The snapshot is all-or-nothing: any failed collection listing aborts
//!   the run without touching the existing snapshot.
//! - One batch work unit per collection prefix; no other fan-out shape.

use crate::batch::{run_batch, BatchOutcome, BatchReport};
use crate::catalog::{CatalogClient, CatalogError};
use crate::model::icon::IconId;
use crate::store::{SnapshotStore, StoreError};
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Knobs for one synchronization run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Concurrent collection listings; clamped by the executor.
    pub concurrency: usize,
    /// Include icons the catalog marks as hidden.
    pub include_hidden: bool,
    /// Stop listing at the first failed collection.
    pub fail_fast: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            include_hidden: false,
            fail_fast: false,
        }
    }
}

/// Summary of one completed synchronization.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncReport {
    /// Per-collection batch accounting.
    pub collections: BatchReport,
    /// Icons written into the new snapshot.
    pub icon_total: usize,
    /// Timestamp of the replaced snapshot.
    pub updated_at_ms: i64,
}

/// Synchronization failure; the previous snapshot is left untouched.
#[derive(Debug)]
pub enum SyncError {
    /// Listing the collection index itself failed.
    Transport(CatalogError),
    /// One or more collection listings failed; nothing was replaced.
    CollectionsFailed {
        failed: usize,
        skipped: usize,
        first_error: String,
    },
    /// The new snapshot could not be written.
    Store(StoreError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "{err}"),
            Self::CollectionsFailed {
                failed,
                skipped,
                first_error,
            } => write!(
                f,
                "{failed} collection listing(s) failed ({skipped} skipped); snapshot left unchanged; first error: {first_error}"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::CollectionsFailed { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<CatalogError> for SyncError {
    fn from(value: CatalogError) -> Self {
        Self::Transport(value)
    }
}

impl From<StoreError> for SyncError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Synchronizes the full catalog into the local snapshot store.
///
/// # Errors
/// - `Transport` when the collection index cannot be listed.
/// - `CollectionsFailed` when any per-collection listing fails; the
///   snapshot is replace-or-nothing.
/// - `Store` when the atomic replace fails.
pub fn sync_catalog<C: CatalogClient>(
    client: &C,
    store: &SnapshotStore,
    opts: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    info!(
        "event=sync module=sync status=start concurrency={} include_hidden={}",
        opts.concurrency, opts.include_hidden
    );

    let prefixes = client.list_collection_prefixes()?;
    let results = run_batch(prefixes, opts.concurrency, opts.fail_fast, |prefix| {
        client.list_collection_icons(prefix, opts.include_hidden)
    });
    let collections = BatchReport::from_items(&results);

    if collections.failed > 0 || collections.skipped > 0 {
        let first_error = results
            .iter()
            .find_map(|item| match &item.outcome {
                BatchOutcome::Failed(err) => Some(err.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "unknown".to_string());
        warn!(
            "event=sync module=sync status=error failed={} skipped={}",
            collections.failed, collections.skipped
        );
        return Err(SyncError::CollectionsFailed {
            failed: collections.failed,
            skipped: collections.skipped,
            first_error,
        });
    }

    let mut icons = BTreeSet::<IconId>::new();
    for item in results {
        if let BatchOutcome::Ok(collection_icons) = item.outcome {
            icons.extend(collection_icons);
        }
    }

    let snapshot = store.replace(icons)?;
    info!(
        "event=sync module=sync status=ok collections={} icons={}",
        collections.total, snapshot.total
    );
    Ok(SyncReport {
        collections,
        icon_total: snapshot.total,
        updated_at_ms: snapshot.updated_at_ms,
    })
}
