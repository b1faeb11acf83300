//! Full-catalog snapshot synchronization.

mod catalog_sync;

pub use catalog_sync::{sync_catalog, SyncError, SyncOptions, SyncReport};
