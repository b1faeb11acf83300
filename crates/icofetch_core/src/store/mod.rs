//! Local snapshot persistence.
//!
//! # Responsibility
//! - Own the single on-disk snapshot of every known icon identifier.
//!
//! # Invariants
//! - The snapshot is replaced wholesale or not at all; readers never see a
//!   torn file.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod snapshot_store;

pub use snapshot_store::SnapshotStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Snapshot store error with the path that failed.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The snapshot file exists but does not decode.
    Corrupt {
        path: PathBuf,
        message: String,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "snapshot io failure at `{}`: {source}", path.display())
            }
            Self::Corrupt { path, message } => {
                write!(f, "snapshot at `{}` is corrupt: {message}", path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Corrupt { .. } => None,
        }
    }
}
