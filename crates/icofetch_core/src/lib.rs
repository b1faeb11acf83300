//! Core domain logic for icofetch.
//!
//! Resolves human queries or exact identifiers against a federated icon
//! catalog and drives bounded-concurrency synchronization and rendering.
//! This crate is the single source of truth for resolution, ranking and
//! batch-execution invariants; the CLI crate is glue.

pub mod batch;
pub mod catalog;
pub mod config;
pub mod envelope;
pub mod logging;
pub mod model;
pub mod render;
pub mod resolve;
pub mod store;
pub mod sync;

pub use batch::{run_batch, BatchItem, BatchOutcome, BatchReport};
pub use catalog::{CatalogClient, CatalogError, CatalogResult, HttpCatalogClient};
pub use config::{CoreConfig, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
pub use envelope::{
    render_error_code, resolve_error_code, sync_error_code, Envelope, EnvelopeError, ErrorCode,
    ENVELOPE_SCHEMA_VERSION,
};
pub use logging::{default_log_level, init_logging};
pub use model::{
    looks_like_icon_id, parse_manifest, Candidate, CandidateSource, IconId, IconIdError,
    ManifestError, ManifestItem, OutputFormat, RenderDefaults, ResolutionOutcome, Snapshot,
};
pub use render::{
    render_manifest, IconRenderer, RenderBatchOptions, RenderError, RenderItemError, RenderedItem,
    SvgPassthrough,
};
pub use resolve::{
    MatchMode, ResolutionEngine, ResolveError, ResolveOptions, SourceMode, DEFAULT_MIN_SCORE,
};
pub use store::{SnapshotStore, StoreError};
pub use sync::{sync_catalog, SyncError, SyncOptions, SyncReport};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
