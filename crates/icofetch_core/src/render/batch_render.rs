//! Manifest-driven batch rendering pipeline.
//!
//! # Responsibility
//! - Resolve, download, render and write every manifest item through the
//!   batch executor.
//! - Classify per-item failures so the envelope layer can map exit codes.
//!
//! # Invariants
//! - Batch-level render defaults and resolution options are merged per item
//!   at consumption time; an item override replaces the batch value.
//! - One item's failure never aborts the batch outside fail-fast mode.
//! - Output file ordering on disk is unconstrained; result ordering is
//!   positionally stable.

use super::{IconRenderer, RenderError};
use crate::batch::{run_batch, BatchItem};
use crate::catalog::{CatalogClient, CatalogError};
use crate::model::icon::{Candidate, IconId, ResolutionOutcome};
use crate::model::manifest::{ManifestItem, RenderDefaults};
use crate::resolve::{ResolutionEngine, ResolveError, ResolveOptions};
use crate::store::SnapshotStore;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Options for one batch render run.
#[derive(Debug, Clone, Default)]
pub struct RenderBatchOptions {
    /// Concurrent render workers; clamped by the executor.
    pub concurrency: usize,
    /// Stop at the first failing item.
    pub fail_fast: bool,
    /// Batch-level fallbacks for optional manifest fields.
    pub defaults: RenderDefaults,
    /// Base resolution options; items may override individual fields.
    pub resolve: ResolveOptions,
}

/// Successful result for one manifest item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub id: IconId,
    pub output: PathBuf,
    pub bytes_written: usize,
}

/// Classified failure for one manifest item.
#[derive(Debug)]
pub enum RenderItemError {
    /// Resolution produced no viable candidate.
    NotFound { query: String },
    /// Resolution refused to guess between multiple candidates.
    Ambiguous {
        query: String,
        candidates: Vec<Candidate>,
    },
    /// Resolution itself failed (usage, missing snapshot, transport).
    Resolve(ResolveError),
    /// The asset download failed after a successful resolution.
    Transport(CatalogError),
    /// The rendering backend failed.
    Render(RenderError),
    /// The output file could not be written.
    Filesystem { path: PathBuf, message: String },
}

impl Display for RenderItemError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { query } => write!(f, "no icon matches `{query}`"),
            Self::Ambiguous { query, candidates } => write!(
                f,
                "`{query}` is ambiguous between {} candidates",
                candidates.len()
            ),
            Self::Resolve(err) => write!(f, "{err}"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Render(err) => write!(f, "{err}"),
            Self::Filesystem { path, message } => {
                write!(f, "failed to write `{}`: {message}", path.display())
            }
        }
    }
}

impl Error for RenderItemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resolve(err) => Some(err),
            Self::Transport(err) => Some(err),
            Self::Render(err) => Some(err),
            _ => None,
        }
    }
}

/// Renders every manifest item, returning positionally stable results.
///
/// Each worker resolves the item's query, downloads the SVG, renders it with
/// the merged per-item options and writes the output file.
pub fn render_manifest<C: CatalogClient, R: IconRenderer>(
    client: &C,
    store: &SnapshotStore,
    renderer: &R,
    items: Vec<ManifestItem>,
    opts: &RenderBatchOptions,
) -> Vec<BatchItem<ManifestItem, RenderedItem, RenderItemError>> {
    info!(
        "event=render_batch module=render status=start items={} concurrency={} fail_fast={}",
        items.len(),
        opts.concurrency,
        opts.fail_fast
    );

    run_batch(items, opts.concurrency, opts.fail_fast, |item| {
        render_one(client, store, renderer, item, opts)
    })
}

fn render_one<C: CatalogClient, R: IconRenderer>(
    client: &C,
    store: &SnapshotStore,
    renderer: &R,
    item: &ManifestItem,
    opts: &RenderBatchOptions,
) -> Result<RenderedItem, RenderItemError> {
    let engine = ResolutionEngine::new(store, client);
    let resolve_opts = item.effective_resolve(&opts.resolve);
    let outcome = engine
        .resolve(&item.query, &resolve_opts)
        .map_err(RenderItemError::Resolve)?;

    let id = match outcome {
        ResolutionOutcome::Exact { id } => id,
        ResolutionOutcome::Fuzzy { id, .. } => id,
        ResolutionOutcome::NotFound => {
            return Err(RenderItemError::NotFound {
                query: item.query.clone(),
            })
        }
        ResolutionOutcome::Ambiguous { candidates } => {
            return Err(RenderItemError::Ambiguous {
                query: item.query.clone(),
                candidates,
            })
        }
    };

    let svg = client
        .download_svg(&id)
        .map_err(RenderItemError::Transport)?;

    let effective = item.effective(&opts.defaults);
    let bytes = renderer
        .render(&svg, &effective)
        .map_err(RenderItemError::Render)?;

    if let Some(parent) = item.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| RenderItemError::Filesystem {
                path: item.output.clone(),
                message: err.to_string(),
            })?;
        }
    }
    std::fs::write(&item.output, &bytes).map_err(|err| RenderItemError::Filesystem {
        path: item.output.clone(),
        message: err.to_string(),
    })?;

    Ok(RenderedItem {
        id,
        output: item.output.clone(),
        bytes_written: bytes.len(),
    })
}
