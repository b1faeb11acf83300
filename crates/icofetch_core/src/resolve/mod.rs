//! Query resolution: scoring, source selection and ranking.
//!
//! # Responsibility
//! - Turn a human query or full identifier into a [`ResolutionOutcome`].
//! - Define the options and error taxonomy shared by the resolution path.
//!
//! # Invariants
//! - The engine never retries; one fallback re-query in auto mode is the
//!   only second attempt, and only on the empty-result path.
//! - Transport faults, missing snapshots and malformed input are errors,
//!   never silently mapped to `NotFound`.

use crate::catalog::CatalogError;
use crate::store::StoreError;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod engine;
pub mod scorer;
mod source;

pub use engine::ResolutionEngine;
pub use source::{CandidateSelection, CandidateSourceSelector, SourceMode};

/// Default minimum score a candidate must reach to count as a match.
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// Default remote search result cap.
pub const DEFAULT_SEARCH_LIMIT: u32 = 64;

/// Boost added to candidates from a preferred collection.
pub const PREFERRED_PREFIX_BOOST: f64 = 0.03;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Failure legs of one resolution call.
#[derive(Debug)]
pub enum ResolveError {
    /// Malformed caller input; never retried.
    Usage(String),
    /// A local source was required but no snapshot exists.
    LocalUnavailable,
    /// The remote catalog was unreachable or answered badly.
    Transport(CatalogError),
    /// The snapshot file could not be read.
    Store(StoreError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(message) => write!(f, "{message}"),
            Self::LocalUnavailable => {
                write!(f, "no local snapshot is available; synchronize the catalog first")
            }
            Self::Transport(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Usage(_) | Self::LocalUnavailable => None,
            Self::Transport(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<CatalogError> for ResolveError {
    fn from(value: CatalogError) -> Self {
        Self::Transport(value)
    }
}

impl From<StoreError> for ResolveError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// How the query is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The query must already be a full `prefix:name` identifier; a single
    /// existence check is performed instead of ranking.
    Exact,
    /// Candidates are gathered, scored and ranked.
    #[default]
    Fuzzy,
}

/// Per-call resolution options.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    pub match_mode: MatchMode,
    pub source_mode: SourceMode,
    /// Forbids any network access; combines with `source_mode`.
    pub offline: bool,
    /// Candidates scoring below this are dropped before outcome selection.
    pub min_score: f64,
    /// Collections whose candidates get the preferred-prefix boost.
    pub preferred_prefixes: Vec<String>,
    /// When set, candidates outside these collections are dropped before
    /// ranking (case-insensitive prefix match).
    pub allowed_prefixes: Option<BTreeSet<String>>,
    /// Deterministically pick the top-ranked result instead of reporting
    /// `Ambiguous`.
    pub auto_pick: bool,
    /// Result cap passed to remote search.
    pub search_limit: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Fuzzy,
            source_mode: SourceMode::Auto,
            offline: false,
            min_score: DEFAULT_MIN_SCORE,
            preferred_prefixes: Vec::new(),
            allowed_prefixes: None,
            auto_pick: false,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}
