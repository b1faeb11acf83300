//! Icon identifier domain model.
//!
//! # Responsibility
//! - Define the canonical `prefix:name` identifier shared by every layer.
//! - Define the transient ranking types produced during resolution.
//!
//! # Invariants
//! - `prefix` and `name` are both non-empty after parsing.
//! - Parsed identifiers are canonicalized to lowercase so set membership
//!   and ordering are case-insensitive.
//! - `Candidate` values are never persisted.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Separator between the collection prefix and the icon name.
pub const ID_SEPARATOR: char = ':';

/// Validation error for icon identifier parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconIdError {
    MissingSeparator(String),
    EmptyPrefix(String),
    EmptyName(String),
}

impl Display for IconIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator(value) => {
                write!(f, "icon id `{value}` is missing the `:` separator")
            }
            Self::EmptyPrefix(value) => write!(f, "icon id `{value}` has an empty prefix"),
            Self::EmptyName(value) => write!(f, "icon id `{value}` has an empty name"),
        }
    }
}

impl Error for IconIdError {}

/// Canonical identifier for one icon inside one collection.
///
/// Stored in canonical lowercase form; comparisons, ordering and snapshot
/// membership all operate on that form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IconId {
    prefix: String,
    name: String,
}

impl IconId {
    /// Parses `prefix:name` into a canonical identifier.
    ///
    /// # Errors
    /// - `MissingSeparator` when no `:` is present.
    /// - `EmptyPrefix` / `EmptyName` when either side is blank.
    pub fn parse(value: &str) -> Result<Self, IconIdError> {
        let trimmed = value.trim();
        let Some((prefix, name)) = trimmed.split_once(ID_SEPARATOR) else {
            return Err(IconIdError::MissingSeparator(trimmed.to_string()));
        };

        let prefix = prefix.trim().to_ascii_lowercase();
        let name = name.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return Err(IconIdError::EmptyPrefix(trimmed.to_string()));
        }
        if name.is_empty() {
            return Err(IconIdError::EmptyName(trimmed.to_string()));
        }

        Ok(Self { prefix, name })
    }

    /// Collection prefix, e.g. `mdi` in `mdi:home`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Icon name, e.g. `home` in `mdi:home`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full `prefix:name` form.
    pub fn full(&self) -> String {
        format!("{}{ID_SEPARATOR}{}", self.prefix, self.name)
    }
}

impl Display for IconId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{ID_SEPARATOR}{}", self.prefix, self.name)
    }
}

impl TryFrom<String> for IconId {
    type Error = IconIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<IconId> for String {
    fn from(value: IconId) -> Self {
        value.full()
    }
}

/// Returns whether raw input already looks like a full `prefix:name` id.
///
/// Used by exact-mode validation; does not guarantee the input parses.
pub fn looks_like_icon_id(value: &str) -> bool {
    value.contains(ID_SEPARATOR)
}

/// Which backing source produced a set of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// The local snapshot file.
    Local,
    /// The remote catalog API.
    Remote,
}

impl CandidateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

/// Transient ranking entry for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: IconId,
    /// Similarity in `[0, 1]` after any preferred-prefix boost.
    pub score: f64,
    /// Whether `id.prefix()` is in the caller's preferred set.
    pub preferred: bool,
}

/// Final decision of one resolution call.
///
/// Failure legs (missing snapshot, transport faults, malformed input) are
/// modeled as errors, not variants; see `resolve::ResolveError`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// The query was a full identifier and an existence check confirmed it.
    Exact { id: IconId },
    /// Ranking selected one winner.
    Fuzzy {
        id: IconId,
        score: f64,
        candidates_considered: usize,
        source: CandidateSource,
    },
    /// Multiple viable candidates and no deterministic auto-pick requested.
    ///
    /// Carries at most the top 10 candidates as a disambiguation hint.
    Ambiguous { candidates: Vec<Candidate> },
    /// No candidate survived filtering and ranking.
    NotFound,
}
