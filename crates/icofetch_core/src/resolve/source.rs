//! Candidate source selection and fallback protocol.
//!
//! # Responsibility
//! - Decide whether candidates come from the local snapshot, the remote
//!   catalog, or both in sequence, per the declared source mode.
//! - Narrow candidate lists by the optional collection allow-set before
//!   ranking.
//!
//! # Invariants
//! - `local-only`, and `auto` with the offline flag, never touch the
//!   network; a missing snapshot fails with `LocalUnavailable`.
//! - `remote-only` never falls back to the snapshot.
//! - The auto fallback to remote exists only for the zero-results path;
//!   it never augments a non-empty local result set.

use super::{ResolveError, ResolveOptions, ResolveResult};
use crate::catalog::CatalogClient;
use crate::model::icon::{CandidateSource, IconId};
use crate::store::SnapshotStore;
use std::collections::BTreeSet;

/// Where candidates may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    /// Snapshot only; missing snapshot is an error.
    LocalOnly,
    /// Remote catalog only; client errors surface directly.
    RemoteOnly,
    /// Snapshot first when present, remote as creation-or-rescue source.
    #[default]
    Auto,
}

impl SourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LocalOnly => "local",
            Self::RemoteOnly => "remote",
            Self::Auto => "auto",
        }
    }
}

/// One fetched candidate set, labeled with its origin.
#[derive(Debug, Clone)]
pub struct CandidateSelection {
    pub ids: Vec<IconId>,
    pub source: CandidateSource,
}

/// Applies the source-mode protocol over a store and a client.
pub struct CandidateSourceSelector<'a, C: CatalogClient> {
    store: &'a SnapshotStore,
    client: &'a C,
}

impl<'a, C: CatalogClient> CandidateSourceSelector<'a, C> {
    pub fn new(store: &'a SnapshotStore, client: &'a C) -> Self {
        Self { store, client }
    }

    /// Fetches the primary candidate set for `query` under `opts`.
    pub fn primary(&self, query: &str, opts: &ResolveOptions) -> ResolveResult<CandidateSelection> {
        match (opts.source_mode, opts.offline) {
            (SourceMode::LocalOnly, _) | (SourceMode::Auto, true) => self.local(opts),
            (SourceMode::RemoteOnly, _) => self.remote(query, opts),
            (SourceMode::Auto, false) => {
                // Snapshot present: local is the primary source. Absent: go
                // straight to remote rather than failing.
                match self.store.read()? {
                    Some(_) => self.local(opts),
                    None => self.remote(query, opts),
                }
            }
        }
    }

    /// Returns the rescue candidate set for the zero-results path, or `None`
    /// when the protocol forbids a second source.
    pub fn fallback(
        &self,
        query: &str,
        opts: &ResolveOptions,
        primary_source: CandidateSource,
    ) -> ResolveResult<Option<CandidateSelection>> {
        let auto_online = opts.source_mode == SourceMode::Auto && !opts.offline;
        if auto_online && primary_source == CandidateSource::Local {
            return self.remote(query, opts).map(Some);
        }
        Ok(None)
    }

    /// Single existence check for exact-mode resolution.
    ///
    /// Auto mode online mirrors the fuzzy fallback discipline: one remote
    /// probe, only after a local miss.
    pub fn check_exact(&self, id: &IconId, opts: &ResolveOptions) -> ResolveResult<bool> {
        match (opts.source_mode, opts.offline) {
            (SourceMode::LocalOnly, _) | (SourceMode::Auto, true) => {
                let snapshot = self.store.read()?.ok_or(ResolveError::LocalUnavailable)?;
                Ok(snapshot.contains(id))
            }
            (SourceMode::RemoteOnly, _) => Ok(self.client.exists(id)?),
            (SourceMode::Auto, false) => match self.store.read()? {
                Some(snapshot) if snapshot.contains(id) => Ok(true),
                _ => Ok(self.client.exists(id)?),
            },
        }
    }

    fn local(&self, opts: &ResolveOptions) -> ResolveResult<CandidateSelection> {
        let snapshot = self.store.read()?.ok_or(ResolveError::LocalUnavailable)?;
        let ids = filter_allowed(
            snapshot.icons.into_iter().collect(),
            opts.allowed_prefixes.as_ref(),
        );
        Ok(CandidateSelection {
            ids,
            source: CandidateSource::Local,
        })
    }

    fn remote(&self, query: &str, opts: &ResolveOptions) -> ResolveResult<CandidateSelection> {
        let ids = self.client.search(query, opts.search_limit)?;
        Ok(CandidateSelection {
            ids: filter_allowed(ids, opts.allowed_prefixes.as_ref()),
            source: CandidateSource::Remote,
        })
    }
}

/// Drops candidates outside the allow-set. An allow-set that excludes every
/// candidate yields an empty list, which ranks to `NotFound` downstream.
fn filter_allowed(ids: Vec<IconId>, allowed: Option<&BTreeSet<String>>) -> Vec<IconId> {
    let Some(allowed) = allowed else {
        return ids;
    };
    ids.into_iter()
        .filter(|id| {
            allowed
                .iter()
                .any(|prefix| prefix.eq_ignore_ascii_case(id.prefix()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_allowed;
    use crate::model::icon::IconId;
    use std::collections::BTreeSet;

    fn ids(values: &[&str]) -> Vec<IconId> {
        values
            .iter()
            .map(|v| IconId::parse(v).expect("test id should parse"))
            .collect()
    }

    #[test]
    fn allow_set_filters_case_insensitively() {
        let allowed: BTreeSet<String> = ["MDI".to_string()].into_iter().collect();
        let filtered = filter_allowed(ids(&["mdi:home", "emoji:bacon"]), Some(&allowed));
        assert_eq!(filtered, ids(&["mdi:home"]));
    }

    #[test]
    fn missing_allow_set_keeps_everything() {
        let all = ids(&["mdi:home", "emoji:bacon"]);
        assert_eq!(filter_allowed(all.clone(), None), all);
    }

    #[test]
    fn allow_set_can_exclude_everything() {
        let allowed: BTreeSet<String> = ["tabler".to_string()].into_iter().collect();
        assert!(filter_allowed(ids(&["mdi:home"]), Some(&allowed)).is_empty());
    }
}
