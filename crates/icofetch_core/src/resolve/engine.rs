//! Resolution engine: ranking and outcome selection.
//!
//! # Responsibility
//! - Combine selector output with the scorer into one ranked decision.
//!
//! # Invariants
//! - Ranking is a total order: score descending, then preferred flag, then
//!   lexicographic identifier; sorting twice yields the same sequence.
//! - The preferred-prefix boost never pushes a score above `1.0` and never
//!   touches a score already equal to `1.0`.
//! - `Ambiguous` carries at most [`AMBIGUOUS_HINT_LIMIT`] candidates.

use super::scorer::score;
use super::source::{CandidateSelection, CandidateSourceSelector};
use super::{MatchMode, ResolveError, ResolveOptions, ResolveResult, PREFERRED_PREFIX_BOOST};
use crate::catalog::CatalogClient;
use crate::model::icon::{
    looks_like_icon_id, Candidate, CandidateSource, IconId, ResolutionOutcome,
};
use crate::store::SnapshotStore;
use log::{debug, info};

/// Maximum candidates carried by an ambiguous outcome.
pub const AMBIGUOUS_HINT_LIMIT: usize = 10;

/// Per-call resolution driver over a snapshot store and catalog client.
pub struct ResolutionEngine<'a, C: CatalogClient> {
    store: &'a SnapshotStore,
    client: &'a C,
}

impl<'a, C: CatalogClient> ResolutionEngine<'a, C> {
    pub fn new(store: &'a SnapshotStore, client: &'a C) -> Self {
        Self { store, client }
    }

    /// Resolves `query` into exactly one outcome.
    ///
    /// # Errors
    /// - `Usage` for blank queries, or exact mode without a full identifier.
    /// - `LocalUnavailable` when a required snapshot is missing.
    /// - `Transport` / `Store` for collaborator failures.
    pub fn resolve(
        &self,
        query: &str,
        opts: &ResolveOptions,
    ) -> ResolveResult<ResolutionOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ResolveError::Usage("query must not be empty".to_string()));
        }

        match opts.match_mode {
            MatchMode::Exact => self.resolve_exact(query, opts),
            MatchMode::Fuzzy => self.resolve_fuzzy(query, opts),
        }
    }

    fn resolve_exact(
        &self,
        query: &str,
        opts: &ResolveOptions,
    ) -> ResolveResult<ResolutionOutcome> {
        // Not-a-full-identifier in exact mode is the caller's fault, not a
        // not-found.
        if !looks_like_icon_id(query) {
            return Err(ResolveError::Usage(format!(
                "exact mode requires a full `prefix:name` identifier, got `{query}`"
            )));
        }
        let id = IconId::parse(query).map_err(|err| ResolveError::Usage(err.to_string()))?;

        let selector = CandidateSourceSelector::new(self.store, self.client);
        if selector.check_exact(&id, opts)? {
            debug!("event=resolve module=resolve status=ok mode=exact id={id}");
            Ok(ResolutionOutcome::Exact { id })
        } else {
            debug!("event=resolve module=resolve status=not_found mode=exact id={id}");
            Ok(ResolutionOutcome::NotFound)
        }
    }

    fn resolve_fuzzy(
        &self,
        query: &str,
        opts: &ResolveOptions,
    ) -> ResolveResult<ResolutionOutcome> {
        let selector = CandidateSourceSelector::new(self.store, self.client);

        let primary = selector.primary(query, opts)?;
        let considered = primary.ids.len();
        let survivors = rank(query, &primary.ids, opts);

        if survivors.is_empty() {
            if let Some(rescue) = selector.fallback(query, opts, primary.source)? {
                info!(
                    "event=resolve_fallback module=resolve from={} to={} query={query}",
                    primary.source.as_str(),
                    rescue.source.as_str()
                );
                return Ok(outcome_from(query, rescue, opts));
            }
        }

        Ok(select_outcome(survivors, considered, primary.source, opts))
    }
}

fn outcome_from(
    query: &str,
    selection: CandidateSelection,
    opts: &ResolveOptions,
) -> ResolutionOutcome {
    let considered = selection.ids.len();
    let survivors = rank(query, &selection.ids, opts);
    select_outcome(survivors, considered, selection.source, opts)
}

fn select_outcome(
    mut survivors: Vec<Candidate>,
    considered: usize,
    source: CandidateSource,
    opts: &ResolveOptions,
) -> ResolutionOutcome {
    if survivors.is_empty() {
        return ResolutionOutcome::NotFound;
    }
    if survivors.len() == 1 || opts.auto_pick {
        let top = survivors.remove(0);
        return ResolutionOutcome::Fuzzy {
            id: top.id,
            score: top.score,
            candidates_considered: considered,
            source,
        };
    }
    survivors.truncate(AMBIGUOUS_HINT_LIMIT);
    ResolutionOutcome::Ambiguous {
        candidates: survivors,
    }
}

/// Scores, boosts, filters and sorts candidates into ranked survivors.
pub(crate) fn rank(query: &str, ids: &[IconId], opts: &ResolveOptions) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = ids
        .iter()
        .filter_map(|id| {
            let preferred = opts
                .preferred_prefixes
                .iter()
                .any(|prefix| prefix.eq_ignore_ascii_case(id.prefix()));

            let mut value = score(query, &id.full());
            // A perfect score is never perturbed; the boost cannot create one
            // either.
            if preferred && value < 1.0 {
                value = (value + PREFERRED_PREFIX_BOOST).min(1.0);
            }

            if value <= 0.0 || value < opts.min_score {
                return None;
            }
            Some(Candidate {
                id: id.clone(),
                score: value,
                preferred,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.preferred.cmp(&a.preferred))
            .then_with(|| a.id.cmp(&b.id))
    });
    candidates
}
