//! Query-to-identifier similarity scoring.
//!
//! # Responsibility
//! - Map a query string and a candidate identifier to a score in `[0, 1]`.
//!
//! # Invariants
//! - Scoring is pure and deterministic; no allocation outlives the call.
//! - Exact, prefix and substring hits occupy fixed tiers above the bigram
//!   tail, so a high bigram coincidence can never out-rank them.
//! - An empty normalized query scores `0` against everything.

use crate::model::icon::ID_SEPARATOR;
use std::collections::BTreeSet;

/// Normalized query equals the normalized id or name.
pub const SCORE_EXACT: f64 = 1.0;
/// Normalized id or name starts with the normalized query.
pub const SCORE_PREFIX: f64 = 0.92;
/// Normalized id or name contains the normalized query.
pub const SCORE_SUBSTRING: f64 = 0.82;

/// Scores `query` against `candidate_id` (`prefix:name` or bare name).
pub fn score(query: &str, candidate_id: &str) -> f64 {
    let query = normalize(query);
    if query.is_empty() {
        return 0.0;
    }

    let full = normalize(candidate_id);
    let name = normalize(name_part(candidate_id));

    if query == full || query == name {
        return SCORE_EXACT;
    }
    if full.starts_with(&query) || name.starts_with(&query) {
        return SCORE_PREFIX;
    }
    if full.contains(&query) || name.contains(&query) {
        return SCORE_SUBSTRING;
    }

    bigram_jaccard(&query, &name)
}

/// Lowercases and strips everything but ASCII alphanumerics.
fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Text after the first prefix separator, or the whole string without one.
fn name_part(candidate_id: &str) -> &str {
    match candidate_id.split_once(ID_SEPARATOR) {
        Some((_, name)) => name,
        None => candidate_id,
    }
}

/// Jaccard similarity over adjacent-character-pair sets.
///
/// Single-character strings degrade to a one-element set so they can still
/// overlap with themselves; two empty sets yield `0`, never NaN.
fn bigram_jaccard(a: &str, b: &str) -> f64 {
    let set_a = bigrams(a);
    let set_b = bigrams(b);

    let union = set_a.union(&set_b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    intersection as f64 / union as f64
}

fn bigrams(value: &str) -> BTreeSet<String> {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => BTreeSet::new(),
        1 => BTreeSet::from([value.to_string()]),
        _ => chars
            .windows(2)
            .map(|pair| pair.iter().collect::<String>())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{score, SCORE_EXACT, SCORE_PREFIX, SCORE_SUBSTRING};

    #[test]
    fn self_score_is_one_after_normalization() {
        assert_eq!(score("home", "home"), SCORE_EXACT);
        assert_eq!(score("Home!", "mdi:home"), SCORE_EXACT);
        assert_eq!(score("mdi:home", "mdi:home"), SCORE_EXACT);
    }

    #[test]
    fn empty_query_never_matches() {
        assert_eq!(score("", "mdi:home"), 0.0);
        assert_eq!(score("  --  ", "mdi:home"), 0.0);
        assert_eq!(score("", ""), 0.0);
    }

    #[test]
    fn prefix_and_substring_tiers_are_distinct() {
        assert_eq!(score("hom", "mdi:home"), SCORE_PREFIX);
        assert_eq!(score("ome", "mdi:home"), SCORE_SUBSTRING);
    }

    #[test]
    fn unrelated_strings_fall_into_bigram_tail() {
        let value = score("baconandeggs", "mdi:bacon-strips");
        assert!(value > 0.0, "related names should share bigrams");
        assert!(
            value < SCORE_SUBSTRING,
            "bigram tail must stay below the substring tier, got {value}"
        );
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(score("zzz", "mdi:home"), 0.0);
    }

    #[test]
    fn single_character_inputs_use_degenerate_sets() {
        assert_eq!(score("x", "mdi:x"), SCORE_EXACT);
        // `q` vs name `z`: one-element sets with no overlap.
        assert_eq!(score("q", "mdi:z"), 0.0);
    }

    #[test]
    fn tiers_out_rank_bigram_tail() {
        // A name sharing bigrams without containing the query must not beat
        // a substring hit.
        let substring = score("arrow", "mdi:bold-arrow-left");
        let tail = score("arrow", "mdi:roar-war");
        assert_eq!(substring, SCORE_SUBSTRING);
        assert!(tail > 0.0);
        assert!(tail < SCORE_SUBSTRING);
    }
}
