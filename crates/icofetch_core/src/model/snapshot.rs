//! Local snapshot data model.
//!
//! # Responsibility
//! - Define the full-catalog snapshot record owned by the snapshot store.
//!
//! # Invariants
//! - A snapshot is always complete: it is replaced wholesale by sync and
//!   never partially mutated.
//! - `total` equals `icons.len()` for any snapshot this crate writes.

use crate::model::icon::IconId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// Full local copy of every known icon identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unix epoch milliseconds of the sync that produced this snapshot.
    pub updated_at_ms: i64,
    /// Icon count, kept redundantly for cheap status reporting.
    pub total: usize,
    /// Every known identifier, in canonical form.
    pub icons: BTreeSet<IconId>,
}

impl Snapshot {
    /// Builds a snapshot stamped with the current wall-clock time.
    pub fn now(icons: BTreeSet<IconId>) -> Self {
        Self {
            updated_at_ms: epoch_ms(),
            total: icons.len(),
            icons,
        }
    }

    pub fn contains(&self, id: &IconId) -> bool {
        self.icons.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

fn epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::Snapshot;
    use crate::model::icon::IconId;
    use std::collections::BTreeSet;

    fn id(value: &str) -> IconId {
        IconId::parse(value).expect("test id should parse")
    }

    #[test]
    fn now_counts_icons_and_stamps_time() {
        let icons: BTreeSet<_> = [id("mdi:home"), id("emoji:bacon")].into_iter().collect();
        let snapshot = Snapshot::now(icons);
        assert_eq!(snapshot.total, 2);
        assert!(snapshot.updated_at_ms > 0);
        assert!(snapshot.contains(&id("mdi:home")));
        assert!(!snapshot.contains(&id("mdi:garage")));
    }

    #[test]
    fn membership_is_case_insensitive_through_canonical_ids() {
        let icons: BTreeSet<_> = [id("mdi:home")].into_iter().collect();
        let snapshot = Snapshot::now(icons);
        assert!(snapshot.contains(&id("MDI:HOME")));
    }
}
