//! Statistics over the deduplicated diff set.

use crate::diff::{ChangeKind, Changes, Diff, DocumentChanges};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts for one object type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    pub additions: usize,
    pub modifications: usize,
    pub removals: usize,
    pub breaking: usize,
}

impl TypeCounts {
    fn record(&mut self, diff: &Diff) {
        match diff.kind {
            ChangeKind::PropertyAdded | ChangeKind::ObjectAdded => self.additions += 1,
            ChangeKind::Modified => self.modifications += 1,
            ChangeKind::PropertyRemoved | ChangeKind::ObjectRemoved => self.removals += 1,
        }
        if diff.breaking {
            self.breaking += 1;
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.additions + self.modifications + self.removals
    }
}

/// Change statistics, one count per change record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatistics {
    pub total: usize,
    pub additions: usize,
    pub modifications: usize,
    pub removals: usize,
    pub breaking: usize,
    /// Counts keyed by attributed object type
    pub by_type: BTreeMap<String, TypeCounts>,
}

impl ChangeStatistics {
    #[must_use]
    pub fn from_diffs<'a>(diffs: impl IntoIterator<Item = &'a Diff>) -> Self {
        let mut overall = TypeCounts::default();
        let mut by_type: BTreeMap<String, TypeCounts> = BTreeMap::new();
        for diff in diffs {
            overall.record(diff);
            by_type
                .entry(diff.object_type.clone())
                .or_default()
                .record(diff);
        }
        Self {
            total: overall.total(),
            additions: overall.additions,
            modifications: overall.modifications,
            removals: overall.removals,
            breaking: overall.breaking,
            by_type,
        }
    }

    #[must_use]
    pub fn from_changes(changes: &DocumentChanges) -> Self {
        Self::from_diffs(changes.all_changes())
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.total > 0
    }

    #[must_use]
    pub fn has_breaking(&self) -> bool {
        self.breaking > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_partition_total() {
        let diffs = vec![
            Diff::new("a", ChangeKind::PropertyAdded).attributed("$", "document"),
            Diff::new("b", ChangeKind::ObjectAdded).attributed("$", "document"),
            Diff::new("c", ChangeKind::Modified)
                .breaking(true)
                .attributed("$.info", "info"),
            Diff::new("d", ChangeKind::ObjectRemoved).attributed("$.info", "info"),
        ];
        let stats = ChangeStatistics::from_diffs(&diffs);
        assert_eq!(stats.additions, 2);
        assert_eq!(stats.modifications, 1);
        assert_eq!(stats.removals, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.breaking, 1);
        assert_eq!(stats.by_type["info"].total(), 2);
        assert!(stats.has_breaking());
    }

    #[test]
    fn test_empty() {
        let stats = ChangeStatistics::from_changes(&DocumentChanges::default());
        assert!(!stats.has_changes());
        assert!(stats.by_type.is_empty());
    }
}
