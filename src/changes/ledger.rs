//! Run-level deduplication ledger.
//!
//! Keyed by a diff's location hash (`origLine:origCol:newLine:newCol`),
//! prefixed with the file name for diffs located in a referenced file. The
//! first arrival of a location is admitted and remembers where it was
//! attributed; later arrivals of the same location are copies reached
//! through another `$ref` and are left out of the deduplicated diff set.
//! Diffs without any coordinates are never deduplicated.

use crate::diff::{Changes, Diff, DocumentChanges};
use std::collections::{HashMap, HashSet};

/// Node path and type a location was first attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub path: String,
    pub object_type: String,
}

#[derive(Debug, Default)]
pub struct DedupLedger {
    seen: HashMap<String, Attribution>,
    /// Semantic hashes of reached diffs that carry no coordinates
    unlocated: HashMap<u64, Attribution>,
    /// `(reference path, group address)` pairs already replayed
    replayed: HashSet<(String, usize)>,
    dropped: usize,
}

impl DedupLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attributed diff. Returns `true` when it is admitted to the
    /// deduplicated set.
    pub fn observe(&mut self, diff: &Diff) -> bool {
        let attribution = Attribution {
            path: diff.path.clone(),
            object_type: diff.object_type.clone(),
        };
        if diff.coordinates.is_unknown() {
            self.unlocated
                .entry(diff.semantic_hash())
                .or_insert(attribution);
            return true;
        }
        let hash = diff.dedup_key();
        if self.seen.contains_key(&hash) {
            self.dropped += 1;
            return false;
        }
        self.seen.insert(hash, attribution);
        true
    }

    /// First attribution of a dedup key (see [`Diff::dedup_key`]).
    #[must_use]
    pub fn attribution(&self, key: &str) -> Option<&Attribution> {
        self.seen.get(key)
    }

    #[must_use]
    pub fn is_seen(&self, key: &str) -> bool {
        self.seen.contains_key(key)
    }

    /// Returns `true` the first time a `(reference path, group)` pair is
    /// offered for replay.
    pub fn guard_replay(&mut self, reference_path: &str, group: usize) -> bool {
        self.replayed.insert((reference_path.to_string(), group))
    }

    /// Number of located diffs admitted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty() && self.unlocated.is_empty()
    }

    /// Arrivals rejected as duplicates.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Reduce `changes` to the deduplicated set, in tree order: the first
    /// copy of every admitted location is kept and takes the attribution
    /// recorded for it; other copies and diffs never reached are removed.
    pub fn retain(&self, changes: &mut DocumentChanges) {
        let mut kept: HashSet<String> = HashSet::new();
        changes.retain_diffs(&mut |diff: &mut Diff| {
            let found = if diff.coordinates.is_unknown() {
                self.unlocated.get(&diff.semantic_hash()).cloned()
            } else {
                let hash = diff.dedup_key();
                match self.seen.get(&hash) {
                    Some(a) if kept.insert(hash) => Some(a.clone()),
                    _ => None,
                }
            };
            match found {
                Some(a) => {
                    diff.path = a.path;
                    diff.object_type = a.object_type;
                    true
                }
                None => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeKind, Coordinates, InfoChanges};
    use crate::parsers::Position;

    fn located(property: &str, line: usize) -> Diff {
        Diff::new(property, ChangeKind::Modified)
            .at(Coordinates::new(
                Some(Position { line, column: 3 }),
                Some(Position { line, column: 3 }),
            ))
            .attributed("$.info", "info")
    }

    #[test]
    fn test_first_arrival_wins() {
        let mut ledger = DedupLedger::new();
        assert!(ledger.observe(&located("title", 3)));
        assert!(!ledger.observe(&located("title", 3).attributed("$.other", "schema")));
        assert_eq!(ledger.attribution("3:3:3:3").unwrap().path, "$.info");
        assert_eq!(ledger.dropped(), 1);
    }

    #[test]
    fn test_same_position_in_another_file_is_distinct() {
        let mut ledger = DedupLedger::new();
        assert!(ledger.observe(&located("description", 3)));
        let external = located("description", 3).sourced(Some("defs.yaml".to_string()));
        assert!(ledger.observe(&external));
        assert!(!ledger.observe(&external.clone().attributed("$.elsewhere", "schema")));
        assert_eq!(ledger.attribution("defs.yaml#3:3:3:3").unwrap().path, "$.info");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_unknown_location_never_deduplicated() {
        let mut ledger = DedupLedger::new();
        let diff = Diff::new("title", ChangeKind::Modified);
        assert!(ledger.observe(&diff));
        assert!(ledger.observe(&diff));
        assert_eq!(ledger.len(), 0);
        assert!(!ledger.is_empty());
    }

    #[test]
    fn test_replay_guard() {
        let mut ledger = DedupLedger::new();
        assert!(ledger.guard_replay("$.components.schemas['Pet']", 7));
        assert!(!ledger.guard_replay("$.components.schemas['Pet']", 7));
        assert!(ledger.guard_replay("$.components.schemas['Pet']", 8));
    }

    #[test]
    fn test_retain_keeps_first_copy() {
        let mut ledger = DedupLedger::new();
        ledger.observe(&located("title", 3));

        let mut changes = DocumentChanges {
            changes: vec![located("title", 3), located("version", 9)],
            info: Some(InfoChanges {
                changes: vec![located("title", 3)],
                ..InfoChanges::default()
            }),
            ..DocumentChanges::default()
        };
        ledger.retain(&mut changes);
        assert_eq!(changes.total(), 1);
        assert_eq!(changes.changes[0].path, "$.info");
        assert!(changes.info.as_ref().unwrap().changes.is_empty());
    }
}
