//! Node-tree deduplication for rendering.
//!
//! After distribution a definition change can sit on several nodes: each
//! use site and the definition itself. The deduplicator assigns every
//! distinct diff to exactly one node, the deepest one it was found at, so a
//! report renders it once at its most specific location.

use super::prune::ChangeNode;
use crate::diff::Diff;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;

/// Child id -> parent id.
#[derive(Debug, Clone, Default)]
pub struct HierarchyMap {
    parents: HashMap<String, String>,
}

impl HierarchyMap {
    pub fn register(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(child.into(), parent.into());
    }

    /// Length of the chain from `id` to the root.
    #[must_use]
    pub fn depth(&self, id: &str) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parents.get(current) {
            depth += 1;
            current = parent;
            if depth > self.parents.len() {
                break;
            }
        }
        depth
    }

    #[must_use]
    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Claim {
    node: String,
    depth: usize,
    diff: Diff,
}

/// Counters over one deduplication pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodeDedupStats {
    pub seen: usize,
    pub unique: usize,
    pub reclaimed: usize,
    pub dropped: usize,
}

#[derive(Debug, Default)]
pub struct NodeTreeDeduplicator {
    hierarchy: HierarchyMap,
    claims: HashMap<u64, Claim>,
    /// Claimed semantic hashes per node, in arrival order
    by_node: IndexMap<String, Vec<u64>>,
    stats: NodeDedupStats,
}

impl NodeTreeDeduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whole change tree and process its diffs.
    #[must_use]
    pub fn from_tree(tree: &ChangeNode) -> Self {
        let mut dedup = Self::new();
        let nodes = tree.walk();
        for node in &nodes {
            if let Some(parent) = &node.parent_id {
                dedup.hierarchy.register(node.id.clone(), parent.clone());
            }
        }
        for node in nodes {
            let diffs: Vec<&Diff> = node.diffs().collect();
            dedup.process(&node.id, diffs);
        }
        dedup
    }

    pub fn hierarchy_mut(&mut self) -> &mut HierarchyMap {
        &mut self.hierarchy
    }

    /// Offer the diffs found at `node`. Each one is claimed by the deepest
    /// node that offers it.
    pub fn process<'a>(&mut self, node: &str, diffs: impl IntoIterator<Item = &'a Diff>) {
        let depth = self.hierarchy.depth(node);
        for diff in diffs {
            self.stats.seen += 1;
            let hash = diff.semantic_hash();
            match self.claims.get(&hash) {
                None => {
                    self.stats.unique += 1;
                }
                Some(prior) if prior.depth < depth => {
                    let prior_node = prior.node.clone();
                    if let Some(list) = self.by_node.get_mut(&prior_node) {
                        list.retain(|h| *h != hash);
                    }
                    self.stats.reclaimed += 1;
                }
                Some(_) => {
                    self.stats.dropped += 1;
                    continue;
                }
            }
            self.claims.insert(
                hash,
                Claim {
                    node: node.to_string(),
                    depth,
                    diff: diff.clone(),
                },
            );
            self.by_node.entry(node.to_string()).or_default().push(hash);
        }
    }

    /// Diffs claimed by `node`, in arrival order.
    #[must_use]
    pub fn unique_for(&self, node: &str) -> Vec<&Diff> {
        self.by_node
            .get(node)
            .map(|hashes| {
                hashes
                    .iter()
                    .filter_map(|h| self.claims.get(h).map(|c| &c.diff))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every claimed diff, grouped by node in first-claim order.
    #[must_use]
    pub fn unique(&self) -> Vec<&Diff> {
        self.by_node
            .values()
            .flatten()
            .filter_map(|h| self.claims.get(h).map(|c| &c.diff))
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> NodeDedupStats {
        self.stats
    }

    /// Forget all claims, keeping the registered hierarchy.
    pub fn reset(&mut self) {
        self.claims.clear();
        self.by_node.clear();
        self.stats = NodeDedupStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeKind;

    fn diff(property: &str) -> Diff {
        Diff::new(property, ChangeKind::Modified)
    }

    fn dedup() -> NodeTreeDeduplicator {
        let mut d = NodeTreeDeduplicator::new();
        let h = d.hierarchy_mut();
        h.register("$.a", "$");
        h.register("$.a.b", "$.a");
        h.register("$.c", "$");
        d
    }

    #[test]
    fn test_depth() {
        let d = dedup();
        assert_eq!(d.hierarchy.depth("$"), 0);
        assert_eq!(d.hierarchy.depth("$.a.b"), 2);
    }

    #[test]
    fn test_deeper_node_reclaims() {
        let mut d = dedup();
        let x = diff("type");
        d.process("$.a", [&x]);
        d.process("$.a.b", [&x]);
        assert!(d.unique_for("$.a").is_empty());
        assert_eq!(d.unique_for("$.a.b").len(), 1);
        assert_eq!(d.stats().reclaimed, 1);
    }

    #[test]
    fn test_equal_or_shallower_node_drops() {
        let mut d = dedup();
        let x = diff("type");
        d.process("$.a.b", [&x]);
        d.process("$.c", [&x]);
        d.process("$.a", [&x]);
        assert_eq!(d.unique_for("$.a.b").len(), 1);
        assert!(d.unique_for("$.c").is_empty());
        assert_eq!(d.unique().len(), 1);
        assert_eq!(d.stats().dropped, 2);

        d.reset();
        assert!(d.unique().is_empty());
        assert_eq!(d.hierarchy.depth("$.a.b"), 2);
    }
}
