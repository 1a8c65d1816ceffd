//! Change-tree pruning and edge selection.

use super::adapter::NodeChange;
use crate::graph::{Edge, RuleResult, SemanticGraph, SemanticNode};
use crate::model::ObjectKind;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A node of the pruned change tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNode {
    pub id: String,
    pub id_hash: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<NodeChange>,
    pub render_changes: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rule_results: Vec<RuleResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChangeNode>,
}

impl ChangeNode {
    /// Copy of a semantic node without its children or model reference.
    #[must_use]
    pub fn flat(node: &SemanticNode<'_>) -> Self {
        Self {
            id: node.id.clone(),
            id_hash: node.id_hash,
            parent_id: node.parent_id.clone(),
            kind: node.kind,
            label: node.label.clone(),
            index: node.index,
            changes: node.changes.clone(),
            render_changes: node.render_changes,
            rule_results: node.rule_results.clone(),
            children: Vec::new(),
        }
    }

    /// Every node of the subtree, pre-order.
    #[must_use]
    pub fn walk(&self) -> Vec<&ChangeNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&ChangeNode> {
        self.walk().into_iter().find(|n| n.id == id)
    }

    /// Nodes in the subtree, this one included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ChangeNode::node_count).sum::<usize>()
    }

    /// Diffs attached to this node across all of its change records.
    pub fn diffs(&self) -> impl Iterator<Item = &crate::diff::Diff> {
        self.changes.iter().flat_map(|c| c.diffs.iter())
    }

    pub(crate) fn children_mut(&mut self) -> &mut [ChangeNode] {
        &mut self.children
    }

    pub(crate) fn push_rule_results(&mut self, results: impl IntoIterator<Item = RuleResult>) {
        self.rule_results.extend(results);
    }
}

/// Keep only nodes with changes or a kept descendant. Kept nodes get their
/// render flag set in the graph.
pub fn prune(graph: &mut SemanticGraph<'_>) -> Option<ChangeNode> {
    let root = graph.root()?;
    prune_node(graph, root)
}

fn prune_node(graph: &mut SemanticGraph<'_>, slot: usize) -> Option<ChangeNode> {
    let children = graph.node(slot).children.clone();
    let kept: Vec<ChangeNode> = children
        .into_iter()
        .filter_map(|child| prune_node(graph, child))
        .collect();
    let node = graph.node_mut(slot);
    if node.changes.is_empty() && kept.is_empty() {
        return None;
    }
    node.render_changes = true;
    let mut out = ChangeNode::flat(node);
    out.children = kept;
    Some(out)
}

/// Edges between kept nodes and their parents.
///
/// For every kept non-root node the catalogue edges from its parent are
/// considered; one edge per `(source, target)` survives, preferring the one
/// that carries a reference.
#[must_use]
pub fn select_edges(graph: &SemanticGraph<'_>, tree: &ChangeNode) -> Vec<Edge> {
    let mut by_target: HashMap<&str, Vec<&Edge>> = HashMap::new();
    for edge in graph.edges() {
        by_target.entry(edge.target.as_str()).or_default().push(edge);
    }

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut selected = Vec::new();
    for node in tree.walk() {
        let Some(parent) = node.parent_id.as_deref() else {
            continue;
        };
        let candidates: Vec<&Edge> = by_target
            .get(node.id.as_str())
            .map(|edges| {
                edges
                    .iter()
                    .copied()
                    .filter(|e| e.source == parent)
                    .collect()
            })
            .unwrap_or_default();
        let best = candidates
            .iter()
            .find(|e| e.reference.is_some())
            .or_else(|| candidates.first());
        if let Some(edge) = best {
            if seen.insert((edge.source.as_str(), edge.target.as_str())) {
                selected.push((*edge).clone());
            }
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeKind, Diff};
    use crate::parsers::parse_document_str;

    const DOC: &str = "openapi: 3.1.0
info:
  title: t
  contact:
    name: c
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/A'
components:
  schemas:
    A:
      type: string
";

    fn attach(graph: &mut SemanticGraph<'_>, id: &str) {
        let slot = graph.slot(id).unwrap();
        let node = graph.node(slot);
        let change = NodeChange {
            id: node.id.clone(),
            id_hash: node.id_hash,
            object_type: node.kind.label().to_string(),
            path: None,
            index: None,
            diffs: vec![Diff::new("name", ChangeKind::Modified)],
        };
        graph.node_mut(slot).changes.push(change);
    }

    #[test]
    fn test_prune_keeps_changed_branch_only() {
        let parsed = parse_document_str(DOC).unwrap();
        let mut graph = SemanticGraph::build(&parsed.document);
        attach(&mut graph, "$.info.contact");
        let tree = prune(&mut graph).unwrap();
        let ids: Vec<&str> = tree.walk().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["$", "$.info", "$.info.contact"]);
        assert!(graph.find("$.info").unwrap().render_changes);
        assert!(!graph.find("$.paths").unwrap().render_changes);
    }

    #[test]
    fn test_prune_unchanged_document_is_empty() {
        let parsed = parse_document_str(DOC).unwrap();
        let mut graph = SemanticGraph::build(&parsed.document);
        assert!(prune(&mut graph).is_none());
    }

    #[test]
    fn test_select_edges_prefers_reference() {
        let parsed = parse_document_str(DOC).unwrap();
        let mut graph = SemanticGraph::build(&parsed.document);
        let stub = "$.paths['/a'].get.responses['200'].content['application/json'].schema";
        attach(&mut graph, stub);
        let tree = prune(&mut graph).unwrap();
        let edges = select_edges(&graph, &tree);
        assert_eq!(edges.len(), tree.node_count() - 1);
        let into_stub = edges.iter().find(|e| e.target == stub).unwrap();
        assert_eq!(into_stub.reference.as_deref(), Some("#/components/schemas/A"));
    }
}
