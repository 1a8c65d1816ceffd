//! Normalizes property-level diffs into node-change records.

use crate::diff::Diff;
use crate::graph::SemanticNode;
use crate::model::ObjectKind;
use serde::{Deserialize, Serialize};

/// Changes attributed to one semantic node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeChange {
    /// Id of the node the change is attached to
    pub id: String,
    pub id_hash: u64,
    #[serde(rename = "type")]
    pub object_type: String,
    /// Reported path when it differs from the node id (list fields, map
    /// entries, missing children)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub diffs: Vec<Diff>,
}

impl NodeChange {
    #[must_use]
    pub fn breaking(&self) -> usize {
        self.diffs.iter().filter(|d| d.breaking).count()
    }

    /// Path the change is reported under.
    #[must_use]
    pub fn reported_path(&self) -> &str {
        self.path.as_deref().unwrap_or(&self.id)
    }
}

/// Where a batch of diffs is reported when it is not the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOverride {
    pub path: String,
    pub object_type: String,
}

impl PathOverride {
    pub fn new(path: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            object_type: object_type.into(),
        }
    }
}

/// List fields whose member additions and removals are reported under
/// `{node}.{field}` rather than the node itself.
fn list_field(kind: ObjectKind, property: &str) -> bool {
    let fields: &[&str] = match kind {
        ObjectKind::Document => &["servers", "tags", "security"],
        ObjectKind::PathItem => &["servers", "parameters"],
        ObjectKind::Operation => &["parameters", "servers", "security"],
        ObjectKind::Schema => &["allOf", "oneOf", "anyOf", "prefixItems"],
        _ => &[],
    };
    fields.contains(&property)
}

/// The override for one of `node`'s own diffs. Member additions and
/// removals of a list field are reported under `{node}.{field}`, map
/// entries under the entry's own path.
#[must_use]
pub fn member_override(node: &SemanticNode<'_>, diff: &Diff) -> Option<PathOverride> {
    if !diff.kind.is_addition() && !diff.kind.is_removal() {
        return None;
    }
    if let Some(entry) = &diff.entry {
        let owner = match &entry.field {
            Some(field) => node.path.field(field),
            None => node.path.clone(),
        };
        return Some(PathOverride::new(
            owner.key(&diff.property).to_string(),
            entry.kind.label(),
        ));
    }
    list_field(node.kind, &diff.property)
        .then(|| PathOverride::new(format!("{}.{}", node.id, diff.property), &diff.property))
}

/// Build the change record for `node`, rewriting every diff's attribution.
#[must_use]
pub fn adapt<'a>(
    node: &SemanticNode<'_>,
    diffs: impl IntoIterator<Item = &'a Diff>,
    path_override: Option<&PathOverride>,
) -> NodeChange {
    let (path, object_type) = match path_override {
        Some(o) => (o.path.clone(), o.object_type.clone()),
        None => (node.id.clone(), node.kind.label().to_string()),
    };
    let diffs = diffs
        .into_iter()
        .map(|d| d.clone().attributed(path.clone(), object_type.clone()))
        .collect();
    NodeChange {
        id: node.id.clone(),
        id_hash: node.id_hash,
        object_type,
        path: path_override.map(|o| o.path.clone()),
        index: node.index,
        diffs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{ChangeKind, MapEntry};
    use crate::graph::SemanticGraph;
    use crate::parsers::parse_document_str;

    #[test]
    fn test_adapt_rewrites_attribution() {
        let parsed = parse_document_str("openapi: 3.1.0\ninfo:\n  title: a\n").unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let info = graph.find("$.info").unwrap();
        let diff = Diff::new("title", ChangeKind::Modified).attributed("$.elsewhere", "other");
        let change = adapt(info, [&diff], None);
        assert_eq!(change.id, "$.info");
        assert_eq!(change.object_type, "info");
        assert_eq!(change.diffs[0].path, "$.info");
        assert_eq!(change.reported_path(), "$.info");
    }

    #[test]
    fn test_member_override_only_for_list_fields() {
        let parsed = parse_document_str("openapi: 3.1.0\n").unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let root = graph.node(0);
        let added = Diff::new("servers", ChangeKind::ObjectAdded);
        let o = member_override(root, &added).unwrap();
        assert_eq!(o.path, "$.servers");
        assert_eq!(o.object_type, "servers");
        assert!(member_override(root, &Diff::new("openapi", ChangeKind::Modified)).is_none());
        assert!(member_override(root, &Diff::new("x-servers", ChangeKind::PropertyAdded)).is_none());
    }

    #[test]
    fn test_removed_map_entry_reported_at_its_key() {
        let parsed = parse_document_str(
            "openapi: 3.1.0\npaths:\n  /p:\n    get:\n      responses:\n        '201':\n          description: made\n",
        )
        .unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let responses = graph.find("$.paths['/p'].get.responses").unwrap();
        let mut removed = Diff::new("200", ChangeKind::ObjectRemoved);
        removed.entry = Some(MapEntry {
            field: None,
            kind: ObjectKind::Response,
        });
        let o = member_override(responses, &removed).unwrap();
        assert_eq!(o.path, "$.paths['/p'].get.responses['200']");
        assert_eq!(o.object_type, "response");

        let change = adapt(responses, [&removed], Some(&o));
        assert_eq!(change.id, "$.paths['/p'].get.responses");
        assert_eq!(change.reported_path(), "$.paths['/p'].get.responses['200']");

        let operation = graph.find("$.paths['/p'].get").unwrap();
        let mut added = Diff::new("cb", ChangeKind::ObjectAdded);
        added.entry = Some(MapEntry {
            field: Some("callbacks".to_string()),
            kind: ObjectKind::Callback,
        });
        let o = member_override(operation, &added).unwrap();
        assert_eq!(o.path, "$.paths['/p'].get.callbacks['cb']");
    }
}
