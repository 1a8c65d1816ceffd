//! Semantic graph of an OpenAPI document.
//!
//! Every model object becomes a [`SemanticNode`] identified by its JSON
//! path. Nodes live in an arena owned by [`SemanticGraph`]; the catalogue
//! maps ids to arena slots. Edges are kept separately: one structural edge
//! per parent/child pair, plus reference edges for `$ref` stubs.
//!
//! A stub is the node of an object that is only a `$ref`. It gets an
//! annotated edge from its parent and an edge to the definition it names.
//! When the definition resolves, its subtree is built again under the stub,
//! so a change inside a shared definition has a node at every use site.

mod builder;
mod path;

pub use path::{JsonPath, Segment};

use crate::changes::NodeChange;
use crate::model::{Document, ModelRef, ObjectKind, Resolver};
use crate::parsers::ParsedDocument;
use crate::utils::id_hash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Composition keyword carried by an edge into a composed schema member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolyTag {
    #[serde(rename = "allOf")]
    AllOf,
    #[serde(rename = "oneOf")]
    OneOf,
    #[serde(rename = "anyOf")]
    AnyOf,
}

impl PolyTag {
    #[must_use]
    pub fn from_field(field: &str) -> Option<Self> {
        match field {
            "allOf" => Some(Self::AllOf),
            "oneOf" => Some(Self::OneOf),
            "anyOf" => Some(Self::AnyOf),
            _ => None,
        }
    }
}

impl fmt::Display for PolyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AllOf => "allOf",
            Self::OneOf => "oneOf",
            Self::AnyOf => "anyOf",
        })
    }
}

/// Directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    /// The `$ref` string, for reference edges
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poly: Option<PolyTag>,
}

impl Edge {
    pub fn structural(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            reference: None,
            poly: None,
        }
    }

    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    #[must_use]
    pub fn with_poly(mut self, poly: Option<PolyTag>) -> Self {
        self.poly = poly;
        self
    }
}

/// Severity of a static-analysis rule result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Error,
    Warn,
    Info,
    Hint,
}

/// A lint or rule violation reported against a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub severity: RuleSeverity,
    pub message: String,
    /// JSON path the rule reported against
    pub path: String,
}

/// One object of the document.
#[derive(Debug, Clone)]
pub struct SemanticNode<'d> {
    pub id: String,
    pub id_hash: u64,
    pub parent_id: Option<String>,
    pub kind: ObjectKind,
    /// Short display label (field name, map key or array index)
    pub label: String,
    pub index: Option<usize>,
    pub path: JsonPath,
    /// Model object, absent once the node is pruned into a change tree
    pub model: Option<ModelRef<'d>>,
    /// Definition a stub resolves to, when its subtree was built here
    pub target: Option<ModelRef<'d>>,
    pub changes: Vec<NodeChange>,
    pub render_changes: bool,
    pub rule_results: Vec<RuleResult>,
    /// Arena slots of the children, in document order
    pub children: Vec<usize>,
    /// Arena slot of the parent
    pub parent: Option<usize>,
}

impl<'d> SemanticNode<'d> {
    /// The `$ref` string when this node is a reference stub.
    #[must_use]
    pub fn reference(&self) -> Option<&'d str> {
        self.model.and_then(|m| m.reference())
    }

    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.reference().is_some()
    }

    /// Content hash of the attached model object.
    #[must_use]
    pub fn content_hash(&self) -> Option<u64> {
        self.model.map(|m| m.content_hash())
    }
}

/// Node arena plus id catalogue and edge list.
#[derive(Debug, Default)]
pub struct SemanticGraph<'d> {
    nodes: Vec<SemanticNode<'d>>,
    catalogue: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl<'d> SemanticGraph<'d> {
    /// Build the graph of a document, resolving local references only.
    #[must_use]
    pub fn build(document: &'d Document) -> Self {
        Self::with_resolver(document, Resolver::new(document))
    }

    /// Build the graph of a loaded document, resolving references into the
    /// files it names as well.
    #[must_use]
    pub fn from_parsed(parsed: &'d ParsedDocument) -> Self {
        Self::with_resolver(&parsed.document, parsed.resolver())
    }

    /// References made by `model` and the objects below it, with the kind
    /// of object each one stands in for. References are not followed.
    #[must_use]
    pub fn references(model: ModelRef<'d>) -> Vec<(ObjectKind, &'d str)> {
        builder::GraphBuilder::new(None).fragment(model)
    }

    fn with_resolver(document: &'d Document, resolver: Resolver<'d>) -> Self {
        let graph = builder::GraphBuilder::new(Some(resolver)).build(document);
        tracing::debug!(
            nodes = graph.len(),
            edges = graph.edges.len(),
            "semantic graph built"
        );
        graph
    }

    pub(crate) fn add_node(
        &mut self,
        path: JsonPath,
        kind: ObjectKind,
        model: Option<ModelRef<'d>>,
        parent: Option<usize>,
    ) -> usize {
        let id = path.to_string();
        if let Some(&existing) = self.catalogue.get(&id) {
            return existing;
        }
        let slot = self.nodes.len();
        let label = match path.last() {
            None => "document".to_string(),
            Some(Segment::Field(name) | Segment::Key(name)) => name.clone(),
            Some(Segment::Index(i)) => i.to_string(),
        };
        let index = match path.last() {
            Some(Segment::Index(i)) => Some(*i),
            _ => None,
        };
        let parent_id = parent.map(|p| self.nodes[p].id.clone());
        self.nodes.push(SemanticNode {
            id_hash: id_hash(&id),
            id: id.clone(),
            parent_id,
            kind,
            label,
            index,
            path,
            model,
            target: None,
            changes: Vec::new(),
            render_changes: false,
            rule_results: Vec::new(),
            children: Vec::new(),
            parent,
        });
        if let Some(p) = parent {
            self.nodes[p].children.push(slot);
        }
        self.catalogue.insert(id, slot);
        slot
    }

    pub(crate) fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Arena slot of the document root.
    #[must_use]
    pub fn root(&self) -> Option<usize> {
        (!self.nodes.is_empty()).then_some(0)
    }

    /// Arena slot for a node id.
    #[must_use]
    pub fn slot(&self, id: &str) -> Option<usize> {
        self.catalogue.get(id).copied()
    }

    #[must_use]
    pub fn node(&self, slot: usize) -> &SemanticNode<'d> {
        &self.nodes[slot]
    }

    pub fn node_mut(&mut self, slot: usize) -> &mut SemanticNode<'d> {
        &mut self.nodes[slot]
    }

    /// Look a node up by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&SemanticNode<'d>> {
        self.slot(id).map(|slot| &self.nodes[slot])
    }

    /// Slot of a node's child at `path`, if that child exists.
    #[must_use]
    pub fn child_at(&self, path: &JsonPath) -> Option<usize> {
        self.catalogue.get(&path.to_string()).copied()
    }

    /// Slots of the array members under `field` of the node at `slot`.
    #[must_use]
    pub fn members(&self, slot: usize, field: &str) -> Vec<usize> {
        let base = self.nodes[slot].path.field(field);
        (0..)
            .map_while(|i| self.child_at(&base.index(i)))
            .collect()
    }

    /// Chain of slots from `slot` up to the root, `slot` first.
    #[must_use]
    pub fn ancestry(&self, slot: usize) -> Vec<usize> {
        let mut chain = vec![slot];
        let mut current = self.nodes[slot].parent;
        while let Some(p) = current {
            chain.push(p);
            current = self.nodes[p].parent;
        }
        chain
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SemanticNode<'d>> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edges pointing at `target`.
    pub fn edges_to<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == target)
    }

    /// Attach a rule result to the node with id `path`. Returns `false`
    /// when no such node exists.
    pub fn attach_rule_result(&mut self, result: RuleResult) -> bool {
        match self.slot(&result.path) {
            Some(slot) => {
                self.nodes[slot].rule_results.push(result);
                true
            }
            None => false,
        }
    }

    /// Drop every attached change and render flag.
    pub fn clear_changes(&mut self) {
        for node in &mut self.nodes {
            node.changes.clear();
            node.render_changes = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_document_str;

    const DOC: &str = "openapi: 3.1.0
info:
  title: pets
servers:
  - url: https://a
  - url: https://b
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  schemas:
    Pet:
      allOf:
        - type: object
";

    #[test]
    fn test_catalogue_and_members() {
        let parsed = parse_document_str(DOC).unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let root = graph.root().unwrap();
        assert_eq!(graph.node(root).id, "$");
        assert_eq!(graph.members(root, "servers").len(), 2);
        let info = graph.find("$.info").unwrap();
        assert_eq!(info.kind, ObjectKind::Info);
        assert_eq!(info.parent_id.as_deref(), Some("$"));
        assert!(graph
            .find("$.paths['/pets'].get.responses['200'].content['application/json'].schema")
            .is_some());
    }

    #[test]
    fn test_stub_edges() {
        let parsed = parse_document_str(DOC).unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let stub_id = "$.paths['/pets'].get.responses['200'].content['application/json'].schema";
        let stub = graph.find(stub_id).unwrap();
        assert!(stub.is_stub());
        assert!(stub.target.is_some());
        assert_eq!(stub.children.len(), 1);
        let member = graph.node(stub.children[0]);
        assert_eq!(member.id, format!("{stub_id}.allOf[0]"));
        assert_eq!(member.parent_id.as_deref(), Some(stub_id));

        let into_stub: Vec<_> = graph.edges_to(stub_id).collect();
        assert_eq!(into_stub.len(), 2);
        assert!(into_stub.iter().any(|e| e.reference.is_some()));
        assert!(graph
            .edges()
            .iter()
            .any(|e| e.source == stub_id && e.target == "$.components.schemas['Pet']"));
    }

    #[test]
    fn test_poly_tag_on_composed_member() {
        let parsed = parse_document_str(DOC).unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let edge = graph
            .edges_to("$.components.schemas['Pet'].allOf[0]")
            .next()
            .unwrap();
        assert_eq!(edge.poly, Some(PolyTag::AllOf));
    }

    #[test]
    fn test_self_reference_expands_once() {
        let doc = "openapi: 3.1.0
paths:
  /pets:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  schemas:
    Pet:
      properties:
        name:
          type: string
        parent:
          $ref: '#/components/schemas/Pet'
";
        let parsed = parse_document_str(doc).unwrap();
        let graph = SemanticGraph::build(&parsed.document);
        let site = "$.paths['/pets'].get.responses['200'].content['application/json'].schema";
        assert!(graph.find(&format!("{site}.properties['name']")).is_some());
        let parent = graph.find(&format!("{site}.properties['parent']")).unwrap();
        assert!(parent.is_stub());
        assert!(parent.target.is_none());
        assert!(parent.children.is_empty());

        let inner = graph.find("$.components.schemas['Pet'].properties['parent']").unwrap();
        assert!(inner.target.is_none());
    }

    #[test]
    fn test_references_of_fragment() {
        let parsed = parse_document_str(DOC).unwrap();
        let found = SemanticGraph::references(ModelRef::Document(&parsed.document));
        assert_eq!(found, vec![(ObjectKind::Schema, "#/components/schemas/Pet")]);
    }

    #[test]
    fn test_attach_rule_result() {
        let parsed = parse_document_str(DOC).unwrap();
        let mut graph = SemanticGraph::build(&parsed.document);
        let attached = graph.attach_rule_result(RuleResult {
            rule_id: "info-contact".to_string(),
            severity: RuleSeverity::Warn,
            message: "info is missing contact".to_string(),
            path: "$.info".to_string(),
        });
        assert!(attached);
        assert_eq!(graph.find("$.info").unwrap().rule_results.len(), 1);
        assert!(!graph.attach_rule_result(RuleResult {
            rule_id: "x".to_string(),
            severity: RuleSeverity::Hint,
            message: String::new(),
            path: "$.nowhere".to_string(),
        }));
    }
}
