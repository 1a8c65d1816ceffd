//! The change visitor.
//!
//! Walks the right document's semantic graph alongside the diff-group tree.
//! At every node it attributes the group's own property diffs to the node,
//! then descends into the nested groups whose objects exist in the
//! document. At a `$ref` stub the group continues into the definition's
//! subtree built under the stub, and is queued for replay at the
//! definition itself.

use super::adapter::{adapt, member_override, PathOverride};
use super::bridge::PendingRef;
use super::context::{BuildError, ChangeSink, Ctx, ErrorSink};
use crate::diff::{
    Changes, Diff, DiffGroup, DocumentChanges, InfoChanges, ServerChanges, TagChanges,
};
use crate::error::{DistributionErrorKind, OasChangesError, Result};
use crate::graph::{JsonPath, SemanticGraph};
use crate::model::ModelRef;

pub(crate) struct Visitor<'g, 'd> {
    pub(super) graph: &'g SemanticGraph<'d>,
    sink: ChangeSink,
    errors: ErrorSink,
    pending: Vec<PendingRef<'g, 'd>>,
    strict: bool,
    pub(super) parallel_paths: bool,
}

impl<'g, 'd> Visitor<'g, 'd> {
    pub(crate) fn new(
        graph: &'g SemanticGraph<'d>,
        sink: ChangeSink,
        errors: ErrorSink,
        strict: bool,
        parallel_paths: bool,
    ) -> Self {
        Self {
            graph,
            sink,
            errors,
            pending: Vec::new(),
            strict,
            parallel_paths,
        }
    }

    /// A visitor for a worker thread: same sinks, its own pending queue.
    pub(super) fn fork(&self) -> Self {
        Self {
            graph: self.graph,
            sink: self.sink.clone(),
            errors: self.errors.clone(),
            pending: Vec::new(),
            strict: self.strict,
            parallel_paths: false,
        }
    }

    pub(super) fn absorb(&mut self, pending: Vec<PendingRef<'g, 'd>>) {
        self.pending.extend(pending);
    }

    /// Finish the pass, dropping the sink and handing back queued references.
    pub(crate) fn into_pending(self) -> Vec<PendingRef<'g, 'd>> {
        self.pending
    }

    /// Visit a node with its change group.
    pub(crate) fn visit(&mut self, ctx: Ctx<'g>) -> Result<()> {
        let node = self.graph.node(ctx.node);
        let (Some(model), target) = (node.model, node.target) else {
            return Ok(());
        };
        match model.reference() {
            Some(reference) => self.stub(ctx, model, reference, target),
            None => self.dispatch(ctx, model),
        }
    }

    fn dispatch(&mut self, ctx: Ctx<'g>, model: ModelRef<'d>) -> Result<()> {
        match (model, ctx.group) {
            (ModelRef::Document(_), DiffGroup::Document(g)) => self.document(ctx, g),
            (ModelRef::Info(_), DiffGroup::Info(g)) => self.info(ctx, g),
            (ModelRef::Contact(_), DiffGroup::Contact(g)) => self.leaf(ctx, g),
            (ModelRef::License(_), DiffGroup::License(g)) => self.leaf(ctx, g),
            (ModelRef::Paths(_), DiffGroup::Paths(g)) => self.paths(ctx, g),
            (ModelRef::PathItem(_), DiffGroup::PathItem(g)) => self.path_item(ctx, g),
            (ModelRef::Operation(_), DiffGroup::Operation(g)) => self.operation(ctx, g),
            (ModelRef::Parameter(_), DiffGroup::Parameter(g)) => self.parameter(ctx, g),
            (ModelRef::RequestBody(_), DiffGroup::RequestBody(g)) => self.request_body(ctx, g),
            (ModelRef::Responses(_), DiffGroup::Responses(g)) => self.responses(ctx, g),
            (ModelRef::Response(_), DiffGroup::Response(g)) => self.response(ctx, g),
            (ModelRef::MediaType(_), DiffGroup::MediaType(g)) => self.media_type(ctx, g),
            (ModelRef::Encoding(_), DiffGroup::Encoding(g)) => self.encoding(ctx, g),
            (ModelRef::Header(_), DiffGroup::Header(g)) => self.header(ctx, g),
            (ModelRef::Link(_), DiffGroup::Link(g)) => self.link(ctx, g),
            (ModelRef::Callback(_), DiffGroup::Callback(g)) => self.callback(ctx, g),
            (ModelRef::Example(_), DiffGroup::Example(g)) => self.leaf(ctx, g),
            (ModelRef::Schema(_), DiffGroup::Schema(g)) => self.schema(ctx, g),
            (ModelRef::Discriminator(_), DiffGroup::Discriminator(g)) => self.leaf(ctx, g),
            (ModelRef::Xml(_), DiffGroup::Xml(g)) => self.leaf(ctx, g),
            (ModelRef::ExternalDoc(_), DiffGroup::ExternalDoc(g)) => self.leaf(ctx, g),
            (ModelRef::Components(_), DiffGroup::Components(g)) => self.components(ctx, g),
            (ModelRef::SecurityScheme(_), DiffGroup::SecurityScheme(g)) => {
                self.security_scheme(ctx, g)
            }
            (ModelRef::OAuthFlows(_), DiffGroup::OAuthFlows(g)) => self.oauth_flows(ctx, g),
            (ModelRef::OAuthFlow(_), DiffGroup::OAuthFlow(g)) => self.leaf(ctx, g),
            (ModelRef::SecurityRequirement(_), DiffGroup::SecurityRequirement(g)) => {
                self.leaf(ctx, g)
            }
            (ModelRef::Tag(_), DiffGroup::Tag(g)) => self.tag(ctx, g),
            (ModelRef::Server(_), DiffGroup::Server(g)) => self.server(ctx, g),
            (ModelRef::ServerVariable(_), DiffGroup::ServerVariable(g)) => self.leaf(ctx, g),
            (model, group) => self.mismatch(ctx, model, group),
        }
    }

    fn mismatch(&mut self, ctx: Ctx<'g>, model: ModelRef<'d>, group: DiffGroup<'g>) -> Result<()> {
        let id = &self.graph.node(ctx.node).id;
        tracing::warn!(node = %id, kind = %model.kind(), group = %group, "no visit rule, skipping");
        self.errors.report(BuildError::new(
            id.clone(),
            format!("{} node visited with {group}", model.kind()),
        ));
        if self.strict {
            return Err(OasChangesError::distribution(
                format!("at {id}"),
                DistributionErrorKind::UnhandledKind {
                    kind: model.kind().to_string(),
                    group: group.kind().to_string(),
                },
            ));
        }
        Ok(())
    }

    /// A `$ref` stub. When its definition was expanded under it, the group
    /// is visited through that subtree; otherwise only the own diffs land
    /// here. Local references are also queued for replay at the definition.
    fn stub(
        &mut self,
        ctx: Ctx<'g>,
        model: ModelRef<'d>,
        reference: &'d str,
        target: Option<ModelRef<'d>>,
    ) -> Result<()> {
        if model.kind() != ctx.group.kind() {
            return self.mismatch(ctx, model, ctx.group);
        }
        match target {
            Some(target) => self.dispatch(ctx, target)?,
            None => self.attribute_here(ctx)?,
        }
        match JsonPath::from_reference(reference) {
            Some(path) => self.pending.push(PendingRef {
                path: path.to_string(),
                group: ctx.group,
                origin: model,
            }),
            None => tracing::debug!(reference, "file reference, not replayed"),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attribution
    // ------------------------------------------------------------------

    /// Publish the context group's own diffs at the context node. Member
    /// additions and removals of list fields go under `{node}.{field}`.
    pub(super) fn attribute_here(&mut self, ctx: Ctx<'g>) -> Result<()> {
        let diffs = ctx.group.property_changes();
        if diffs.is_empty() {
            return Ok(());
        }
        let node = self.graph.node(ctx.node);
        let mut batches: Vec<(Option<PathOverride>, Vec<&Diff>)> = Vec::new();
        for diff in diffs {
            let o = member_override(node, diff);
            match batches.iter_mut().find(|(existing, _)| *existing == o) {
                Some((_, batch)) => batch.push(diff),
                None => batches.push((o, vec![diff])),
            }
        }
        for (o, batch) in batches {
            let change = adapt(node, batch, o.as_ref());
            self.sink.publish(ctx.node, change)?;
        }
        Ok(())
    }

    /// Publish every diff of `group` (own and nested) at `slot`, reported
    /// under `path`. Used when the group's object has no node.
    pub(super) fn attribute_to(
        &mut self,
        slot: usize,
        group: DiffGroup<'g>,
        path: String,
        object_type: &str,
    ) -> Result<()> {
        let diffs = group.all_changes();
        if diffs.is_empty() {
            return Ok(());
        }
        let node = self.graph.node(slot);
        let o = PathOverride::new(path, object_type);
        let change = adapt(node, diffs, Some(&o));
        self.sink.publish(slot, change)
    }

    /// Descend into a fixed-field child.
    pub(super) fn child<G: Changes>(
        &mut self,
        ctx: Ctx<'g>,
        field: &str,
        group: Option<&'g G>,
    ) -> Result<()> {
        let Some(group) = group else {
            return Ok(());
        };
        let path = self.graph.node(ctx.node).path.field(field);
        match self.graph.child_at(&path) {
            Some(slot) => self.visit(ctx.descend(slot, group.as_group())),
            None => {
                tracing::debug!(path = %path, "no node for changed child, attributing to parent");
                self.attribute_to(ctx.node, group.as_group(), path.to_string(), group.kind().label())
            }
        }
    }

    /// Own diffs only.
    fn leaf<G: Changes>(&mut self, ctx: Ctx<'g>, _group: &'g G) -> Result<()> {
        self.attribute_here(ctx)
    }

    // ------------------------------------------------------------------
    // Document-level handlers
    // ------------------------------------------------------------------

    fn document(&mut self, ctx: Ctx<'g>, g: &'g DocumentChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "info", g.info.as_ref())?;
        self.slice(ctx, "servers", &g.servers)?;
        self.child(ctx, "paths", g.paths.as_ref())?;
        self.map(ctx, Some("webhooks"), &g.webhooks)?;
        self.child(ctx, "components", g.components.as_ref())?;
        self.slice(ctx, "security", &g.security)?;
        self.slice(ctx, "tags", &g.tags)?;
        self.child(ctx, "externalDocs", g.external_docs.as_ref())
    }

    fn info(&mut self, ctx: Ctx<'g>, g: &'g InfoChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "contact", g.contact.as_ref())?;
        self.child(ctx, "license", g.license.as_ref())
    }

    fn tag(&mut self, ctx: Ctx<'g>, g: &'g TagChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "externalDocs", g.external_docs.as_ref())
    }

    pub(super) fn server(&mut self, ctx: Ctx<'g>, g: &'g ServerChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.map(ctx, Some("variables"), &g.variables)
    }
}
