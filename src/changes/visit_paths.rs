//! Visit rules for paths, operations and the objects beneath them.

use super::context::Ctx;
use super::visitor::Visitor;
use crate::diff::{
    CallbackChanges, EncodingChanges, HeaderChanges, LinkChanges, MediaTypeChanges,
    OperationChanges, ParameterChanges, PathItemChanges, PathsChanges, RequestBodyChanges,
    ResponseChanges, ResponsesChanges,
};
use crate::error::Result;
use rayon::prelude::*;

impl<'g, 'd> Visitor<'g, 'd> {
    pub(super) fn paths(&mut self, ctx: Ctx<'g>, g: &'g PathsChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        if !self.parallel_paths || g.items.len() < 2 {
            return self.map(ctx, None, &g.items);
        }

        // one fork per path item, each with its own pending queue
        let forks: Vec<_> = g
            .items
            .iter()
            .map(|(key, item)| (self.fork(), key, item))
            .collect();
        let outcomes: Vec<Result<Vec<_>>> = forks
            .into_par_iter()
            .map(|(mut fork, key, item)| {
                fork.map_entry(ctx, None, key, item)?;
                Ok(fork.into_pending())
            })
            .collect();
        for pending in outcomes {
            self.absorb(pending?);
        }
        Ok(())
    }

    pub(super) fn path_item(&mut self, ctx: Ctx<'g>, g: &'g PathItemChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        for (method, operation) in &g.operations {
            self.child(ctx, method, Some(operation))?;
        }
        self.slice(ctx, "servers", &g.servers)?;
        self.slice(ctx, "parameters", &g.parameters)
    }

    pub(super) fn operation(&mut self, ctx: Ctx<'g>, g: &'g OperationChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "externalDocs", g.external_docs.as_ref())?;
        self.slice(ctx, "parameters", &g.parameters)?;
        self.child(ctx, "requestBody", g.request_body.as_ref())?;
        self.child(ctx, "responses", g.responses.as_ref())?;
        self.map(ctx, Some("callbacks"), &g.callbacks)?;
        self.slice(ctx, "security", &g.security)?;
        self.slice(ctx, "servers", &g.servers)
    }

    pub(super) fn parameter(&mut self, ctx: Ctx<'g>, g: &'g ParameterChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "schema", g.schema.as_ref())?;
        self.map(ctx, Some("examples"), &g.examples)?;
        self.map(ctx, Some("content"), &g.content)
    }

    pub(super) fn request_body(&mut self, ctx: Ctx<'g>, g: &'g RequestBodyChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.map(ctx, Some("content"), &g.content)
    }

    pub(super) fn responses(&mut self, ctx: Ctx<'g>, g: &'g ResponsesChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "default", g.default.as_ref())?;
        self.map(ctx, None, &g.codes)
    }

    pub(super) fn response(&mut self, ctx: Ctx<'g>, g: &'g ResponseChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.map(ctx, Some("headers"), &g.headers)?;
        self.map(ctx, Some("content"), &g.content)?;
        self.map(ctx, Some("links"), &g.links)
    }

    pub(super) fn media_type(&mut self, ctx: Ctx<'g>, g: &'g MediaTypeChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "schema", g.schema.as_ref())?;
        self.map(ctx, Some("examples"), &g.examples)?;
        self.map(ctx, Some("encoding"), &g.encoding)
    }

    pub(super) fn encoding(&mut self, ctx: Ctx<'g>, g: &'g EncodingChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.map(ctx, Some("headers"), &g.headers)
    }

    pub(super) fn header(&mut self, ctx: Ctx<'g>, g: &'g HeaderChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "schema", g.schema.as_ref())?;
        self.map(ctx, Some("examples"), &g.examples)?;
        self.map(ctx, Some("content"), &g.content)
    }

    pub(super) fn link(&mut self, ctx: Ctx<'g>, g: &'g LinkChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "server", g.server.as_ref())
    }

    pub(super) fn callback(&mut self, ctx: Ctx<'g>, g: &'g CallbackChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.map(ctx, None, &g.expressions)
    }
}
