//! Visit rules for components and security schemes.

use super::context::Ctx;
use super::visitor::Visitor;
use crate::diff::{ComponentsChanges, OAuthFlowsChanges, SecuritySchemeChanges};
use crate::error::Result;

impl<'g, 'd> Visitor<'g, 'd> {
    pub(super) fn components(&mut self, ctx: Ctx<'g>, g: &'g ComponentsChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.map(ctx, Some("schemas"), &g.schemas)?;
        self.map(ctx, Some("responses"), &g.responses)?;
        self.map(ctx, Some("parameters"), &g.parameters)?;
        self.map(ctx, Some("examples"), &g.examples)?;
        self.map(ctx, Some("requestBodies"), &g.request_bodies)?;
        self.map(ctx, Some("headers"), &g.headers)?;
        self.map(ctx, Some("securitySchemes"), &g.security_schemes)?;
        self.map(ctx, Some("links"), &g.links)?;
        self.map(ctx, Some("callbacks"), &g.callbacks)?;
        self.map(ctx, Some("pathItems"), &g.path_items)
    }

    pub(super) fn security_scheme(
        &mut self,
        ctx: Ctx<'g>,
        g: &'g SecuritySchemeChanges,
    ) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "flows", g.flows.as_ref())
    }

    pub(super) fn oauth_flows(&mut self, ctx: Ctx<'g>, g: &'g OAuthFlowsChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.child(ctx, "implicit", g.implicit.as_ref())?;
        self.child(ctx, "password", g.password.as_ref())?;
        self.child(ctx, "clientCredentials", g.client_credentials.as_ref())?;
        self.child(ctx, "authorizationCode", g.authorization_code.as_ref())
    }
}
