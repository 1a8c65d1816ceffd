//! Visit rule for schemas.

use super::context::Ctx;
use super::visitor::Visitor;
use crate::diff::SchemaChanges;
use crate::error::Result;

impl<'g, 'd> Visitor<'g, 'd> {
    pub(super) fn schema(&mut self, ctx: Ctx<'g>, g: &'g SchemaChanges) -> Result<()> {
        self.attribute_here(ctx)?;
        self.slice(ctx, "allOf", &g.all_of)?;
        self.slice(ctx, "oneOf", &g.one_of)?;
        self.slice(ctx, "anyOf", &g.any_of)?;
        self.slice(ctx, "prefixItems", &g.prefix_items)?;
        for (field, sub) in [
            ("contains", &g.contains),
            ("if", &g.if_schema),
            ("then", &g.then_schema),
            ("else", &g.else_schema),
            ("not", &g.not),
            ("propertyNames", &g.property_names),
            ("unevaluatedItems", &g.unevaluated_items),
            ("unevaluatedProperties", &g.unevaluated_properties),
            ("items", &g.items),
            ("additionalProperties", &g.additional_properties),
        ] {
            self.child(ctx, field, sub.as_deref())?;
        }
        self.map(ctx, Some("dependentSchemas"), &g.dependent_schemas)?;
        self.map(ctx, Some("patternProperties"), &g.pattern_properties)?;
        self.map(ctx, Some("properties"), &g.properties)?;
        self.child(ctx, "xml", g.xml.as_ref())?;
        self.child(ctx, "externalDocs", g.external_docs.as_ref())?;
        self.child(ctx, "discriminator", g.discriminator.as_ref())
    }
}
