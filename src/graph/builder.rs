//! Builds the semantic graph by walking the typed model.
//!
//! With a resolver, every `$ref` stub is expanded: the definition it names
//! is walked again under the stub's own path, so each use site has nodes
//! of its own. A definition already being expanded further up is not
//! entered again.

use super::{Edge, JsonPath, PolyTag, SemanticGraph};
use crate::model::{
    canonical_reference, escape_pointer, Callback, Components, Document, Encoding, Header, Info,
    Link, MediaType, ModelRef, OAuthFlows, ObjectKind, Operation, Parameter, PathItem,
    RequestBody, Resolver, Response, Schema, SchemaOrBool, SecurityRequirement, SecurityScheme,
    Server, Tag,
};
use indexmap::IndexMap;

/// Nesting bound for stub expansion.
const MAX_EXPANSION_DEPTH: usize = 32;

pub(super) struct GraphBuilder<'d> {
    graph: SemanticGraph<'d>,
    resolver: Option<Resolver<'d>>,
    /// Definitions being expanded, outermost first
    expanding: Vec<String>,
    references: Vec<(ObjectKind, &'d str)>,
}

impl<'d> GraphBuilder<'d> {
    pub(super) fn new(resolver: Option<Resolver<'d>>) -> Self {
        Self {
            graph: SemanticGraph::default(),
            resolver,
            expanding: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Walk a single object and return the references found below it.
    pub(super) fn fragment(mut self, model: ModelRef<'d>) -> Vec<(ObjectKind, &'d str)> {
        let root = self
            .graph
            .add_node(JsonPath::root(), model.kind(), Some(model), None);
        match (model, model.reference()) {
            (_, Some(reference)) => self.references.push((model.kind(), reference)),
            (ModelRef::Document(document), None) => self.document(root, document),
            (_, None) => self.descend(root, model),
        }
        self.references
    }

    pub(super) fn build(mut self, document: &'d Document) -> SemanticGraph<'d> {
        let root = self.graph.add_node(
            JsonPath::root(),
            ObjectKind::Document,
            Some(ModelRef::Document(document)),
            None,
        );
        self.document(root, document);
        self.graph
    }

    fn path(&self, slot: usize) -> JsonPath {
        self.graph.node(slot).path.clone()
    }

    /// Add a child node. Returns the slot to descend into, or `None` for a
    /// reference stub, which is expanded here when possible.
    fn child(
        &mut self,
        parent: usize,
        path: JsonPath,
        model: ModelRef<'d>,
        poly: Option<PolyTag>,
    ) -> Option<usize> {
        let parent_id = self.graph.node(parent).id.clone();
        let slot = self.graph.add_node(path, model.kind(), Some(model), Some(parent));
        let id = self.graph.node(slot).id.clone();
        self.graph
            .add_edge(Edge::structural(parent_id.clone(), id.clone()).with_poly(poly));

        let Some(reference) = model.reference() else {
            return Some(slot);
        };
        self.references.push((model.kind(), reference));
        self.graph.add_edge(
            Edge::structural(parent_id, id.clone())
                .with_reference(reference)
                .with_poly(poly),
        );
        match JsonPath::from_reference(reference) {
            Some(target) => self
                .graph
                .add_edge(Edge::structural(id, target.to_string()).with_reference(reference)),
            None => tracing::trace!(reference, "no local target edge for reference"),
        }
        self.expand(slot, model, reference);
        None
    }

    fn expand(&mut self, slot: usize, model: ModelRef<'d>, reference: &'d str) {
        let Some(resolver) = self.resolver else {
            return;
        };
        let Some((target, last)) = resolver.resolve(model) else {
            tracing::debug!(reference, "unresolved reference not expanded");
            return;
        };
        let (first, last) = (expansion_key(reference), expansion_key(last));
        if self.expanding.len() >= MAX_EXPANSION_DEPTH
            || self.expanding.iter().any(|k| *k == first || *k == last)
        {
            tracing::trace!(reference, "definition already expanded above, stopping");
            return;
        }
        self.graph.node_mut(slot).target = Some(target);
        let depth = self.expanding.len();
        self.expanding.push(first);
        self.expanding.push(last);
        self.descend(slot, target);
        self.expanding.truncate(depth);
    }

    /// Build the children of any object that can stand behind a `$ref`.
    fn descend(&mut self, slot: usize, model: ModelRef<'d>) {
        match model {
            ModelRef::Schema(o) => self.schema(slot, o),
            ModelRef::Parameter(o) => self.parameter(slot, o),
            ModelRef::RequestBody(o) => self.request_body(slot, o),
            ModelRef::Response(o) => self.response(slot, o),
            ModelRef::Header(o) => self.header(slot, o),
            ModelRef::Link(o) => self.link(slot, o),
            ModelRef::Callback(o) => self.callback(slot, o),
            ModelRef::SecurityScheme(o) => self.security_scheme(slot, o),
            ModelRef::PathItem(o) => self.path_item(slot, o),
            ModelRef::Example(_) => {}
            other => tracing::trace!(kind = %other.kind(), "not a referrable object"),
        }
    }

    fn field(&mut self, parent: usize, name: &str, model: ModelRef<'d>) -> Option<usize> {
        let path = self.path(parent).field(name);
        self.child(parent, path, model, None)
    }

    fn keyed<T>(
        &mut self,
        parent: usize,
        field: Option<&str>,
        map: &'d IndexMap<String, T>,
        view: fn(&'d T) -> ModelRef<'d>,
        mut descend: impl FnMut(&mut Self, usize, &'d T),
    ) {
        let base = match field {
            Some(name) => self.path(parent).field(name),
            None => self.path(parent),
        };
        for (key, value) in map {
            if let Some(slot) = self.child(parent, base.key(key), view(value), None) {
                descend(self, slot, value);
            }
        }
    }

    fn listed<T>(
        &mut self,
        parent: usize,
        field: &str,
        items: &'d [T],
        view: fn(&'d T) -> ModelRef<'d>,
        mut descend: impl FnMut(&mut Self, usize, &'d T),
    ) {
        let base = self.path(parent).field(field);
        let poly = PolyTag::from_field(field);
        for (i, item) in items.iter().enumerate() {
            if let Some(slot) = self.child(parent, base.index(i), view(item), poly) {
                descend(self, slot, item);
            }
        }
    }

    fn document(&mut self, slot: usize, doc: &'d Document) {
        if let Some(info) = &doc.info {
            if let Some(s) = self.field(slot, "info", ModelRef::Info(info)) {
                self.info(s, info);
            }
        }
        self.servers(slot, &doc.servers);
        if let Some(paths) = &doc.paths {
            if let Some(s) = self.field(slot, "paths", ModelRef::Paths(paths)) {
                self.keyed(s, None, &paths.items, ModelRef::PathItem, Self::path_item);
            }
        }
        self.keyed(slot, Some("webhooks"), &doc.webhooks, ModelRef::PathItem, Self::path_item);
        if let Some(components) = &doc.components {
            if let Some(s) = self.field(slot, "components", ModelRef::Components(components)) {
                self.components(s, components);
            }
        }
        self.security(slot, &doc.security);
        self.listed(slot, "tags", &doc.tags, ModelRef::Tag, Self::tag);
        if let Some(docs) = &doc.external_docs {
            self.field(slot, "externalDocs", ModelRef::ExternalDoc(docs));
        }
    }

    fn info(&mut self, slot: usize, info: &'d Info) {
        if let Some(contact) = &info.contact {
            self.field(slot, "contact", ModelRef::Contact(contact));
        }
        if let Some(license) = &info.license {
            self.field(slot, "license", ModelRef::License(license));
        }
    }

    fn servers(&mut self, slot: usize, servers: &'d [Server]) {
        self.listed(slot, "servers", servers, ModelRef::Server, Self::server);
    }

    fn server(&mut self, slot: usize, server: &'d Server) {
        self.keyed(
            slot,
            Some("variables"),
            &server.variables,
            ModelRef::ServerVariable,
            |_, _, _| {},
        );
    }

    fn security(&mut self, slot: usize, requirements: &'d [SecurityRequirement]) {
        self.listed(
            slot,
            "security",
            requirements,
            ModelRef::SecurityRequirement,
            |_, _, _| {},
        );
    }

    fn tag(&mut self, slot: usize, tag: &'d Tag) {
        if let Some(docs) = &tag.external_docs {
            self.field(slot, "externalDocs", ModelRef::ExternalDoc(docs));
        }
    }

    fn path_item(&mut self, slot: usize, item: &'d PathItem) {
        for (method, operation) in item.operations() {
            if let Some(s) = self.field(slot, method, ModelRef::Operation(operation)) {
                self.operation(s, operation);
            }
        }
        self.servers(slot, &item.servers);
        self.listed(slot, "parameters", &item.parameters, ModelRef::Parameter, Self::parameter);
    }

    fn operation(&mut self, slot: usize, op: &'d Operation) {
        if let Some(docs) = &op.external_docs {
            self.field(slot, "externalDocs", ModelRef::ExternalDoc(docs));
        }
        self.listed(slot, "parameters", &op.parameters, ModelRef::Parameter, Self::parameter);
        if let Some(body) = &op.request_body {
            if let Some(s) = self.field(slot, "requestBody", ModelRef::RequestBody(body)) {
                self.request_body(s, body);
            }
        }
        if let Some(responses) = &op.responses {
            if let Some(s) = self.field(slot, "responses", ModelRef::Responses(responses)) {
                if let Some(default) = &responses.default {
                    if let Some(d) = self.field(s, "default", ModelRef::Response(default)) {
                        self.response(d, default);
                    }
                }
                self.keyed(s, None, &responses.codes, ModelRef::Response, Self::response);
            }
        }
        self.keyed(slot, Some("callbacks"), &op.callbacks, ModelRef::Callback, Self::callback);
        if let Some(security) = &op.security {
            self.security(slot, security);
        }
        self.servers(slot, &op.servers);
    }

    fn parameter(&mut self, slot: usize, param: &'d Parameter) {
        if let Some(schema) = &param.schema {
            self.schema_field(slot, "schema", schema);
        }
        self.examples(slot, &param.examples);
        self.content(slot, &param.content);
    }

    fn request_body(&mut self, slot: usize, body: &'d RequestBody) {
        self.content(slot, &body.content);
    }

    fn response(&mut self, slot: usize, response: &'d Response) {
        self.headers(slot, &response.headers);
        self.content(slot, &response.content);
        self.keyed(slot, Some("links"), &response.links, ModelRef::Link, Self::link);
    }

    fn callback(&mut self, slot: usize, callback: &'d Callback) {
        self.keyed(slot, None, &callback.expressions, ModelRef::PathItem, Self::path_item);
    }

    fn link(&mut self, slot: usize, link: &'d Link) {
        if let Some(server) = &link.server {
            if let Some(s) = self.field(slot, "server", ModelRef::Server(server)) {
                self.server(s, server);
            }
        }
    }

    fn content(&mut self, slot: usize, content: &'d IndexMap<String, MediaType>) {
        self.keyed(slot, Some("content"), content, ModelRef::MediaType, Self::media_type);
    }

    fn media_type(&mut self, slot: usize, media: &'d MediaType) {
        if let Some(schema) = &media.schema {
            self.schema_field(slot, "schema", schema);
        }
        self.examples(slot, &media.examples);
        self.keyed(slot, Some("encoding"), &media.encoding, ModelRef::Encoding, Self::encoding);
    }

    fn encoding(&mut self, slot: usize, encoding: &'d Encoding) {
        self.headers(slot, &encoding.headers);
    }

    fn headers(&mut self, slot: usize, headers: &'d IndexMap<String, Header>) {
        self.keyed(slot, Some("headers"), headers, ModelRef::Header, Self::header);
    }

    fn header(&mut self, slot: usize, header: &'d Header) {
        if let Some(schema) = &header.schema {
            self.schema_field(slot, "schema", schema);
        }
        self.examples(slot, &header.examples);
        self.content(slot, &header.content);
    }

    fn examples(&mut self, slot: usize, examples: &'d IndexMap<String, crate::model::Example>) {
        self.keyed(slot, Some("examples"), examples, ModelRef::Example, |_, _, _| {});
    }

    fn schema_field(&mut self, slot: usize, name: &str, schema: &'d Schema) {
        if let Some(s) = self.field(slot, name, ModelRef::Schema(schema)) {
            self.schema(s, schema);
        }
    }

    fn schema_or_bool(&mut self, slot: usize, name: &str, value: Option<&'d SchemaOrBool>) {
        if let Some(SchemaOrBool::Schema(schema)) = value {
            self.schema_field(slot, name, schema);
        }
    }

    fn schema(&mut self, slot: usize, schema: &'d Schema) {
        for (field, members) in [
            ("allOf", &schema.all_of),
            ("oneOf", &schema.one_of),
            ("anyOf", &schema.any_of),
            ("prefixItems", &schema.prefix_items),
        ] {
            self.listed(slot, field, members, ModelRef::Schema, Self::schema);
        }
        for (name, sub) in [
            ("not", &schema.not),
            ("contains", &schema.contains),
            ("if", &schema.if_schema),
            ("then", &schema.then_schema),
            ("else", &schema.else_schema),
            ("propertyNames", &schema.property_names),
        ] {
            if let Some(sub) = sub {
                self.schema_field(slot, name, sub);
            }
        }
        self.schema_or_bool(slot, "items", schema.items.as_deref());
        self.schema_or_bool(slot, "unevaluatedItems", schema.unevaluated_items.as_deref());
        self.schema_or_bool(
            slot,
            "unevaluatedProperties",
            schema.unevaluated_properties.as_deref(),
        );
        self.schema_or_bool(
            slot,
            "additionalProperties",
            schema.additional_properties.as_deref(),
        );
        for (field, map) in [
            ("properties", &schema.properties),
            ("patternProperties", &schema.pattern_properties),
            ("dependentSchemas", &schema.dependent_schemas),
        ] {
            self.keyed(slot, Some(field), map, ModelRef::Schema, Self::schema);
        }
        if let Some(discriminator) = &schema.discriminator {
            self.field(slot, "discriminator", ModelRef::Discriminator(discriminator));
        }
        if let Some(xml) = &schema.xml {
            self.field(slot, "xml", ModelRef::Xml(xml));
        }
        if let Some(docs) = &schema.external_docs {
            self.field(slot, "externalDocs", ModelRef::ExternalDoc(docs));
        }
    }

    /// One `components` section. Each entry counts as being expanded while
    /// its own subtree is built, so self-references stop at the first stub.
    fn section<T>(
        &mut self,
        parent: usize,
        name: &str,
        map: &'d IndexMap<String, T>,
        view: fn(&'d T) -> ModelRef<'d>,
        descend: fn(&mut Self, usize, &'d T),
    ) {
        let base = self.path(parent).field(name);
        for (key, value) in map {
            self.expanding
                .push(format!("#/components/{name}/{}", escape_pointer(key)));
            if let Some(slot) = self.child(parent, base.key(key), view(value), None) {
                descend(self, slot, value);
            }
            self.expanding.pop();
        }
    }

    fn components(&mut self, slot: usize, c: &'d Components) {
        self.section(slot, "schemas", &c.schemas, ModelRef::Schema, Self::schema);
        self.section(slot, "responses", &c.responses, ModelRef::Response, Self::response);
        self.section(slot, "parameters", &c.parameters, ModelRef::Parameter, Self::parameter);
        self.section(slot, "examples", &c.examples, ModelRef::Example, |_, _, _| {});
        self.section(
            slot,
            "requestBodies",
            &c.request_bodies,
            ModelRef::RequestBody,
            Self::request_body,
        );
        self.section(slot, "headers", &c.headers, ModelRef::Header, Self::header);
        self.section(
            slot,
            "securitySchemes",
            &c.security_schemes,
            ModelRef::SecurityScheme,
            Self::security_scheme,
        );
        self.section(slot, "links", &c.links, ModelRef::Link, Self::link);
        self.section(slot, "callbacks", &c.callbacks, ModelRef::Callback, Self::callback);
        self.section(slot, "pathItems", &c.path_items, ModelRef::PathItem, Self::path_item);
    }

    fn security_scheme(&mut self, slot: usize, scheme: &'d SecurityScheme) {
        if let Some(flows) = &scheme.flows {
            if let Some(s) = self.field(slot, "flows", ModelRef::OAuthFlows(flows)) {
                self.oauth_flows(s, flows);
            }
        }
    }

    fn oauth_flows(&mut self, slot: usize, flows: &'d OAuthFlows) {
        for (name, flow) in [
            ("implicit", &flows.implicit),
            ("password", &flows.password),
            ("clientCredentials", &flows.client_credentials),
            ("authorizationCode", &flows.authorization_code),
        ] {
            if let Some(flow) = flow {
                self.field(slot, name, ModelRef::OAuthFlow(flow));
            }
        }
    }
}

/// Stable spelling of a reference for cycle checks.
fn expansion_key(reference: &str) -> String {
    canonical_reference("", reference).unwrap_or_else(|| reference.to_string())
}
