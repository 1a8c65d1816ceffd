//! Comparison of paths, operations and the objects beneath them.

use super::engine::{non_empty, props, Comparer, Scope};
use super::groups::{
    CallbackChanges, EncodingChanges, ExampleChanges, HeaderChanges, LinkChanges,
    MediaTypeChanges, OperationChanges, ParameterChanges, PathItemChanges, PathsChanges,
    RequestBodyChanges, ResponseChanges, ResponsesChanges,
};
use super::types::Diff;
use crate::model::{
    Callback, Encoding, Example, Header, Link, MediaType, ObjectKind, Operation, Parameter,
    PathItem, Paths, RequestBody, Response, Responses, HTTP_METHODS,
};
use indexmap::IndexMap;

impl<'d> Comparer<'d> {
    pub(super) fn paths(&mut self, scope: &Scope, l: &'d Paths, r: &'d Paths) -> PathsChanges {
        let mut group = PathsChanges::default();
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group.items = self.map(
            &mut group.changes,
            scope,
            None,
            ObjectKind::PathItem,
            &l.items,
            &r.items,
            Self::path_item_pair,
        );
        group
    }

    pub(super) fn path_item_pair(
        &mut self,
        scope: &Scope,
        l: &'d PathItem,
        r: &'d PathItem,
    ) -> PathItemChanges {
        self.pair(scope, l, r, Self::path_item)
    }

    fn path_item(&mut self, scope: &Scope, l: &'d PathItem, r: &'d PathItem) -> PathItemChanges {
        let mut group = PathItemChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "summary" => summary,
            "description" => description,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);

        for method in HTTP_METHODS {
            if let Some((a, b)) = self.object(
                &mut group.changes,
                scope,
                method,
                l.operation(method),
                r.operation(method),
            ) {
                let child = scope.field(ObjectKind::Operation, method);
                if let Some(changes) = non_empty(self.operation(&child, a, b)) {
                    group.operations.insert(method.to_string(), changes);
                }
            }
        }
        group.servers = self.servers(&mut group.changes, scope, &l.servers, &r.servers);
        group.parameters = self.parameters(&mut group.changes, scope, &l.parameters, &r.parameters);
        group
    }

    fn operation(&mut self, scope: &Scope, l: &'d Operation, r: &'d Operation) -> OperationChanges {
        let mut group = OperationChanges::default();
        self.value_list(&mut group.changes, scope, "tags", &l.tags, &r.tags, (false, false));
        props!(self, &mut group.changes, scope, l, r, {
            "summary" => summary,
            "description" => description,
            "operationId" => operation_id,
            "deprecated" => deprecated,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);

        if let Some((a, b)) = self.object(
            &mut group.changes,
            scope,
            "externalDocs",
            l.external_docs.as_ref(),
            r.external_docs.as_ref(),
        ) {
            group.external_docs = non_empty(self.external_doc(
                &scope.field(ObjectKind::ExternalDoc, "externalDocs"),
                a,
                b,
            ));
        }
        group.parameters = self.parameters(&mut group.changes, scope, &l.parameters, &r.parameters);
        if let Some((a, b)) = self.object(
            &mut group.changes,
            scope,
            "requestBody",
            l.request_body.as_ref(),
            r.request_body.as_ref(),
        ) {
            let child = scope.field(ObjectKind::RequestBody, "requestBody");
            group.request_body = non_empty(self.pair(&child, a, b, Self::request_body));
        }
        if let Some((a, b)) = self.object(
            &mut group.changes,
            scope,
            "responses",
            l.responses.as_ref(),
            r.responses.as_ref(),
        ) {
            let child = scope.field(ObjectKind::Responses, "responses");
            group.responses = non_empty(self.responses(&child, a, b));
        }
        group.callbacks = self.map(
            &mut group.changes,
            scope,
            Some("callbacks"),
            ObjectKind::Callback,
            &l.callbacks,
            &r.callbacks,
            Self::callback_pair,
        );
        if let Some((a, b)) = self.object(
            &mut group.changes,
            scope,
            "security",
            l.security.as_ref(),
            r.security.as_ref(),
        ) {
            group.security = self.security(&mut group.changes, scope, a, b);
        }
        group.servers = self.servers(&mut group.changes, scope, &l.servers, &r.servers);
        group
    }

    /// Parameters matched by `(name, in)`, or by reference for `$ref`s.
    fn parameters(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &'d [Parameter],
        right: &'d [Parameter],
    ) -> Vec<ParameterChanges> {
        self.list(
            out,
            scope,
            "parameters",
            ObjectKind::Parameter,
            left,
            right,
            |param: &Parameter| match &param.reference {
                Some(reference) => (Some(reference.clone()), None),
                None => (
                    param.name.clone(),
                    param.location.clone().map(|location| location.to_ascii_lowercase()),
                ),
            },
            |param: &Parameter| param.required == Some(true),
            Self::parameter_pair,
        )
    }

    pub(super) fn parameter_pair(
        &mut self,
        scope: &Scope,
        l: &'d Parameter,
        r: &'d Parameter,
    ) -> ParameterChanges {
        self.pair(scope, l, r, Self::parameter)
    }

    fn parameter(&mut self, scope: &Scope, l: &'d Parameter, r: &'d Parameter) -> ParameterChanges {
        let mut group = ParameterChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "name" => name,
            "in" => location,
            "description" => description,
            "required" => required,
            "deprecated" => deprecated,
            "allowEmptyValue" => allow_empty_value,
            "style" => style,
            "explode" => explode,
            "allowReserved" => allow_reserved,
            "example" => example,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "schema", l.schema.as_ref(), r.schema.as_ref())
        {
            group.schema = non_empty(self.schema_pair(&scope.field(ObjectKind::Schema, "schema"), a, b));
        }
        group.examples = self.examples(&mut group.changes, scope, &l.examples, &r.examples);
        group.content = self.content(&mut group.changes, scope, &l.content, &r.content);
        group
    }

    pub(super) fn request_body(
        &mut self,
        scope: &Scope,
        l: &'d RequestBody,
        r: &'d RequestBody,
    ) -> RequestBodyChanges {
        let mut group = RequestBodyChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "description" => description,
            "required" => required,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group.content = self.content(&mut group.changes, scope, &l.content, &r.content);
        group
    }

    fn responses(&mut self, scope: &Scope, l: &'d Responses, r: &'d Responses) -> ResponsesChanges {
        let mut group = ResponsesChanges::default();
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "default", l.default.as_ref(), r.default.as_ref())
        {
            let child = scope.field(ObjectKind::Response, "default");
            group.default = non_empty(self.response_pair(&child, a, b));
        }
        group.codes = self.map(
            &mut group.changes,
            scope,
            None,
            ObjectKind::Response,
            &l.codes,
            &r.codes,
            Self::response_pair,
        );
        group
    }

    pub(super) fn response_pair(
        &mut self,
        scope: &Scope,
        l: &'d Response,
        r: &'d Response,
    ) -> ResponseChanges {
        self.pair(scope, l, r, Self::response)
    }

    fn response(&mut self, scope: &Scope, l: &'d Response, r: &'d Response) -> ResponseChanges {
        let mut group = ResponseChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "description" => description,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group.headers = self.headers(&mut group.changes, scope, &l.headers, &r.headers);
        group.content = self.content(&mut group.changes, scope, &l.content, &r.content);
        group.links = self.map(
            &mut group.changes,
            scope,
            Some("links"),
            ObjectKind::Link,
            &l.links,
            &r.links,
            Self::link_pair,
        );
        group
    }

    pub(super) fn content(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &'d IndexMap<String, MediaType>,
        right: &'d IndexMap<String, MediaType>,
    ) -> IndexMap<String, MediaTypeChanges> {
        self.map(
            out,
            scope,
            Some("content"),
            ObjectKind::MediaType,
            left,
            right,
            Self::media_type,
        )
    }

    fn media_type(&mut self, scope: &Scope, l: &'d MediaType, r: &'d MediaType) -> MediaTypeChanges {
        let mut group = MediaTypeChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "example" => example,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "schema", l.schema.as_ref(), r.schema.as_ref())
        {
            group.schema = non_empty(self.schema_pair(&scope.field(ObjectKind::Schema, "schema"), a, b));
        }
        group.examples = self.examples(&mut group.changes, scope, &l.examples, &r.examples);
        group.encoding = self.map(
            &mut group.changes,
            scope,
            Some("encoding"),
            ObjectKind::Encoding,
            &l.encoding,
            &r.encoding,
            Self::encoding,
        );
        group
    }

    fn encoding(&mut self, scope: &Scope, l: &'d Encoding, r: &'d Encoding) -> EncodingChanges {
        let mut group = EncodingChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "contentType" => content_type,
            "style" => style,
            "explode" => explode,
            "allowReserved" => allow_reserved,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group.headers = self.headers(&mut group.changes, scope, &l.headers, &r.headers);
        group
    }

    pub(super) fn headers(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &'d IndexMap<String, Header>,
        right: &'d IndexMap<String, Header>,
    ) -> IndexMap<String, HeaderChanges> {
        self.map(
            out,
            scope,
            Some("headers"),
            ObjectKind::Header,
            left,
            right,
            Self::header_pair,
        )
    }

    pub(super) fn header_pair(
        &mut self,
        scope: &Scope,
        l: &'d Header,
        r: &'d Header,
    ) -> HeaderChanges {
        self.pair(scope, l, r, Self::header)
    }

    fn header(&mut self, scope: &Scope, l: &'d Header, r: &'d Header) -> HeaderChanges {
        let mut group = HeaderChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "description" => description,
            "required" => required,
            "deprecated" => deprecated,
            "allowEmptyValue" => allow_empty_value,
            "style" => style,
            "explode" => explode,
            "allowReserved" => allow_reserved,
            "example" => example,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "schema", l.schema.as_ref(), r.schema.as_ref())
        {
            group.schema = non_empty(self.schema_pair(&scope.field(ObjectKind::Schema, "schema"), a, b));
        }
        group.examples = self.examples(&mut group.changes, scope, &l.examples, &r.examples);
        group.content = self.content(&mut group.changes, scope, &l.content, &r.content);
        group
    }

    pub(super) fn examples(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        left: &'d IndexMap<String, Example>,
        right: &'d IndexMap<String, Example>,
    ) -> IndexMap<String, ExampleChanges> {
        self.map(
            out,
            scope,
            Some("examples"),
            ObjectKind::Example,
            left,
            right,
            Self::example_pair,
        )
    }

    pub(super) fn example_pair(
        &mut self,
        scope: &Scope,
        l: &'d Example,
        r: &'d Example,
    ) -> ExampleChanges {
        self.pair(scope, l, r, Self::example)
    }

    fn example(&mut self, scope: &Scope, l: &'d Example, r: &'d Example) -> ExampleChanges {
        let mut group = ExampleChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "summary" => summary,
            "description" => description,
            "value" => value,
            "externalValue" => external_value,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }

    pub(super) fn link_pair(&mut self, scope: &Scope, l: &'d Link, r: &'d Link) -> LinkChanges {
        self.pair(scope, l, r, Self::link)
    }

    fn link(&mut self, scope: &Scope, l: &'d Link, r: &'d Link) -> LinkChanges {
        let mut group = LinkChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "operationRef" => operation_ref,
            "operationId" => operation_id,
            "requestBody" => request_body,
            "description" => description,
        });
        self.value_map(&mut group.changes, scope, "parameters", &l.parameters, &r.parameters);
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "server", l.server.as_ref(), r.server.as_ref())
        {
            group.server = non_empty(self.server(&scope.field(ObjectKind::Server, "server"), a, b));
        }
        group
    }

    pub(super) fn callback_pair(
        &mut self,
        scope: &Scope,
        l: &'d Callback,
        r: &'d Callback,
    ) -> CallbackChanges {
        self.pair(scope, l, r, Self::callback)
    }

    fn callback(&mut self, scope: &Scope, l: &'d Callback, r: &'d Callback) -> CallbackChanges {
        let mut group = CallbackChanges::default();
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group.expressions = self.map(
            &mut group.changes,
            scope,
            None,
            ObjectKind::PathItem,
            &l.expressions,
            &r.expressions,
            Self::path_item_pair,
        );
        group
    }
}
