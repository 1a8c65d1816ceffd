//! Components and security scheme comparison.

use super::engine::{non_empty, props, Comparer, Scope};
use super::groups::{
    ComponentsChanges, OAuthFlowChanges, OAuthFlowsChanges, RequestBodyChanges,
    SecuritySchemeChanges,
};
use super::types::Diff;
use crate::model::{Components, OAuthFlow, OAuthFlows, ObjectKind, RequestBody, SecurityScheme};

impl<'d> Comparer<'d> {
    pub(super) fn components(
        &mut self,
        scope: &Scope,
        l: &'d Components,
        r: &'d Components,
    ) -> ComponentsChanges {
        let mut group = ComponentsChanges::default();
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        let out = &mut group.changes;
        group.schemas = self.map(
            out,
            scope,
            Some("schemas"),
            ObjectKind::Schema,
            &l.schemas,
            &r.schemas,
            Self::schema_pair,
        );
        group.responses = self.map(
            out,
            scope,
            Some("responses"),
            ObjectKind::Response,
            &l.responses,
            &r.responses,
            Self::response_pair,
        );
        group.parameters = self.map(
            out,
            scope,
            Some("parameters"),
            ObjectKind::Parameter,
            &l.parameters,
            &r.parameters,
            Self::parameter_pair,
        );
        group.examples = self.examples(out, scope, &l.examples, &r.examples);
        group.request_bodies = self.map(
            out,
            scope,
            Some("requestBodies"),
            ObjectKind::RequestBody,
            &l.request_bodies,
            &r.request_bodies,
            Self::request_body_pair,
        );
        group.headers = self.headers(out, scope, &l.headers, &r.headers);
        group.security_schemes = self.map(
            out,
            scope,
            Some("securitySchemes"),
            ObjectKind::SecurityScheme,
            &l.security_schemes,
            &r.security_schemes,
            Self::security_scheme_pair,
        );
        group.links = self.map(
            out,
            scope,
            Some("links"),
            ObjectKind::Link,
            &l.links,
            &r.links,
            Self::link_pair,
        );
        group.callbacks = self.map(
            out,
            scope,
            Some("callbacks"),
            ObjectKind::Callback,
            &l.callbacks,
            &r.callbacks,
            Self::callback_pair,
        );
        group.path_items = self.map(
            out,
            scope,
            Some("pathItems"),
            ObjectKind::PathItem,
            &l.path_items,
            &r.path_items,
            Self::path_item_pair,
        );
        group
    }

    fn request_body_pair(
        &mut self,
        scope: &Scope,
        l: &'d RequestBody,
        r: &'d RequestBody,
    ) -> RequestBodyChanges {
        self.pair(scope, l, r, Self::request_body)
    }

    fn security_scheme_pair(
        &mut self,
        scope: &Scope,
        l: &'d SecurityScheme,
        r: &'d SecurityScheme,
    ) -> SecuritySchemeChanges {
        self.pair(scope, l, r, Self::security_scheme)
    }

    fn security_scheme(
        &mut self,
        scope: &Scope,
        l: &'d SecurityScheme,
        r: &'d SecurityScheme,
    ) -> SecuritySchemeChanges {
        let mut group = SecuritySchemeChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "type" => scheme_type,
            "description" => description,
            "name" => name,
            "in" => location,
            "scheme" => scheme,
            "bearerFormat" => bearer_format,
            "openIdConnectUrl" => open_id_connect_url,
        });
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        if let Some((a, b)) =
            self.object(&mut group.changes, scope, "flows", l.flows.as_ref(), r.flows.as_ref())
        {
            let child = scope.field(ObjectKind::OAuthFlows, "flows");
            group.flows = non_empty(self.oauth_flows(&child, a, b));
        }
        group
    }

    fn oauth_flows(&mut self, scope: &Scope, l: &'d OAuthFlows, r: &'d OAuthFlows) -> OAuthFlowsChanges {
        let mut group = OAuthFlowsChanges::default();
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        let out = &mut group.changes;
        group.implicit = self.flow(out, scope, "implicit", l.implicit.as_ref(), r.implicit.as_ref());
        group.password = self.flow(out, scope, "password", l.password.as_ref(), r.password.as_ref());
        group.client_credentials = self.flow(
            out,
            scope,
            "clientCredentials",
            l.client_credentials.as_ref(),
            r.client_credentials.as_ref(),
        );
        group.authorization_code = self.flow(
            out,
            scope,
            "authorizationCode",
            l.authorization_code.as_ref(),
            r.authorization_code.as_ref(),
        );
        group
    }

    fn flow(
        &mut self,
        out: &mut Vec<Diff>,
        scope: &Scope,
        name: &str,
        left: Option<&'d OAuthFlow>,
        right: Option<&'d OAuthFlow>,
    ) -> Option<OAuthFlowChanges> {
        let (a, b) = self.object(out, scope, name, left, right)?;
        non_empty(self.oauth_flow(&scope.field(ObjectKind::OAuthFlow, name), a, b))
    }

    fn oauth_flow(&mut self, scope: &Scope, l: &'d OAuthFlow, r: &'d OAuthFlow) -> OAuthFlowChanges {
        let mut group = OAuthFlowChanges::default();
        props!(self, &mut group.changes, scope, l, r, {
            "authorizationUrl" => authorization_url,
            "tokenUrl" => token_url,
            "refreshUrl" => refresh_url,
        });
        self.value_map(&mut group.changes, scope, "scopes", &l.scopes, &r.scopes);
        self.extensions(&mut group.changes, scope, &l.extensions, &r.extensions);
        group
    }
}

#[cfg(test)]
mod tests {
    use crate::diff::{ChangeKind, Changes, DiffEngine, DocumentChanges};
    use crate::parsers::parse_document_str;

    fn compare(left: &str, right: &str) -> DocumentChanges {
        let left = parse_document_str(left).unwrap();
        let right = parse_document_str(right).unwrap();
        DiffEngine::new().compare(&left, &right)
    }

    const BASE: &str = "openapi: 3.1.0
components:
  securitySchemes:
    oauth:
      type: oauth2
      flows:
        implicit:
          authorizationUrl: https://auth
          scopes:
            read: read things
  examples:
    sample:
      value: 1
";

    #[test]
    fn test_scope_removed_is_breaking() {
        let right = BASE.replace("            read: read things\n", "            write: write things\n");
        let changes = compare(BASE, &right);
        let scheme = &changes.components.as_ref().unwrap().security_schemes["oauth"];
        let flow = scheme.flows.as_ref().unwrap().implicit.as_ref().unwrap();
        assert_eq!(flow.changes.len(), 2);
        let removed = flow
            .changes
            .iter()
            .find(|d| d.kind == ChangeKind::PropertyRemoved)
            .unwrap();
        assert_eq!(removed.property, "scopes.read");
        assert!(removed.breaking);
    }

    #[test]
    fn test_example_entry_removed_is_not_breaking() {
        let right = BASE.replace("  examples:\n    sample:\n      value: 1\n", "");
        let changes = compare(BASE, &right);
        let components = changes.components.as_ref().unwrap();
        assert_eq!(components.changes.len(), 1);
        let diff = &components.changes[0];
        assert_eq!(diff.property, "sample");
        assert_eq!(diff.kind, ChangeKind::ObjectRemoved);
        assert!(!diff.breaking);
        assert_eq!(diff.coordinates.original_line, Some(12));
    }

    #[test]
    fn test_scheme_type_change() {
        let right = BASE.replace("type: oauth2", "type: http");
        let changes = compare(BASE, &right);
        assert_eq!(changes.total(), 1);
        assert!(changes.breaking() == 1);
    }
}
