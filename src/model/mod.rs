//! Typed OpenAPI 3.x document model.
//!
//! Documents are read into these structures through `serde_json::Value`, so
//! YAML and JSON sources share one model. Every object keeps its `x-`
//! extensions in document order, and every object that may be replaced by a
//! `$ref` carries the reference string in its `reference` field.
//!
//! [`ModelRef`] is a borrowed, kind-tagged view over any object of the
//! model. The semantic graph attaches it to nodes and the change visitor
//! dispatches on it.

mod catalogue;
mod components;
mod document;
mod paths;
mod reference;
mod schema;
mod security;

pub use catalogue::*;
pub use components::*;
pub use document::*;
pub use paths::*;
pub use reference::*;
pub use schema::*;
pub use security::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// OpenAPI object kinds, as carried on semantic nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Document,
    Info,
    Contact,
    License,
    Paths,
    PathItem,
    Operation,
    Parameter,
    RequestBody,
    Responses,
    Response,
    MediaType,
    Encoding,
    Header,
    Link,
    Callback,
    Example,
    Schema,
    Discriminator,
    Xml,
    ExternalDoc,
    Components,
    SecurityScheme,
    #[serde(rename = "oauthFlows")]
    OAuthFlows,
    #[serde(rename = "oauthFlow")]
    OAuthFlow,
    SecurityRequirement,
    Tag,
    Server,
    ServerVariable,
}

impl ObjectKind {
    pub const ALL: [Self; 29] = [
        Self::Document,
        Self::Info,
        Self::Contact,
        Self::License,
        Self::Paths,
        Self::PathItem,
        Self::Operation,
        Self::Parameter,
        Self::RequestBody,
        Self::Responses,
        Self::Response,
        Self::MediaType,
        Self::Encoding,
        Self::Header,
        Self::Link,
        Self::Callback,
        Self::Example,
        Self::Schema,
        Self::Discriminator,
        Self::Xml,
        Self::ExternalDoc,
        Self::Components,
        Self::SecurityScheme,
        Self::OAuthFlows,
        Self::OAuthFlow,
        Self::SecurityRequirement,
        Self::Tag,
        Self::Server,
        Self::ServerVariable,
    ];

    /// Inverse of [`ObjectKind::label`].
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.label() == label)
    }

    /// Node type label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Info => "info",
            Self::Contact => "contact",
            Self::License => "license",
            Self::Paths => "paths",
            Self::PathItem => "pathItem",
            Self::Operation => "operation",
            Self::Parameter => "parameter",
            Self::RequestBody => "requestBody",
            Self::Responses => "responses",
            Self::Response => "response",
            Self::MediaType => "mediaType",
            Self::Encoding => "encoding",
            Self::Header => "header",
            Self::Link => "link",
            Self::Callback => "callback",
            Self::Example => "example",
            Self::Schema => "schema",
            Self::Discriminator => "discriminator",
            Self::Xml => "xml",
            Self::ExternalDoc => "externalDoc",
            Self::Components => "components",
            Self::SecurityScheme => "securityScheme",
            Self::OAuthFlows => "oauthFlows",
            Self::OAuthFlow => "oauthFlow",
            Self::SecurityRequirement => "securityRequirement",
            Self::Tag => "tag",
            Self::Server => "server",
            Self::ServerVariable => "serverVariable",
        }
    }

    /// Human heading used by the report.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Info => "Document Info",
            Self::Contact => "Contact",
            Self::License => "License",
            Self::Paths => "Paths",
            Self::PathItem => "Path Item",
            Self::Operation => "Operation",
            Self::Parameter => "Parameter",
            Self::RequestBody => "Request Body",
            Self::Responses => "Responses",
            Self::Response => "Response",
            Self::MediaType => "Media Type",
            Self::Encoding => "Encoding",
            Self::Header => "Header",
            Self::Link => "Link",
            Self::Callback => "Callback",
            Self::Example => "Example",
            Self::Schema => "Schema",
            Self::Discriminator => "Discriminator",
            Self::Xml => "XML",
            Self::ExternalDoc => "External Docs",
            Self::Components => "Components",
            Self::SecurityScheme => "Security Scheme",
            Self::OAuthFlows => "OAuth Flows",
            Self::OAuthFlow => "OAuth Flow",
            Self::SecurityRequirement => "Security Requirement",
            Self::Tag => "Tag",
            Self::Server => "Server",
            Self::ServerVariable => "Server Variable",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Borrowed view of one object of a document, tagged by kind.
#[derive(Debug, Clone, Copy)]
pub enum ModelRef<'d> {
    Document(&'d Document),
    Info(&'d Info),
    Contact(&'d Contact),
    License(&'d License),
    Paths(&'d Paths),
    PathItem(&'d PathItem),
    Operation(&'d Operation),
    Parameter(&'d Parameter),
    RequestBody(&'d RequestBody),
    Responses(&'d Responses),
    Response(&'d Response),
    MediaType(&'d MediaType),
    Encoding(&'d Encoding),
    Header(&'d Header),
    Link(&'d Link),
    Callback(&'d Callback),
    Example(&'d Example),
    Schema(&'d Schema),
    Discriminator(&'d Discriminator),
    Xml(&'d Xml),
    ExternalDoc(&'d ExternalDoc),
    Components(&'d Components),
    SecurityScheme(&'d SecurityScheme),
    OAuthFlows(&'d OAuthFlows),
    OAuthFlow(&'d OAuthFlow),
    SecurityRequirement(&'d SecurityRequirement),
    Tag(&'d Tag),
    Server(&'d Server),
    ServerVariable(&'d ServerVariable),
}

impl<'d> ModelRef<'d> {
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::Document(_) => ObjectKind::Document,
            Self::Info(_) => ObjectKind::Info,
            Self::Contact(_) => ObjectKind::Contact,
            Self::License(_) => ObjectKind::License,
            Self::Paths(_) => ObjectKind::Paths,
            Self::PathItem(_) => ObjectKind::PathItem,
            Self::Operation(_) => ObjectKind::Operation,
            Self::Parameter(_) => ObjectKind::Parameter,
            Self::RequestBody(_) => ObjectKind::RequestBody,
            Self::Responses(_) => ObjectKind::Responses,
            Self::Response(_) => ObjectKind::Response,
            Self::MediaType(_) => ObjectKind::MediaType,
            Self::Encoding(_) => ObjectKind::Encoding,
            Self::Header(_) => ObjectKind::Header,
            Self::Link(_) => ObjectKind::Link,
            Self::Callback(_) => ObjectKind::Callback,
            Self::Example(_) => ObjectKind::Example,
            Self::Schema(_) => ObjectKind::Schema,
            Self::Discriminator(_) => ObjectKind::Discriminator,
            Self::Xml(_) => ObjectKind::Xml,
            Self::ExternalDoc(_) => ObjectKind::ExternalDoc,
            Self::Components(_) => ObjectKind::Components,
            Self::SecurityScheme(_) => ObjectKind::SecurityScheme,
            Self::OAuthFlows(_) => ObjectKind::OAuthFlows,
            Self::OAuthFlow(_) => ObjectKind::OAuthFlow,
            Self::SecurityRequirement(_) => ObjectKind::SecurityRequirement,
            Self::Tag(_) => ObjectKind::Tag,
            Self::Server(_) => ObjectKind::Server,
            Self::ServerVariable(_) => ObjectKind::ServerVariable,
        }
    }

    /// The `$ref` carried by the object, for kinds that may be references.
    #[must_use]
    pub fn reference(&self) -> Option<&'d str> {
        match *self {
            Self::PathItem(o) => o.reference.as_deref(),
            Self::Parameter(o) => o.reference.as_deref(),
            Self::RequestBody(o) => o.reference.as_deref(),
            Self::Response(o) => o.reference.as_deref(),
            Self::Header(o) => o.reference.as_deref(),
            Self::Link(o) => o.reference.as_deref(),
            Self::Callback(o) => o.reference.as_deref(),
            Self::Example(o) => o.reference.as_deref(),
            Self::Schema(o) => o.reference.as_deref(),
            Self::SecurityScheme(o) => o.reference.as_deref(),
            _ => None,
        }
    }

    /// Content hash of the underlying object.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        use crate::utils::object_hash;
        match *self {
            Self::Document(o) => object_hash(o),
            Self::Info(o) => object_hash(o),
            Self::Contact(o) => object_hash(o),
            Self::License(o) => object_hash(o),
            Self::Paths(o) => object_hash(o),
            Self::PathItem(o) => object_hash(o),
            Self::Operation(o) => object_hash(o),
            Self::Parameter(o) => object_hash(o),
            Self::RequestBody(o) => object_hash(o),
            Self::Responses(o) => object_hash(o),
            Self::Response(o) => object_hash(o),
            Self::MediaType(o) => object_hash(o),
            Self::Encoding(o) => object_hash(o),
            Self::Header(o) => object_hash(o),
            Self::Link(o) => object_hash(o),
            Self::Callback(o) => object_hash(o),
            Self::Example(o) => object_hash(o),
            Self::Schema(o) => object_hash(o),
            Self::Discriminator(o) => object_hash(o),
            Self::Xml(o) => object_hash(o),
            Self::ExternalDoc(o) => object_hash(o),
            Self::Components(o) => object_hash(o),
            Self::SecurityScheme(o) => object_hash(o),
            Self::OAuthFlows(o) => object_hash(o),
            Self::OAuthFlow(o) => object_hash(o),
            Self::SecurityRequirement(o) => object_hash(o),
            Self::Tag(o) => object_hash(o),
            Self::Server(o) => object_hash(o),
            Self::ServerVariable(o) => object_hash(o),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_match_serde_names() {
        for kind in ObjectKind::ALL {
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, kind.label());
            assert_eq!(ObjectKind::from_label(kind.label()), Some(kind));
        }
        assert_eq!(ObjectKind::from_label("servers"), None);
    }

    #[test]
    fn test_model_ref_reference() {
        let schema = Schema::reference_to("#/components/schemas/Pet");
        let view = ModelRef::Schema(&schema);
        assert_eq!(view.kind(), ObjectKind::Schema);
        assert_eq!(view.reference(), Some("#/components/schemas/Pet"));

        let info = Info::default();
        assert_eq!(ModelRef::Info(&info).reference(), None);
    }
}
