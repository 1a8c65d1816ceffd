//! Typed change groups mirroring the OpenAPI object hierarchy.
//!
//! Every group carries its own property-level diffs in `changes` and one
//! field per nested object that changed. Additions and removals of whole
//! list members or map entries are recorded as `ObjectAdded` /
//! `ObjectRemoved` diffs on the parent group; members that exist on both
//! sides and differ get a nested group of their own.
//!
//! [`DiffGroup`] is a borrowed, kind-tagged view over any group. The change
//! visitor receives it from a traversal context and narrows it back to the
//! concrete type with [`GroupKind::downcast`].

use super::types::{ChangeKind, Diff, ObjectHandle};
use crate::model::ObjectKind;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Object handles of a list member that exists in both documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<ObjectHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<ObjectHandle>,
}

/// Uniform access to a change group.
pub trait Changes {
    fn kind(&self) -> ObjectKind;

    /// Diffs of this object's own properties, without nested groups.
    fn property_changes(&self) -> &[Diff];

    fn property_changes_mut(&mut self) -> &mut Vec<Diff>;

    /// Nested groups in field order.
    fn children(&self) -> Vec<DiffGroup<'_>>;

    fn as_group(&self) -> DiffGroup<'_>;

    /// Keep the diffs (own and nested) for which `keep` returns true.
    fn retain_diffs(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool);

    /// Handles identifying the list member this group describes.
    fn identity(&self) -> Option<&MemberIdentity> {
        None
    }

    /// Own and nested diffs, depth first.
    fn all_changes(&self) -> Vec<&Diff> {
        let mut out: Vec<&Diff> = self.property_changes().iter().collect();
        for child in self.children() {
            out.extend(child.all_changes());
        }
        out
    }

    fn total(&self) -> usize {
        self.property_changes().len() + self.children().iter().map(|c| c.total()).sum::<usize>()
    }

    fn breaking(&self) -> usize {
        self.property_changes().iter().filter(|d| d.breaking).count()
            + self.children().iter().map(|c| c.breaking()).sum::<usize>()
    }

    fn count_kind(&self, kind: ChangeKind) -> usize {
        self.all_changes().iter().filter(|d| d.kind == kind).count()
    }

    fn is_empty(&self) -> bool {
        self.property_changes().is_empty() && self.children().iter().all(|c| c.is_empty())
    }
}

impl<T: Changes + ?Sized> Changes for Box<T> {
    fn kind(&self) -> ObjectKind {
        (**self).kind()
    }

    fn property_changes(&self) -> &[Diff] {
        (**self).property_changes()
    }

    fn property_changes_mut(&mut self) -> &mut Vec<Diff> {
        (**self).property_changes_mut()
    }

    fn children(&self) -> Vec<DiffGroup<'_>> {
        (**self).children()
    }

    fn as_group(&self) -> DiffGroup<'_> {
        (**self).as_group()
    }

    fn retain_diffs(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool) {
        (**self).retain_diffs(keep);
    }

    fn identity(&self) -> Option<&MemberIdentity> {
        (**self).identity()
    }
}

/// A field of a group that holds nested groups.
trait GroupSlot {
    fn collect<'a>(&'a self, out: &mut Vec<DiffGroup<'a>>);
    fn retain(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool);
}

impl<T: Changes> GroupSlot for Option<T> {
    fn collect<'a>(&'a self, out: &mut Vec<DiffGroup<'a>>) {
        if let Some(group) = self {
            out.push(group.as_group());
        }
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool) {
        if let Some(group) = self {
            group.retain_diffs(keep);
        }
    }
}

impl<T: Changes> GroupSlot for Vec<T> {
    fn collect<'a>(&'a self, out: &mut Vec<DiffGroup<'a>>) {
        out.extend(self.iter().map(Changes::as_group));
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool) {
        for group in self {
            group.retain_diffs(keep);
        }
    }
}

impl<T: Changes> GroupSlot for IndexMap<String, T> {
    fn collect<'a>(&'a self, out: &mut Vec<DiffGroup<'a>>) {
        out.extend(self.values().map(Changes::as_group));
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool) {
        for group in self.values_mut() {
            group.retain_diffs(keep);
        }
    }
}

/// Narrowing from a [`DiffGroup`] back to a concrete group type.
pub trait GroupKind: Changes {
    const KIND: ObjectKind;

    fn downcast(group: DiffGroup<'_>) -> Option<&Self>;
}

macro_rules! change_group {
    (@body $ty:ident, $kind:ident, [$($slot:ident),*]) => {
        fn kind(&self) -> ObjectKind {
            ObjectKind::$kind
        }

        fn property_changes(&self) -> &[Diff] {
            &self.changes
        }

        fn property_changes_mut(&mut self) -> &mut Vec<Diff> {
            &mut self.changes
        }

        #[allow(unused_mut)]
        fn children(&self) -> Vec<DiffGroup<'_>> {
            let mut out = Vec::new();
            $( GroupSlot::collect(&self.$slot, &mut out); )*
            out
        }

        fn as_group(&self) -> DiffGroup<'_> {
            DiffGroup::$kind(self)
        }

        fn retain_diffs(&mut self, keep: &mut dyn FnMut(&mut Diff) -> bool) {
            self.changes.retain_mut(|diff| keep(diff));
            $( GroupSlot::retain(&mut self.$slot, keep); )*
        }
    };
    ($ty:ident, $kind:ident, [$($slot:ident),*]) => {
        impl Changes for $ty {
            change_group!(@body $ty, $kind, [$($slot),*]);
        }
    };
    ($ty:ident, $kind:ident, identity, [$($slot:ident),*]) => {
        impl Changes for $ty {
            change_group!(@body $ty, $kind, [$($slot),*]);

            fn identity(&self) -> Option<&MemberIdentity> {
                Some(&self.identity)
            }
        }
    };
}

macro_rules! diff_groups {
    ($($kind:ident => $ty:ident),* $(,)?) => {
        /// Borrowed view over any change group.
        #[derive(Debug, Clone, Copy)]
        pub enum DiffGroup<'a> {
            $($kind(&'a $ty),)*
        }

        impl<'a> DiffGroup<'a> {
            #[must_use]
            pub fn kind(&self) -> ObjectKind {
                match self {
                    $(Self::$kind(_) => ObjectKind::$kind,)*
                }
            }

            /// The group as a trait object with the view's lifetime.
            #[must_use]
            pub fn as_changes(&self) -> &'a dyn Changes {
                match *self {
                    $(Self::$kind(group) => group,)*
                }
            }

            /// Address of the underlying group, stable while it is borrowed.
            #[must_use]
            pub fn address(&self) -> usize {
                match *self {
                    $(Self::$kind(group) => group as *const $ty as usize,)*
                }
            }

            #[must_use]
            pub fn property_changes(&self) -> &'a [Diff] {
                self.as_changes().property_changes()
            }

            #[must_use]
            pub fn children(&self) -> Vec<DiffGroup<'a>> {
                self.as_changes().children()
            }

            #[must_use]
            pub fn all_changes(&self) -> Vec<&'a Diff> {
                self.as_changes().all_changes()
            }

            #[must_use]
            pub fn identity(&self) -> Option<&'a MemberIdentity> {
                self.as_changes().identity()
            }

            #[must_use]
            pub fn total(&self) -> usize {
                self.as_changes().total()
            }

            #[must_use]
            pub fn breaking(&self) -> usize {
                self.as_changes().breaking()
            }

            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.as_changes().is_empty()
            }
        }

        $(
            impl GroupKind for $ty {
                const KIND: ObjectKind = ObjectKind::$kind;

                fn downcast(group: DiffGroup<'_>) -> Option<&Self> {
                    match group {
                        DiffGroup::$kind(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

diff_groups! {
    Document => DocumentChanges,
    Info => InfoChanges,
    Contact => ContactChanges,
    License => LicenseChanges,
    Paths => PathsChanges,
    PathItem => PathItemChanges,
    Operation => OperationChanges,
    Parameter => ParameterChanges,
    RequestBody => RequestBodyChanges,
    Responses => ResponsesChanges,
    Response => ResponseChanges,
    MediaType => MediaTypeChanges,
    Encoding => EncodingChanges,
    Header => HeaderChanges,
    Link => LinkChanges,
    Callback => CallbackChanges,
    Example => ExampleChanges,
    Schema => SchemaChanges,
    Discriminator => DiscriminatorChanges,
    Xml => XmlChanges,
    ExternalDoc => ExternalDocChanges,
    Components => ComponentsChanges,
    SecurityScheme => SecuritySchemeChanges,
    OAuthFlows => OAuthFlowsChanges,
    OAuthFlow => OAuthFlowChanges,
    SecurityRequirement => SecurityRequirementChanges,
    Tag => TagChanges,
    Server => ServerChanges,
    ServerVariable => ServerVariableChanges,
}

impl fmt::Display for DiffGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} changes", self.kind())
    }
}

// ============================================================================
// Group definitions
// ============================================================================

/// Top-level result of comparing two documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<InfoChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathsChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub webhooks: IndexMap<String, PathItemChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentsChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirementChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocChanges>,
}

change_group!(
    DocumentChanges,
    Document,
    [info, servers, paths, webhooks, components, security, tags, external_docs]
);

impl DocumentChanges {
    /// Count of diffs per change kind: (additions, modifications, removals).
    #[must_use]
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for diff in self.all_changes() {
            if diff.kind.is_addition() {
                counts.0 += 1;
            } else if diff.kind.is_modification() {
                counts.1 += 1;
            } else {
                counts.2 += 1;
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseChanges>,
}

change_group!(InfoChanges, Info, [contact, license]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactChanges {
    pub changes: Vec<Diff>,
}

change_group!(ContactChanges, Contact, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseChanges {
    pub changes: Vec<Diff>,
}

change_group!(LicenseChanges, License, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerChanges {
    pub changes: Vec<Diff>,
    #[serde(default)]
    pub identity: MemberIdentity,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub variables: IndexMap<String, ServerVariableChanges>,
}

change_group!(ServerChanges, Server, identity, [variables]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariableChanges {
    pub changes: Vec<Diff>,
}

change_group!(ServerVariableChanges, ServerVariable, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagChanges {
    pub changes: Vec<Diff>,
    #[serde(default)]
    pub identity: MemberIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocChanges>,
}

change_group!(TagChanges, Tag, identity, [external_docs]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocChanges {
    pub changes: Vec<Diff>,
}

change_group!(ExternalDocChanges, ExternalDoc, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityRequirementChanges {
    pub changes: Vec<Diff>,
    #[serde(default)]
    pub identity: MemberIdentity,
}

change_group!(SecurityRequirementChanges, SecurityRequirement, identity, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsChanges {
    pub changes: Vec<Diff>,
    /// Path template -> changes of that path item.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub items: IndexMap<String, PathItemChanges>,
}

change_group!(PathsChanges, Paths, [items]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItemChanges {
    pub changes: Vec<Diff>,
    /// HTTP method -> operation changes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub operations: IndexMap<String, OperationChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterChanges>,
}

change_group!(PathItemChanges, PathItem, [operations, servers, parameters]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<ResponsesChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirementChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<ServerChanges>,
}

change_group!(
    OperationChanges,
    Operation,
    [external_docs, parameters, request_body, responses, callbacks, security, servers]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterChanges {
    pub changes: Vec<Diff>,
    #[serde(default)]
    pub identity: MemberIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeChanges>,
}

change_group!(ParameterChanges, Parameter, identity, [schema, examples, content]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBodyChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeChanges>,
}

change_group!(RequestBodyChanges, RequestBody, [content]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsesChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ResponseChanges>,
    /// Status code -> response changes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub codes: IndexMap<String, ResponseChanges>,
}

change_group!(ResponsesChanges, Responses, [default, codes]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, LinkChanges>,
}

change_group!(ResponseChanges, Response, [headers, content, links]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTypeChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, EncodingChanges>,
}

change_group!(MediaTypeChanges, MediaType, [schema, examples, encoding]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderChanges>,
}

change_group!(EncodingChanges, Encoding, [headers]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeChanges>,
}

change_group!(HeaderChanges, Header, [schema, examples, content]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerChanges>,
}

change_group!(LinkChanges, Link, [server]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackChanges {
    pub changes: Vec<Diff>,
    /// Runtime expression -> path item changes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub expressions: IndexMap<String, PathItemChanges>,
}

change_group!(CallbackChanges, Callback, [expressions]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleChanges {
    pub changes: Vec<Diff>,
}

change_group!(ExampleChanges, Example, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaChanges {
    pub changes: Vec<Diff>,
    #[serde(default)]
    pub identity: MemberIdentity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaChanges>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prefix_items: Vec<SchemaChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then_schema: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unevaluated_items: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unevaluated_properties: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaChanges>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pattern_properties: IndexMap<String, SchemaChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependent_schemas: IndexMap<String, SchemaChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<DiscriminatorChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<XmlChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocChanges>,
}

change_group!(
    SchemaChanges,
    Schema,
    identity,
    [
        all_of,
        one_of,
        any_of,
        prefix_items,
        not,
        contains,
        if_schema,
        then_schema,
        else_schema,
        property_names,
        items,
        unevaluated_items,
        unevaluated_properties,
        additional_properties,
        properties,
        pattern_properties,
        dependent_schemas,
        discriminator,
        xml,
        external_docs
    ]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscriminatorChanges {
    pub changes: Vec<Diff>,
}

change_group!(DiscriminatorChanges, Discriminator, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XmlChanges {
    pub changes: Vec<Diff>,
}

change_group!(XmlChanges, Xml, []);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentsChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, ResponseChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, ParameterChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, ExampleChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub request_bodies: IndexMap<String, RequestBodyChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, HeaderChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecuritySchemeChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub links: IndexMap<String, LinkChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub callbacks: IndexMap<String, CallbackChanges>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub path_items: IndexMap<String, PathItemChanges>,
}

change_group!(
    ComponentsChanges,
    Components,
    [
        schemas,
        responses,
        parameters,
        examples,
        request_bodies,
        headers,
        security_schemes,
        links,
        callbacks,
        path_items
    ]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecuritySchemeChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlowsChanges>,
}

change_group!(SecuritySchemeChanges, SecurityScheme, [flows]);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthFlowsChanges {
    pub changes: Vec<Diff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlowChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlowChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlowChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlowChanges>,
}

change_group!(
    OAuthFlowsChanges,
    OAuthFlows,
    [implicit, password, client_credentials, authorization_code]
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthFlowChanges {
    pub changes: Vec<Diff>,
}

change_group!(OAuthFlowChanges, OAuthFlow, []);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn modified(property: &str) -> Diff {
        Diff::new(property, ChangeKind::Modified).values(Some(json!(1)), Some(json!(2)))
    }

    fn sample() -> DocumentChanges {
        DocumentChanges {
            changes: vec![modified("x-modified")],
            info: Some(InfoChanges {
                changes: vec![modified("title")],
                contact: Some(ContactChanges {
                    changes: vec![Diff::new("url", ChangeKind::PropertyAdded)],
                }),
                license: None,
            }),
            ..DocumentChanges::default()
        }
    }

    #[test]
    fn test_flattening_and_counts() {
        let changes = sample();
        assert_eq!(changes.total(), 3);
        assert_eq!(changes.property_changes().len(), 1);
        let names: Vec<&str> = changes
            .all_changes()
            .iter()
            .map(|d| d.property.as_str())
            .collect();
        assert_eq!(names, vec!["x-modified", "title", "url"]);
        assert_eq!(changes.kind_counts(), (1, 2, 0));
    }

    #[test]
    fn test_downcast() {
        let changes = sample();
        let children = changes.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].kind(), ObjectKind::Info);
        assert!(InfoChanges::downcast(children[0]).is_some());
        assert!(ContactChanges::downcast(children[0]).is_none());
    }

    #[test]
    fn test_retain_diffs_reaches_nested_groups() {
        let mut changes = sample();
        changes.retain_diffs(&mut |diff| diff.property != "url");
        assert_eq!(changes.total(), 2);
        assert!(changes.info.as_ref().unwrap().contact.as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_boxed_schema_groups() {
        let schema = SchemaChanges {
            items: Some(Box::new(SchemaChanges {
                changes: vec![modified("type")],
                ..SchemaChanges::default()
            })),
            ..SchemaChanges::default()
        };
        assert_eq!(schema.total(), 1);
        assert_eq!(schema.children()[0].kind(), ObjectKind::Schema);
        assert!(schema.identity().is_some());
    }
}
