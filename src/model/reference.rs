//! Resolution of `$ref` strings.
//!
//! Local references name `#/components/...` entries of the document. Any
//! other relative reference is looked up in the [`Catalogue`] of objects
//! loaded from other files.

use super::{
    Callback, Catalogue, Components, Document, Example, External, Header, Link, ModelRef,
    Parameter, PathItem, RequestBody, Response, Schema, SecurityScheme,
};
use indexmap::IndexMap;

/// Upper bound on `$ref` -> `$ref` hops before a chain is treated as a cycle.
const MAX_HOPS: usize = 32;

/// Objects that may be replaced by a `$ref`.
pub trait Referrable {
    fn reference(&self) -> Option<&str>;
}

/// Objects that live in a `components` section.
pub trait ComponentItem: Referrable + Sized {
    /// Section name as it appears in a reference.
    const SECTION: &'static str;

    fn section(components: &Components) -> &IndexMap<String, Self>;

    fn external(object: &External) -> Option<&Self>;
}

macro_rules! component_item {
    ($ty:ident, $section:literal, $field:ident) => {
        impl Referrable for $ty {
            fn reference(&self) -> Option<&str> {
                self.reference.as_deref()
            }
        }

        impl ComponentItem for $ty {
            const SECTION: &'static str = $section;

            fn section(components: &Components) -> &IndexMap<String, Self> {
                &components.$field
            }

            fn external(object: &External) -> Option<&Self> {
                match object {
                    External::$ty(o) => Some(o),
                    _ => None,
                }
            }
        }
    };
}

component_item!(Schema, "schemas", schemas);
component_item!(Response, "responses", responses);
component_item!(Parameter, "parameters", parameters);
component_item!(Example, "examples", examples);
component_item!(RequestBody, "requestBodies", request_bodies);
component_item!(Header, "headers", headers);
component_item!(SecurityScheme, "securitySchemes", security_schemes);
component_item!(Link, "links", links);
component_item!(Callback, "callbacks", callbacks);
component_item!(PathItem, "pathItems", path_items);

/// Split `#/components/<section>/<name>` into its section and unescaped name.
///
/// Anything else (remote files, deeper pointers) yields `None`.
#[must_use]
pub fn split_component_ref(reference: &str) -> Option<(&str, String)> {
    let rest = reference.strip_prefix("#/components/")?;
    let (section, name) = rest.split_once('/')?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some((section, unescape_pointer(name)))
}

/// Decode a JSON pointer reference token (`~1` -> `/`, `~0` -> `~`).
#[must_use]
pub fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

/// Encode a JSON pointer reference token.
#[must_use]
pub fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Resolves references against one document and the files it names.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'d> {
    document: &'d Document,
    catalogue: Option<&'d Catalogue>,
}

impl<'d> Resolver<'d> {
    #[must_use]
    pub fn new(document: &'d Document) -> Self {
        Self {
            document,
            catalogue: None,
        }
    }

    #[must_use]
    pub fn with_catalogue(mut self, catalogue: &'d Catalogue) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Look up the definition a reference names, one hop only.
    #[must_use]
    pub fn lookup<T: ComponentItem>(&self, reference: &str) -> Option<&'d T> {
        if !reference.starts_with('#') {
            return T::external(self.catalogue?.get(reference)?);
        }
        let (section, name) = split_component_ref(reference)?;
        if section != T::SECTION {
            return None;
        }
        let components = self.document.components.as_ref()?;
        T::section(components).get(&name)
    }

    /// Follow `$ref` hops from `item` to the first concrete object.
    ///
    /// Returns the object and the last reference followed (if any). `None`
    /// when a hop cannot be resolved or the chain does not terminate.
    #[must_use]
    pub fn concrete<T: ComponentItem>(&self, item: &'d T) -> Option<(&'d T, Option<&'d str>)> {
        let mut current = item;
        let mut last: Option<&'d str> = None;
        for _ in 0..MAX_HOPS {
            match current.reference() {
                None => return Some((current, last)),
                Some(reference) => {
                    last = Some(reference);
                    current = self.lookup::<T>(reference)?;
                }
            }
        }
        tracing::debug!(reference = ?last, "reference chain did not terminate");
        None
    }

    /// The definition a stub names, with the last reference followed to
    /// reach it. `None` for objects that are not stubs and for stubs that
    /// do not resolve.
    #[must_use]
    pub fn resolve(&self, model: ModelRef<'d>) -> Option<(ModelRef<'d>, &'d str)> {
        match model {
            ModelRef::Schema(o) => self.definition(o, ModelRef::Schema),
            ModelRef::Parameter(o) => self.definition(o, ModelRef::Parameter),
            ModelRef::RequestBody(o) => self.definition(o, ModelRef::RequestBody),
            ModelRef::Response(o) => self.definition(o, ModelRef::Response),
            ModelRef::Header(o) => self.definition(o, ModelRef::Header),
            ModelRef::Example(o) => self.definition(o, ModelRef::Example),
            ModelRef::Link(o) => self.definition(o, ModelRef::Link),
            ModelRef::Callback(o) => self.definition(o, ModelRef::Callback),
            ModelRef::SecurityScheme(o) => self.definition(o, ModelRef::SecurityScheme),
            ModelRef::PathItem(o) => self.definition(o, ModelRef::PathItem),
            _ => None,
        }
    }

    fn definition<T: ComponentItem>(
        &self,
        item: &'d T,
        view: fn(&'d T) -> ModelRef<'d>,
    ) -> Option<(ModelRef<'d>, &'d str)> {
        let (definition, last) = self.concrete(item)?;
        Some((view(definition), last?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        serde_json::from_value(json!({
            "openapi": "3.1.0",
            "components": {
                "schemas": {
                    "Pet": {"type": "object"},
                    "Alias": {"$ref": "#/components/schemas/Pet"},
                    "Loop": {"$ref": "#/components/schemas/Loop"},
                    "a/b": {"type": "string"}
                },
                "parameters": {
                    "limit": {"name": "limit", "in": "query"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_split_component_ref() {
        assert_eq!(
            split_component_ref("#/components/schemas/Pet"),
            Some(("schemas", "Pet".to_string()))
        );
        assert_eq!(
            split_component_ref("#/components/schemas/a~1b"),
            Some(("schemas", "a/b".to_string()))
        );
        assert!(split_component_ref("other.yaml#/components/schemas/Pet").is_none());
        assert!(split_component_ref("#/components/schemas/Pet/properties/id").is_none());
    }

    #[test]
    fn test_lookup_checks_section() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        assert!(resolver.lookup::<Schema>("#/components/schemas/Pet").is_some());
        assert!(resolver.lookup::<Parameter>("#/components/parameters/limit").is_some());
        assert!(resolver.lookup::<Parameter>("#/components/schemas/Pet").is_none());
        assert!(resolver.lookup::<Schema>("#/components/schemas/Missing").is_none());
        assert!(resolver.lookup::<Schema>("#/components/schemas/a~1b").is_some());
    }

    #[test]
    fn test_concrete_follows_chains() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let alias = Schema::reference_to("#/components/schemas/Alias");
        let (schema, last) = resolver.concrete(&alias).unwrap();
        assert_eq!(schema.type_names(), vec!["object"]);
        assert_eq!(last, Some("#/components/schemas/Pet"));
    }

    #[test]
    fn test_resolve_stub_view() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let alias = Schema::reference_to("#/components/schemas/Alias");
        let (target, last) = resolver.resolve(ModelRef::Schema(&alias)).unwrap();
        assert_eq!(last, "#/components/schemas/Pet");
        assert!(target.reference().is_none());

        let inline = Schema::default();
        assert!(resolver.resolve(ModelRef::Schema(&inline)).is_none());
    }

    #[test]
    fn test_lookup_in_catalogue() {
        let doc = document();
        let mut catalogue = Catalogue::default();
        let schema = External::from_value(
            crate::model::ObjectKind::Schema,
            json!({"description": "from a file"}),
        )
        .unwrap()
        .unwrap();
        catalogue.insert("defs.yaml#/PropC", schema);

        let resolver = Resolver::new(&doc);
        assert!(resolver.lookup::<Schema>("defs.yaml#/PropC").is_none());
        let resolver = resolver.with_catalogue(&catalogue);
        let found = resolver.lookup::<Schema>("defs.yaml#/PropC").unwrap();
        assert_eq!(found.description.as_deref(), Some("from a file"));
        assert!(resolver.lookup::<Parameter>("defs.yaml#/PropC").is_none());
        assert_eq!(escape_pointer("a/b~c"), "a~1b~0c");
    }

    #[test]
    fn test_concrete_detects_cycles() {
        let doc = document();
        let resolver = Resolver::new(&doc);
        let looped = Schema::reference_to("#/components/schemas/Loop");
        assert!(resolver.concrete(&looped).is_none());
    }
}
