//! Objects loaded from other files through relative `$ref`s.
//!
//! A reference such as `defs.yaml#/PropC` names a file relative to the
//! referring document and a JSON pointer into it. Every named object is
//! read once into the typed model and stored under its canonical reference:
//! the file path relative to the root document, normalised, then `#` and
//! the pointer. References inside loaded objects are stored canonical too,
//! so they resolve here without knowing which file they came from.

use super::{
    Callback, Example, Header, Link, ModelRef, ObjectKind, Parameter, PathItem, RequestBody,
    Response, Schema, SecurityScheme,
};
use crate::parsers::SourceMap;
use indexmap::IndexMap;
use serde_json::Value;

/// One object read from another file.
#[derive(Debug, Clone)]
pub enum External {
    Schema(Schema),
    Parameter(Parameter),
    RequestBody(RequestBody),
    Response(Response),
    Header(Header),
    Example(Example),
    Link(Link),
    Callback(Callback),
    SecurityScheme(SecurityScheme),
    PathItem(PathItem),
}

impl External {
    /// Read `value` as an object of `kind`. `None` for kinds that cannot be
    /// referenced.
    pub fn from_value(kind: ObjectKind, value: Value) -> Option<serde_json::Result<Self>> {
        fn read<T: serde::de::DeserializeOwned>(
            value: Value,
            wrap: fn(T) -> External,
        ) -> serde_json::Result<External> {
            serde_json::from_value(value).map(wrap)
        }
        Some(match kind {
            ObjectKind::Schema => read(value, Self::Schema),
            ObjectKind::Parameter => read(value, Self::Parameter),
            ObjectKind::RequestBody => read(value, Self::RequestBody),
            ObjectKind::Response => read(value, Self::Response),
            ObjectKind::Header => read(value, Self::Header),
            ObjectKind::Example => read(value, Self::Example),
            ObjectKind::Link => read(value, Self::Link),
            ObjectKind::Callback => read(value, Self::Callback),
            ObjectKind::SecurityScheme => read(value, Self::SecurityScheme),
            ObjectKind::PathItem => read(value, Self::PathItem),
            _ => return None,
        })
    }

    #[must_use]
    pub fn as_model(&self) -> ModelRef<'_> {
        match self {
            Self::Schema(o) => ModelRef::Schema(o),
            Self::Parameter(o) => ModelRef::Parameter(o),
            Self::RequestBody(o) => ModelRef::RequestBody(o),
            Self::Response(o) => ModelRef::Response(o),
            Self::Header(o) => ModelRef::Header(o),
            Self::Example(o) => ModelRef::Example(o),
            Self::Link(o) => ModelRef::Link(o),
            Self::Callback(o) => ModelRef::Callback(o),
            Self::SecurityScheme(o) => ModelRef::SecurityScheme(o),
            Self::PathItem(o) => ModelRef::PathItem(o),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.as_model().kind()
    }
}

/// Raw content of a loaded file, for coordinates and report context.
#[derive(Debug, Clone)]
pub struct ExternalFile {
    pub raw: String,
    pub source_map: SourceMap,
}

/// Per-run store of objects from other files, keyed by canonical reference.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    files: IndexMap<String, ExternalFile>,
    objects: IndexMap<String, External>,
}

impl Catalogue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of loaded objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn insert_file(&mut self, name: impl Into<String>, file: ExternalFile) {
        self.files.insert(name.into(), file);
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Option<&ExternalFile> {
        self.files.get(name)
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &ExternalFile)> {
        self.files.iter().map(|(name, file)| (name.as_str(), file))
    }

    pub fn insert(&mut self, reference: impl Into<String>, object: External) {
        self.objects.insert(reference.into(), object);
    }

    #[must_use]
    pub fn contains(&self, reference: &str) -> bool {
        self.objects.contains_key(reference)
    }

    /// The object a reference from the root document names.
    #[must_use]
    pub fn get(&self, reference: &str) -> Option<&External> {
        let canonical = canonical_reference("", reference)?;
        self.objects.get(&canonical)
    }
}

/// Canonical form of a file reference made from the file `base` (relative
/// to the root document, `""` for the root itself).
///
/// Local references inside another file gain that file's name. `None` for
/// remote URLs and for local references of the root document.
#[must_use]
pub fn canonical_reference(base: &str, reference: &str) -> Option<String> {
    let (file, fragment) = reference.split_once('#').unwrap_or((reference, ""));
    if file.contains("://") {
        return None;
    }
    let joined = match (file.is_empty(), base.is_empty()) {
        (true, true) => return None,
        (true, false) => base.to_string(),
        (false, _) => match base.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{file}"),
            None => file.to_string(),
        },
    };
    Some(format!("{}#{fragment}", normalize(&joined)))
}

/// Resolve `.` and `..` in a relative path. Leading `..` are kept.
fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." if parts.last().is_some_and(|p| *p != "..") => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_reference() {
        assert_eq!(
            canonical_reference("", "defs.yaml#/PropC").as_deref(),
            Some("defs.yaml#/PropC")
        );
        assert_eq!(
            canonical_reference("", "./schemas/../defs.yaml#/PropC").as_deref(),
            Some("defs.yaml#/PropC")
        );
        assert_eq!(
            canonical_reference("schemas/pet.yaml", "#/Pet").as_deref(),
            Some("schemas/pet.yaml#/Pet")
        );
        assert_eq!(
            canonical_reference("schemas/pet.yaml", "../common.yaml").as_deref(),
            Some("common.yaml#")
        );
        assert!(canonical_reference("", "#/components/schemas/Pet").is_none());
        assert!(canonical_reference("", "https://example.com/defs.yaml#/X").is_none());
    }

    #[test]
    fn test_lookup_by_any_spelling() {
        let mut catalogue = Catalogue::default();
        let schema = External::from_value(ObjectKind::Schema, json!({"type": "string"}))
            .unwrap()
            .unwrap();
        assert_eq!(schema.kind(), ObjectKind::Schema);
        catalogue.insert("defs.yaml#/PropC", schema);
        assert!(catalogue.get("./defs.yaml#/PropC").is_some());
        assert!(catalogue.get("defs.yaml#/PropD").is_none());
        assert_eq!(catalogue.len(), 1);
        assert!(External::from_value(ObjectKind::Info, json!({})).is_none());
    }
}
