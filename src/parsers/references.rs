//! Loading of the files a document names through relative `$ref`s.

use super::{parse_value, read_limited, ParseError, SourceFormat};
use crate::graph::SemanticGraph;
use crate::model::{
    canonical_reference, Catalogue, Document, External, ExternalFile, ModelRef, ObjectKind,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Upper bound on distinct files read for one document.
const MAX_FILES: usize = 256;

/// Read every object `document` reaches through relative file references,
/// following references inside loaded objects as well.
///
/// `root` is the document's own path; references resolve from its
/// directory. Files that cannot be read and pointers that do not resolve
/// are logged and skipped, leaving those references unresolved.
#[must_use]
pub fn load_catalogue(root: &Path, document: &Document) -> Catalogue {
    let mut queue: VecDeque<(ObjectKind, String)> =
        file_references(ModelRef::Document(document)).into();
    if queue.is_empty() {
        return Catalogue::default();
    }

    let mut loader = Loader {
        base: root.parent().unwrap_or_else(|| Path::new("")),
        root_name: root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        files: HashMap::new(),
        catalogue: Catalogue::default(),
    };
    while let Some((kind, reference)) = queue.pop_front() {
        if loader.catalogue.contains(&reference) {
            continue;
        }
        let Some(object) = loader.object(kind, &reference) else {
            continue;
        };
        queue.extend(file_references(object.as_model()));
        loader.catalogue.insert(reference, object);
    }
    tracing::debug!(
        files = loader.files.len(),
        objects = loader.catalogue.len(),
        "loaded referenced files"
    );
    loader.catalogue
}

/// Canonical file references made by `model` and everything below it.
fn file_references(model: ModelRef<'_>) -> Vec<(ObjectKind, String)> {
    SemanticGraph::references(model)
        .into_iter()
        .filter_map(|(kind, reference)| Some((kind, canonical_reference("", reference)?)))
        .collect()
}

struct Loader<'a> {
    base: &'a Path,
    root_name: String,
    /// Parsed files by name; `None` once reading one failed
    files: HashMap<String, Option<Value>>,
    catalogue: Catalogue,
}

impl Loader<'_> {
    fn object(&mut self, kind: ObjectKind, reference: &str) -> Option<External> {
        let (name, fragment) = reference.split_once('#')?;
        let Some(mut value) = self.file(name)?.pointer(fragment).cloned() else {
            tracing::warn!(reference, "referenced location not found in file");
            return None;
        };
        self.rewrite(name, &mut value);
        match External::from_value(kind, value)? {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::warn!(reference, kind = %kind, error = %e, "referenced object not readable");
                None
            }
        }
    }

    fn file(&mut self, name: &str) -> Option<&Value> {
        if !self.files.contains_key(name) {
            if self.files.len() >= MAX_FILES {
                tracing::warn!(file = name, limit = MAX_FILES, "too many referenced files");
                return None;
            }
            let value = match self.read(name) {
                Ok((value, file)) => {
                    self.catalogue.insert_file(name, file);
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!(file = name, error = %e, "referenced file not loaded");
                    None
                }
            };
            self.files.insert(name.to_string(), value);
        }
        self.files.get(name)?.as_ref()
    }

    fn read(&self, name: &str) -> Result<(Value, ExternalFile), ParseError> {
        let raw = read_limited(&self.base.join(name))?;
        let (value, source_map) = parse_value(&raw, SourceFormat::sniff(&raw))?;
        Ok((value, ExternalFile { raw, source_map }))
    }

    /// Rewrite the `$ref`s of an object read from `file` into canonical form.
    /// References back into the root document become local again.
    fn rewrite(&self, file: &str, value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, item) in map.iter_mut() {
                    if key == "$ref" {
                        if let Value::String(reference) = item {
                            if let Some(canonical) = canonical_reference(file, reference) {
                                *reference = self.localize(canonical);
                            }
                            continue;
                        }
                    }
                    self.rewrite(file, item);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.rewrite(file, item);
                }
            }
            _ => {}
        }
    }

    fn localize(&self, canonical: String) -> String {
        match canonical.split_once('#') {
            Some((name, fragment)) if name == self.root_name => format!("#{fragment}"),
            _ => canonical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Schema;
    use crate::parsers::parse_document;

    const ROOT: &str = "openapi: 3.1.0
paths:
  /test:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                properties:
                  PropC:
                    $ref: 'defs.yaml#/PropC'
                  Gone:
                    $ref: 'missing.yaml#/Gone'
components:
  schemas:
    Local:
      type: string
";

    const DEFS: &str = "PropC:
  description: from defs
  properties:
    inner:
      $ref: '#/Inner'
    back:
      $ref: 'openapi.yaml#/components/schemas/Local'
Inner:
  type: integer
";

    #[test]
    fn test_loads_transitively() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::write(tmp.path().join("openapi.yaml"), ROOT).unwrap();
        std::fs::write(tmp.path().join("defs.yaml"), DEFS).unwrap();
        let parsed = parse_document(&tmp.path().join("openapi.yaml")).unwrap();
        let catalogue = &parsed.catalogue;
        assert_eq!(catalogue.len(), 2);
        assert!(catalogue.file("defs.yaml").is_some());
        assert!(catalogue.file("missing.yaml").is_none());

        let resolver = parsed.resolver();
        let prop = resolver.lookup::<Schema>("defs.yaml#/PropC").unwrap();
        assert_eq!(prop.description.as_deref(), Some("from defs"));
        assert_eq!(
            prop.properties["inner"].reference.as_deref(),
            Some("defs.yaml#/Inner")
        );
        assert_eq!(
            prop.properties["back"].reference.as_deref(),
            Some("#/components/schemas/Local")
        );
        assert!(resolver.lookup::<Schema>("defs.yaml#/Inner").is_some());
    }

    #[test]
    fn test_string_documents_have_no_catalogue() {
        let parsed = crate::parsers::parse_document_str(ROOT).unwrap();
        assert!(parsed.catalogue.is_empty());
    }
}
