//! OpenAPI document loading.
//!
//! Documents are read as YAML or JSON (auto-detected), converted to a
//! `serde_json::Value` with keys in document order and then into the typed
//! [`Document`] model. A [`SourceMap`] of line/column positions is built
//! alongside so that diffs can carry source coordinates.
//!
//! Documents read from disk also load the files their relative `$ref`s
//! name into a [`Catalogue`], see [`load_catalogue`].
//!
//! ## Usage
//!
//! ```no_run
//! use oas_changes::parsers::{parse_document, detect_format};
//! use std::path::Path;
//!
//! let parsed = parse_document(Path::new("petstore.yaml")).unwrap();
//! println!("{} ({})", parsed.document.openapi, parsed.format);
//!
//! let content = std::fs::read_to_string("petstore.yaml").unwrap();
//! let detection = detect_format(&content);
//! println!("declared version: {:?}", detection.version);
//! ```

mod detection;
pub mod locator;
mod references;
mod traits;

pub use detection::{detect_format, DetectionResult, SUPPORTED_MAJOR};
pub use locator::{Position, SourceMap};
pub use references::load_catalogue;
pub use traits::{ParseError, SourceFormat};

use crate::model::{Catalogue, Document, Resolver};
use serde_json::Value;
use std::path::Path;

/// Maximum document size (64 MB).
const MAX_DOCUMENT_SIZE: u64 = 64 * 1024 * 1024;

/// A loaded document with its raw source.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: Document,
    /// Raw bytes as read, used for report context.
    pub raw: String,
    pub format: SourceFormat,
    pub source_map: SourceMap,
    /// Objects loaded from files named by relative references
    pub catalogue: Catalogue,
}

impl ParsedDocument {
    /// Resolver over the document and its catalogue.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.document).with_catalogue(&self.catalogue)
    }
}

/// Read and parse a document from disk, with the files it references.
///
/// Returns an error if the file exceeds [`MAX_DOCUMENT_SIZE`].
pub fn parse_document(path: &Path) -> Result<ParsedDocument, ParseError> {
    let content = read_limited(path)?;
    let mut parsed = parse_document_str(&content)?;
    parsed.catalogue = load_catalogue(path, &parsed.document);
    Ok(parsed)
}

fn read_limited(path: &Path) -> Result<String, ParseError> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(ParseError::IoError(format!(
            "document is {} MB, exceeding the {} MB limit",
            metadata.len() / (1024 * 1024),
            MAX_DOCUMENT_SIZE / (1024 * 1024),
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Parse a document from string content.
pub fn parse_document_str(content: &str) -> Result<ParsedDocument, ParseError> {
    if content.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let detection = detect_format(content);
    if detection.legacy_swagger {
        return Err(ParseError::UnsupportedVersion("swagger 2.0".to_string()));
    }

    let (value, source_map) = parse_value(content, detection.format)?;
    let document = document_from_value(value)?;
    tracing::debug!(
        format = %detection.format,
        version = %document.openapi,
        locations = source_map.len(),
        "parsed document"
    );

    Ok(ParsedDocument {
        document,
        raw: content.to_string(),
        format: detection.format,
        source_map,
        catalogue: Catalogue::default(),
    })
}

fn parse_value(content: &str, format: SourceFormat) -> Result<(Value, SourceMap), ParseError> {
    Ok(match format {
        SourceFormat::Json => {
            let value: Value = serde_json::from_str(content)?;
            let map = SourceMap::from_json_value(&value);
            (value, map)
        }
        SourceFormat::Yaml => {
            let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
            (yaml_to_json(yaml), SourceMap::from_yaml(content))
        }
    })
}

fn document_from_value(mut value: Value) -> Result<Document, ParseError> {
    let Value::Object(root) = &mut value else {
        return Err(ParseError::UnknownFormat(
            "top level is not a mapping".to_string(),
        ));
    };
    let version = match root.get("openapi") {
        Some(Value::String(v)) => v.clone(),
        Some(other) => other.to_string(),
        None => return Err(ParseError::UnknownFormat("missing `openapi` field".to_string())),
    };
    if !version.trim().starts_with(&format!("{SUPPORTED_MAJOR}.")) {
        return Err(ParseError::UnsupportedVersion(version));
    }
    // numeric YAML versions (`openapi: 3.0`) are normalised to strings
    root.insert("openapi".to_string(), Value::String(version));
    serde_json::from_value(value).map_err(|e| ParseError::InvalidStructure(e.to_string()))
}

/// Convert a YAML value to JSON, stringifying non-string mapping keys
/// (`200:` becomes `"200"`).
#[must_use]
pub fn yaml_to_json(value: serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(k), yaml_to_json(v)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    use serde_yaml::Value as Yaml;
    match key {
        Yaml::String(s) => s,
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_with_numeric_codes() {
        let content = "openapi: 3.0.3
info:
  title: chip
  version: '1'
paths:
  /pets:
    get:
      responses:
        200:
          description: ok
";
        let parsed = parse_document_str(content).unwrap();
        assert_eq!(parsed.format, SourceFormat::Yaml);
        let op = parsed.document.paths.as_ref().unwrap().items["/pets"]
            .get
            .as_ref()
            .unwrap();
        assert!(op.responses.as_ref().unwrap().codes.contains_key("200"));
        assert!(parsed
            .source_map
            .get("/paths/~1pets/get/responses/200/description")
            .is_some());
    }

    #[test]
    fn test_parse_json() {
        let content = r#"{"openapi": "3.1.0", "info": {"title": "chip", "version": "1"}}"#;
        let parsed = parse_document_str(content).unwrap();
        assert_eq!(parsed.format, SourceFormat::Json);
        assert_eq!(
            parsed.document.info.as_ref().and_then(|i| i.title.as_deref()),
            Some("chip")
        );
        assert_eq!(parsed.source_map.get("/info/title").map(|p| p.line), Some(4));
    }

    #[test]
    fn test_rejects_swagger() {
        let err = parse_document_str("swagger: '2.0'\ninfo: {}\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_rejects_non_openapi() {
        let err = parse_document_str("title: nope\n").unwrap_err();
        assert!(matches!(err, ParseError::UnknownFormat(_)));
        assert!(matches!(parse_document_str("  \n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_numeric_version_is_accepted() {
        let parsed = parse_document_str("openapi: 3.0\ninfo:\n  title: t\n").unwrap();
        assert_eq!(parsed.document.openapi, "3.0");
    }
}
