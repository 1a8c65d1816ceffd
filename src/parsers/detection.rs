//! Lightweight OpenAPI detection before a full parse.
//!
//! Looks at the first kilobytes of a document for the `openapi` (or the
//! legacy `swagger`) version marker without building the model.

use super::traits::SourceFormat;

/// Bytes inspected when looking for a version marker.
const SNIFF_WINDOW: usize = 8 * 1024;

/// Versions this crate compares.
pub const SUPPORTED_MAJOR: u32 = 3;

/// Result of format detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// Serialization of the content.
    pub format: SourceFormat,
    /// Value of the `openapi` field if found.
    pub version: Option<String>,
    /// `swagger: 2.0` documents are recognised but not supported.
    pub legacy_swagger: bool,
    /// Any warnings about the detection.
    pub warnings: Vec<String>,
}

impl DetectionResult {
    /// Whether the content declares a supported OpenAPI version.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version
            .as_deref()
            .and_then(|v| v.split('.').next())
            .and_then(|major| major.trim().parse::<u32>().ok())
            == Some(SUPPORTED_MAJOR)
    }
}

/// Detect serialization and declared version.
#[must_use]
pub fn detect_format(content: &str) -> DetectionResult {
    let format = SourceFormat::sniff(content);
    let window = head(content, SNIFF_WINDOW);
    let version = find_marker(window, "openapi", format);
    let legacy_swagger = version.is_none() && find_marker(window, "swagger", format).is_some();

    let mut warnings = Vec::new();
    if version.is_none() && !legacy_swagger {
        warnings.push("no `openapi` version marker near the start of the document".to_string());
    }

    DetectionResult {
        format,
        version,
        legacy_swagger,
        warnings,
    }
}

fn head(content: &str, limit: usize) -> &str {
    if content.len() <= limit {
        return content;
    }
    let mut end = limit;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

/// Find a top-level `key: value` (YAML) or `"key": "value"` (JSON) marker.
fn find_marker(window: &str, key: &str, format: SourceFormat) -> Option<String> {
    match format {
        SourceFormat::Json => {
            let needle = format!("\"{key}\"");
            let start = window.find(&needle)? + needle.len();
            let rest = window[start..].trim_start().strip_prefix(':')?.trim_start();
            let rest = rest.strip_prefix('"')?;
            let end = rest.find('"')?;
            Some(rest[..end].to_string())
        }
        SourceFormat::Yaml => window.lines().find_map(|line| {
            let value = line.strip_prefix(key)?.trim_start().strip_prefix(':')?;
            let value = value.split('#').next().unwrap_or_default().trim();
            let value = value.trim_matches(|c| c == '"' || c == '\'');
            (!value.is_empty()).then(|| value.to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_yaml() {
        let result = detect_format("openapi: 3.1.0\ninfo:\n  title: chip\n");
        assert_eq!(result.format, SourceFormat::Yaml);
        assert_eq!(result.version.as_deref(), Some("3.1.0"));
        assert!(result.is_supported());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_detect_quoted_yaml_version() {
        let result = detect_format("# api\nopenapi: '3.0.3'\n");
        assert_eq!(result.version.as_deref(), Some("3.0.3"));
    }

    #[test]
    fn test_detect_json() {
        let result = detect_format(r#"  {"openapi": "3.0.1", "info": {}}"#);
        assert_eq!(result.format, SourceFormat::Json);
        assert_eq!(result.version.as_deref(), Some("3.0.1"));
    }

    #[test]
    fn test_detect_swagger() {
        let result = detect_format("swagger: \"2.0\"\n");
        assert!(result.legacy_swagger);
        assert!(!result.is_supported());
    }

    #[test]
    fn test_detect_unknown() {
        let result = detect_format("title: nothing here\n");
        assert!(result.version.is_none());
        assert!(!result.warnings.is_empty());
    }
}
