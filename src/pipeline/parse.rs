//! Document loading stage.

use crate::error::{ErrorContext, Result};
use crate::parsers::{parse_document, ParsedDocument};
use std::path::Path;

/// Load and parse an OpenAPI document with the path in any error.
pub fn load_document(path: &Path, quiet: bool) -> Result<ParsedDocument> {
    if !quiet {
        tracing::info!("Parsing document: {}", path.display());
    }

    let parsed = parse_document(path).with_context(|| format!("loading {}", path.display()))?;

    tracing::debug!(
        format = parsed.format.fence(),
        lines = parsed.raw.lines().count(),
        "Parsed {}",
        path.display()
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_document_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("api.yaml");
        std::fs::write(&path, "openapi: 3.1.0\ninfo:\n  title: pets\n  version: '1'\npaths: {}\n")
            .unwrap();
        let parsed = load_document(&path, true).unwrap();
        assert_eq!(parsed.format.fence(), "yaml");
    }

    #[test]
    fn test_load_document_missing_file_names_path() {
        let err = load_document(Path::new("/nonexistent/api.yaml"), true).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/api.yaml"), "{err}");
    }
}
