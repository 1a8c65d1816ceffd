//! Diff and distribution stage.
//!
//! Runs the property diff of two documents, then distributes the changes
//! onto the semantic graph of the right document.

use super::load_document;
use crate::changes::{DistributionResult, Session};
use crate::config::{AppConfig, DiffPaths};
use crate::diff::{Changes, DiffEngine};
use crate::error::Result;
use crate::graph::SemanticGraph;
use crate::parsers::ParsedDocument;

/// Both documents of a comparison and what the distribution produced.
#[derive(Debug)]
pub struct Comparison {
    pub left: ParsedDocument,
    pub right: ParsedDocument,
    pub result: DistributionResult,
    /// Set when the documents were loaded from disk
    pub paths: Option<DiffPaths>,
}

impl Comparison {
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.result.statistics.has_changes()
    }

    #[must_use]
    pub fn has_breaking(&self) -> bool {
        self.result.statistics.has_breaking()
    }
}

/// Diff two parsed documents and distribute the changes.
pub fn compare_documents(
    left: &ParsedDocument,
    right: &ParsedDocument,
    config: &AppConfig,
) -> Result<DistributionResult> {
    let quiet = config.behavior.quiet;
    if !quiet {
        tracing::info!("Computing property diff...");
    }

    let changes = DiffEngine::new()
        .follow_references(config.behavior.follow_references)
        .compare_extensions(config.behavior.compare_extensions)
        .compare(left, right);
    tracing::debug!(
        total = changes.total(),
        breaking = changes.breaking(),
        "Property diff complete"
    );

    let mut graph = SemanticGraph::from_parsed(right);
    let mut session = Session::new(config.distribution.clone());
    let mut result = session.distribute(&mut graph, &changes)?;

    let left_graph = SemanticGraph::from_parsed(left);
    let transferred = result.transfer_rule_results(&left_graph);
    if transferred > 0 {
        tracing::debug!(transferred, "Transferred rule results");
    }

    if !quiet {
        tracing::info!(
            "Distribution complete: {} changes ({} breaking) across {} nodes",
            result.statistics.total,
            result.statistics.breaking,
            result.changed_nodes.len()
        );
    }
    Ok(result)
}

/// Load both documents from disk and compare them.
pub fn compare_files(paths: &DiffPaths, config: &AppConfig) -> Result<Comparison> {
    let quiet = config.behavior.quiet;
    let left = load_document(&paths.left, quiet)?;
    let right = load_document(&paths.right, quiet)?;
    let result = compare_documents(&left, &right, config)?;
    Ok(Comparison {
        left,
        right,
        result,
        paths: Some(paths.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_document_str;

    const LEFT: &str = "openapi: 3.1.0
info:
  title: pets
  version: '1'
paths: {}
";

    #[test]
    fn test_compare_documents_title_change() {
        let left = parse_document_str(LEFT).unwrap();
        let right = parse_document_str(&LEFT.replace("title: pets", "title: cats")).unwrap();
        let config = AppConfig::default();
        let result = compare_documents(&left, &right, &config).unwrap();
        assert_eq!(result.statistics.total, 1);
        assert_eq!(result.statistics.modifications, 1);
        assert!(!result.statistics.has_breaking());
    }

    #[test]
    fn test_compare_identical_documents() {
        let left = parse_document_str(LEFT).unwrap();
        let right = parse_document_str(LEFT).unwrap();
        let result = compare_documents(&left, &right, &AppConfig::default()).unwrap();
        assert!(result.is_empty());
        assert!(result.changed_nodes.is_empty());
    }
}
