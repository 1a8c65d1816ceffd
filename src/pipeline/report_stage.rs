//! Report output stage.

use super::{write_output, Comparison, OutputTarget};
use crate::config::AppConfig;
use crate::reports::{create_reporter, ReportError, ReportInput, ReportMetadata};
use anyhow::Result;

/// Render the report for a comparison in the configured format.
pub fn render_report(comparison: &Comparison, config: &AppConfig) -> Result<String, ReportError> {
    let metadata = config.output.include_metadata.then(|| {
        let meta = ReportMetadata::new();
        let meta = match &comparison.paths {
            Some(paths) => meta.with_paths(
                paths.left.to_string_lossy(),
                paths.right.to_string_lossy(),
            ),
            None => meta,
        };
        meta.stamped()
    });

    let mut input = ReportInput::new(&comparison.result, &comparison.right.raw);
    if let Some(meta) = &metadata {
        input = input.with_metadata(meta);
    }
    create_reporter(config.output.format).generate(&input, &config.report)
}

/// Output a report to the configured destination.
pub fn output_report(comparison: &Comparison, config: &AppConfig) -> Result<()> {
    let target = OutputTarget::from_option(config.output.file.clone());
    let report = render_report(comparison, config)?;
    write_output(&report, &target, config.behavior.quiet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffPaths;
    use crate::parsers::parse_document_str;
    use crate::pipeline::compare_documents;
    use crate::reports::ReportFormat;

    fn comparison(config: &AppConfig) -> Comparison {
        let left = parse_document_str("openapi: 3.1.0\ninfo:\n  title: pets\n  version: '1'\n").unwrap();
        let right = parse_document_str("openapi: 3.1.0\ninfo:\n  title: cats\n  version: '1'\n").unwrap();
        let result = compare_documents(&left, &right, config).unwrap();
        Comparison {
            left,
            right,
            result,
            paths: Some(DiffPaths::new("v1.yaml", "v2.yaml")),
        }
    }

    #[test]
    fn test_render_markdown_without_metadata() {
        let config = AppConfig::default();
        let report = render_report(&comparison(&config), &config).unwrap();
        assert!(report.starts_with("# What Changed Report\n"));
        assert!(!report.contains("v1.yaml"));
    }

    #[test]
    fn test_render_with_metadata() {
        let config = AppConfig::builder().include_metadata(true).build();
        let report = render_report(&comparison(&config), &config).unwrap();
        assert!(report.contains("Comparing `v1.yaml` with `v2.yaml`."));
        assert!(report.contains("_Generated by oas-changes"));
    }

    #[test]
    fn test_render_html() {
        let config = AppConfig::builder().output_format(ReportFormat::Html).build();
        let report = render_report(&comparison(&config), &config).unwrap();
        assert!(report.starts_with("<!DOCTYPE html>"));
        assert!(report.contains("What Changed Report"));
    }
}
