//! Report generation for distributed changes.
//!
//! Two output formats are provided:
//! - Markdown: the canonical report, walked from the pruned change tree
//! - HTML: the Markdown report converted into a standalone page
//!
//! # Security
//!
//! The `escape` module provides utilities for safe output generation.
//! Property names, keys and values come from the compared documents and
//! are escaped before they are embedded in Markdown or HTML.

pub mod context;
pub mod escape;
mod html;
mod markdown;
mod types;

pub use html::{HtmlConverter, HtmlReporter};
pub use markdown::{MarkdownReporter, EMPTY_REPORT, REPORT_TITLE};
pub use types::{HtmlOptions, NestedListStrategy, RenderConfig, ReportFormat, ReportMetadata};

use crate::changes::{ChangeNode, DistributionResult};
use crate::diff::DocumentChanges;
use crate::error::{OasChangesError, ReportErrorKind};
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

impl From<ReportError> for OasChangesError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::IoError(e) => Self::from(e),
            ReportError::ConfigError(msg) => Self::config(msg),
            ReportError::TemplateError(msg) => {
                Self::report("converting to HTML", ReportErrorKind::Html(msg))
            }
            other => Self::report("rendering report", ReportErrorKind::Markdown(other.to_string())),
        }
    }
}

/// Everything a reporter reads.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    /// The diff set with reference copies removed
    pub changes: &'a DocumentChanges,
    /// Pruned change tree, `None` when nothing changed
    pub tree: Option<&'a ChangeNode>,
    /// Raw text of the right document, quoted for context
    pub source: &'a str,
    pub metadata: Option<&'a ReportMetadata>,
}

impl<'a> ReportInput<'a> {
    #[must_use]
    pub fn new(result: &'a DistributionResult, source: &'a str) -> Self {
        Self {
            changes: &result.changes,
            tree: result.tree.as_ref(),
            source,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: &'a ReportMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render the report
    fn generate(&self, input: &ReportInput<'_>, config: &RenderConfig) -> Result<String, ReportError>;

    /// Write report to a writer
    fn write_to(
        &self,
        input: &ReportInput<'_>,
        config: &RenderConfig,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(input, config)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Markdown => Box::new(MarkdownReporter::new()),
        ReportFormat::Html => Box::new(HtmlReporter::new()),
    }
}

/// Render a distribution result as Markdown.
pub fn render_markdown(
    result: &DistributionResult,
    source: &str,
    config: &RenderConfig,
) -> Result<String, ReportError> {
    MarkdownReporter::new().generate(&ReportInput::new(result, source), config)
}

/// Render a distribution result as an HTML page.
pub fn render_html(
    result: &DistributionResult,
    source: &str,
    config: &RenderConfig,
) -> Result<String, ReportError> {
    HtmlReporter::new().generate(&ReportInput::new(result, source), config)
}
