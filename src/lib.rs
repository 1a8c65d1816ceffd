//! **Structural what-changed reports for OpenAPI 3.x documents.**
//!
//! `oas-changes` compares two versions of an OpenAPI document and explains
//! the difference in terms of the document's own structure: every property
//! change is attached to the node of the semantic tree it belongs to, and a
//! change to a shared `$ref` definition is shown at each place that uses it,
//! once.
//!
//! ## Core Concepts & Modules
//!
//! - **[`parsers`]**: Loads YAML or JSON documents into the typed [`model`],
//!   recording the line and column of every node.
//! - **[`diff`]**: Home of the [`DiffEngine`], which produces a
//!   [`DocumentChanges`] tree of property diffs grouped by object kind.
//! - **[`graph`]**: The [`SemanticGraph`] of a document: one node per object,
//!   structural edges and reference edges.
//! - **[`changes`]**: The distribution [`Session`], which walks the change
//!   tree and the graph together, follows references, removes duplicates
//!   and prunes the result to the branches that changed.
//! - **[`reports`]**: Markdown and HTML renderers.
//! - **[`pipeline`]**: Load → diff → distribute → report in one call.
//!
//! ## Getting Started
//!
//! ```
//! use oas_changes::config::AppConfig;
//! use oas_changes::parsers::parse_document_str;
//! use oas_changes::pipeline::compare_documents;
//! use oas_changes::reports::{render_markdown, RenderConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let left = parse_document_str("openapi: 3.1.0\ninfo:\n  title: pets\n  version: '1'\n")?;
//!     let right = parse_document_str("openapi: 3.1.0\ninfo:\n  title: cats\n  version: '1'\n")?;
//!
//!     let result = compare_documents(&left, &right, &AppConfig::default())?;
//!     assert_eq!(result.statistics.modifications, 1);
//!
//!     let report = render_markdown(&result, &right.raw, &RenderConfig::default())?;
//!     assert!(report.starts_with("# What Changed Report"));
//!     Ok(())
//! }
//! ```
//!
//! ## Command-Line Interface (CLI)
//!
//! This documentation is for the library crate. The `oas-changes` binary
//! wraps [`pipeline`] with `diff` and `config-schema` commands.

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools,
    // Variable names like `left`/`right` or `original`/`new` are clear in context
    clippy::similar_names
)]

pub mod changes;
pub mod config;
pub mod diff;
pub mod error;
pub mod graph;
pub mod model;
pub mod parsers;
pub mod pipeline;
pub mod reports;
pub mod utils;

// Re-export main types for convenience
pub use changes::{DistributionConfig, DistributionResult, Session};
pub use config::{AppConfig, AppConfigBuilder, BehaviorConfig, ConfigPreset, OutputConfig};
pub use config::{ConfigError, Validatable};
pub use diff::{ChangeKind, Changes, Diff, DiffEngine, DocumentChanges};
pub use error::{ErrorContext, OasChangesError, OptionContext, Result};
pub use graph::SemanticGraph;
pub use model::{Document, ObjectKind};
pub use parsers::{parse_document, parse_document_str, ParsedDocument};
pub use reports::{ReportFormat, ReportGenerator};
