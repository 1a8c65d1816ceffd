//! Report type definitions.

use clap::ValueEnum;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable Markdown
    #[default]
    Markdown,
    /// Standalone HTML page
    Html,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Markdown => write!(f, "markdown"),
            ReportFormat::Html => write!(f, "html"),
        }
    }
}

/// How the HTML converter keeps fenced blocks inside list items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NestedListStrategy {
    /// Keep the block inside the open list item
    #[default]
    Inline,
    /// Close the list, emit the block, then reopen the list
    Extract,
}

/// HTML rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HtmlOptions {
    /// CSS class added to every heading
    pub heading_class: String,
    pub nested_list_fix: bool,
    /// Pass HTML found in the Markdown through unescaped
    pub allow_raw_html: bool,
    pub nested_list_strategy: NestedListStrategy,
    /// Prefix object headings with an icon
    pub object_icons: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            heading_class: "oas-heading".to_string(),
            nested_list_fix: true,
            allow_raw_html: false,
            nested_list_strategy: NestedListStrategy::Inline,
            object_icons: true,
        }
    }
}

/// Render configuration shared by both renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RenderConfig {
    /// Marker placed on its own line after a breaking change
    pub breaking_badge: String,
    /// CSS class of the badge in HTML output
    pub breaking_class: String,
    pub html: HtmlOptions,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            breaking_badge: "💔 breaking".to_string(),
            breaking_class: "breaking".to_string(),
            html: HtmlOptions::default(),
        }
    }
}

/// Metadata included in reports
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Original document path
    pub left_path: Option<String>,
    /// Modified document path
    pub right_path: Option<String>,
    /// Tool version
    pub tool_version: String,
    /// Generation timestamp (RFC 3339)
    pub generated_at: Option<String>,
}

impl ReportMetadata {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_paths(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_path = Some(left.into());
        self.right_path = Some(right.into());
        self
    }

    /// Stamp with the current time.
    #[must_use]
    pub fn stamped(mut self) -> Self {
        self.generated_at = Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
        self
    }
}
