//! Configuration types for oas-changes operations.

use crate::changes::DistributionConfig;
use crate::reports::{RenderConfig, ReportFormat};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// Aggregates every configurable section. CLI flags are layered over a
/// loaded file with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Change distribution settings
    pub distribution: DistributionConfig,
    /// Report rendering (badge, HTML options)
    pub report: RenderConfig,
    /// Output configuration (format, file)
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the output format.
    pub fn output_format(mut self, format: ReportFormat) -> Self {
        self.config.output.format = format;
        self
    }

    /// Set the output file.
    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    /// Include paths and a timestamp in the report header.
    pub fn include_metadata(mut self, include: bool) -> Self {
        self.config.output.include_metadata = include;
        self
    }

    /// Fail on object kinds without a visit rule.
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.distribution.strict = strict;
        self
    }

    /// Walk path items on worker threads.
    pub fn parallel_paths(mut self, parallel: bool) -> Self {
        self.config.distribution.parallel_paths = parallel;
        self
    }

    /// Set the breaking-change badge text.
    pub fn breaking_badge(mut self, badge: impl Into<String>) -> Self {
        self.config.report.breaking_badge = badge.into();
        self
    }

    /// Enable fail-on-breaking mode.
    pub fn fail_on_breaking(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_breaking = fail;
        self
    }

    /// Enable fail-on-change mode.
    pub fn fail_on_change(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_change = fail;
        self
    }

    /// Enable quiet mode.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Section Configurations
// ============================================================================

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Report format
    pub format: ReportFormat,
    /// Output file path (stdout when unset)
    pub file: Option<PathBuf>,
    /// Write compared paths and a generation timestamp into the report
    pub include_metadata: bool,
}

/// Behavior flags controlling exit codes and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Exit with code 2 when a breaking change is found
    pub fail_on_breaking: bool,
    /// Exit with code 1 when any change is found
    pub fail_on_change: bool,
    /// Suppress informational logging
    pub quiet: bool,
    /// Resolve `$ref` stubs while diffing
    pub follow_references: bool,
    /// Compare `x-` extensions
    pub compare_extensions: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            fail_on_breaking: false,
            fail_on_change: false,
            quiet: false,
            follow_references: true,
            compare_extensions: true,
        }
    }
}

/// Paths of the two compared documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPaths {
    /// Original document
    pub left: PathBuf,
    /// Modified document
    pub right: PathBuf,
}

impl DiffPaths {
    #[must_use]
    pub fn new(left: impl Into<PathBuf>, right: impl Into<PathBuf>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_sections() {
        let config = AppConfig::builder()
            .output_format(ReportFormat::Html)
            .strict(true)
            .fail_on_breaking(true)
            .breaking_badge("BREAKING")
            .build();
        assert_eq!(config.output.format, ReportFormat::Html);
        assert!(config.distribution.strict);
        assert!(config.behavior.fail_on_breaking);
        assert_eq!(config.report.breaking_badge, "BREAKING");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("output:\n  format: html\n").unwrap();
        assert_eq!(config.output.format, ReportFormat::Html);
        assert_eq!(config.distribution.channel_capacity, 256);
        assert!(config.behavior.compare_extensions);
    }
}
