//! Configuration module for oas-changes.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - Named presets for common use cases
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```
//! use oas_changes::config::{AppConfig, ConfigPreset};
//! use oas_changes::reports::ReportFormat;
//!
//! let config = AppConfig::from_preset(ConfigPreset::Ci);
//! assert!(config.behavior.fail_on_breaking);
//!
//! let config = AppConfig::builder()
//!     .output_format(ReportFormat::Html)
//!     .strict(true)
//!     .build();
//! assert!(config.distribution.strict);
//! ```
//!
//! # Configuration File
//!
//! Place a `.oas-changes.yaml` file in your project root or `~/.config/oas-changes/`:
//!
//! ```yaml
//! distribution:
//!   strict: true
//! report:
//!   breaking_badge: "⚠ breaking"
//! behavior:
//!   fail_on_breaking: true
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{ConfigPreset, DEFAULT_CHANNEL_CAPACITY, DEFAULT_MAX_REPLAY_ROUNDS};
pub use types::{AppConfig, AppConfigBuilder, BehaviorConfig, DiffPaths, OutputConfig};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, load_config_file, load_or_default,
    ConfigFileError,
};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.oas-changes.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_schema_lists_sections() {
        let schema = generate_json_schema().unwrap();
        for section in ["distribution", "report", "output", "behavior", "nested_list_strategy"] {
            assert!(schema.contains(section), "missing {section}");
        }
    }
}
