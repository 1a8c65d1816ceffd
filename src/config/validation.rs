//! Configuration validation for oas-changes.

use super::types::{AppConfig, BehaviorConfig, OutputConfig};
use crate::changes::DistributionConfig;
use crate::reports::RenderConfig;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.distribution.validate());
        errors.extend(self.report.validate());
        errors.extend(self.output.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

impl Validatable for DistributionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.channel_capacity == 0 {
            errors.push(ConfigError::new(
                "distribution.channel_capacity",
                "Channel capacity must be at least 1",
            ));
        }
        if self.max_replay_rounds == 0 {
            errors.push(ConfigError::new(
                "distribution.max_replay_rounds",
                "At least one replay round is required to follow references",
            ));
        }
        errors
    }
}

impl Validatable for RenderConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.breaking_badge.trim().is_empty() {
            errors.push(ConfigError::new("report.breaking_badge", "Badge text must not be empty"));
        }
        if self.breaking_badge.contains('\n') {
            errors.push(ConfigError::new(
                "report.breaking_badge",
                "Badge text must fit on one line",
            ));
        }
        let is_class = |s: &str| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if !is_class(&self.breaking_class) {
            errors.push(ConfigError::new(
                "report.breaking_class",
                format!("Invalid CSS class '{}'", self.breaking_class),
            ));
        }
        if !is_class(&self.html.heading_class) {
            errors.push(ConfigError::new(
                "report.html.heading_class",
                format!("Invalid CSS class '{}'", self.html.heading_class),
            ));
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError::new(
                        "output.file",
                        format!("Parent directory does not exist: {}", parent.display()),
                    ));
                }
            }
        }

        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = AppConfig::default();
        config.distribution.channel_capacity = 0;
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "distribution.channel_capacity");
    }

    #[test]
    fn test_render_config_classes() {
        let mut config = RenderConfig::default();
        config.breaking_class = "bad class\"".to_string();
        config.breaking_badge = String::new();
        let fields: Vec<_> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["report.breaking_badge", "report.breaking_class"]);
    }

    #[test]
    fn test_missing_output_parent() {
        let config = OutputConfig {
            file: Some("/nonexistent/dir/report.md".into()),
            ..OutputConfig::default()
        };
        assert!(!config.is_valid());
    }
}
