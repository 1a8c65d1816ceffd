//! Default configurations and presets for oas-changes.

use super::types::{AppConfig, BehaviorConfig, OutputConfig};
use crate::changes::DistributionConfig;
use crate::reports::RenderConfig;

/// Default bound of the change channel per traversal pass.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default cap on reference replay rounds.
pub const DEFAULT_MAX_REPLAY_ROUNDS: usize = 64;

// ============================================================================
// Configuration Presets
// ============================================================================

/// Named configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Default settings suitable for most cases
    Default,
    /// CI: fail on breaking changes, quiet logging
    Ci,
    /// Strict: unknown object kinds are fatal, any change fails
    Strict,
}

impl ConfigPreset {
    /// Get the preset name as a string.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Ci => "ci",
            Self::Strict => "strict",
        }
    }

    /// Parse a preset from a string name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "default" => Some(Self::Default),
            "ci" | "ci-cd" | "pipeline" => Some(Self::Ci),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Get a description of this preset.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Default => "Markdown report on stdout, exit code reflects changes",
            Self::Ci => "Quiet logging and a failing exit code on breaking changes",
            Self::Strict => "Fatal on unknown object kinds and on any change",
        }
    }

    /// Get all available presets.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Default, Self::Ci, Self::Strict]
    }
}

impl std::fmt::Display for ConfigPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Preset Implementations
// ============================================================================

impl AppConfig {
    /// Create an `AppConfig` from a named preset.
    #[must_use]
    pub fn from_preset(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Default => Self::default(),
            ConfigPreset::Ci => Self::ci_preset(),
            ConfigPreset::Strict => Self::strict_preset(),
        }
    }

    /// CI preset.
    ///
    /// - Fail on breaking changes
    /// - Quiet logging
    #[must_use]
    pub fn ci_preset() -> Self {
        Self {
            distribution: DistributionConfig::default(),
            report: RenderConfig::default(),
            output: OutputConfig::default(),
            behavior: BehaviorConfig {
                fail_on_breaking: true,
                quiet: true,
                ..BehaviorConfig::default()
            },
        }
    }

    /// Strict preset.
    #[must_use]
    pub fn strict_preset() -> Self {
        Self {
            distribution: DistributionConfig {
                strict: true,
                ..DistributionConfig::default()
            },
            report: RenderConfig::default(),
            output: OutputConfig::default(),
            behavior: BehaviorConfig {
                fail_on_breaking: true,
                fail_on_change: true,
                ..BehaviorConfig::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names() {
        for preset in ConfigPreset::all() {
            assert_eq!(ConfigPreset::from_name(preset.name()), Some(*preset));
        }
        assert_eq!(ConfigPreset::from_name("CI"), Some(ConfigPreset::Ci));
        assert_eq!(ConfigPreset::from_name("loose"), None);
    }

    #[test]
    fn test_presets_differ_from_default() {
        let ci = AppConfig::from_preset(ConfigPreset::Ci);
        assert!(ci.behavior.fail_on_breaking);
        assert!(!ci.distribution.strict);

        let strict = AppConfig::from_preset(ConfigPreset::Strict);
        assert!(strict.distribution.strict);
        assert!(strict.behavior.fail_on_change);

        let default = AppConfig::from_preset(ConfigPreset::Default);
        assert_eq!(default.distribution.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(default.distribution.max_replay_rounds, DEFAULT_MAX_REPLAY_ROUNDS);
    }
}
