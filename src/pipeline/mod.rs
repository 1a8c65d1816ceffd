//! Pipeline orchestration for document comparisons.
//!
//! Shared load → diff → distribute → report logic used by the binary.

mod diff_stage;
mod output;
mod parse;
mod report_stage;

pub use diff_stage::{compare_documents, compare_files, Comparison};
pub use output::{write_output, OutputTarget};
pub use parse::load_document;
pub use report_stage::{output_report, render_report};

use crate::config::BehaviorConfig;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Success - no changes detected (or the failing flags are off)
    pub const SUCCESS: i32 = 0;
    /// Changes were detected
    pub const CHANGES_DETECTED: i32 = 1;
    /// Breaking changes were detected
    pub const BREAKING_CHANGES: i32 = 2;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Exit code of a finished comparison.
///
/// Breaking changes take precedence over plain changes. Each code is only
/// returned when its failing flag is set.
#[must_use]
pub fn exit_code(comparison: &Comparison, behavior: &BehaviorConfig) -> i32 {
    if behavior.fail_on_breaking && comparison.has_breaking() {
        exit_codes::BREAKING_CHANGES
    } else if behavior.fail_on_change && comparison.has_changes() {
        exit_codes::CHANGES_DETECTED
    } else {
        exit_codes::SUCCESS
    }
}
