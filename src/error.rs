//! Unified error types for oas-changes.
//!
//! This module provides the error hierarchy for the library, with context
//! chaining for debugging and user-friendly messages.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oas-changes operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OasChangesError {
    /// Errors while loading an OpenAPI document
    #[error("Failed to parse document: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseErrorKind,
    },

    /// Errors while distributing changes onto the semantic tree
    #[error("Change distribution failed: {context}")]
    Distribution {
        context: String,
        #[source]
        source: DistributionErrorKind,
    },

    /// Errors during report generation
    #[error("Report generation failed: {context}")]
    Report {
        context: String,
        #[source]
        source: ReportErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific parse error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("Not an OpenAPI 3.x document: {0}")]
    NotOpenApi(String),

    #[error("Unsupported OpenAPI version: {version} (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    #[error("Invalid JSON structure: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML structure: {0}")]
    InvalidYaml(String),

    #[error("Document does not match the OpenAPI model: {0}")]
    InvalidModel(String),
}

/// Specific distribution error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DistributionErrorKind {
    #[error("Distribution was cancelled")]
    Cancelled,

    #[error("No visit rule for {kind} with a {group} change group")]
    UnhandledKind { kind: String, group: String },

    #[error("Traversal worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("Reference replay did not converge after {0} rounds")]
    ReplayLimit(usize),
}

/// Specific report error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReportErrorKind {
    #[error("Markdown rendering failed: {0}")]
    Markdown(String),

    #[error("HTML rendering failed: {0}")]
    Html(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for oas-changes operations
pub type Result<T> = std::result::Result<T, OasChangesError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl OasChangesError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseErrorKind) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error for a document that is not OpenAPI
    pub fn not_openapi(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::parse(
            format!("at {}", path.into()),
            ParseErrorKind::NotOpenApi(reason.into()),
        )
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a distribution error
    pub fn distribution(context: impl Into<String>, source: DistributionErrorKind) -> Self {
        Self::Distribution {
            context: context.into(),
            source,
        }
    }

    /// Create a cancellation error
    pub fn cancelled(context: impl Into<String>) -> Self {
        Self::distribution(context, DistributionErrorKind::Cancelled)
    }

    /// Create a report error
    pub fn report(context: impl Into<String>, source: ReportErrorKind) -> Self {
        Self::Report {
            context: context.into(),
            source,
        }
    }

    /// Whether this error is a cancelled distribution.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Distribution {
                source: DistributionErrorKind::Cancelled,
                ..
            }
        )
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for OasChangesError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for OasChangesError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(
            "JSON deserialization",
            ParseErrorKind::InvalidJson(err.to_string()),
        )
    }
}

impl From<serde_yaml::Error> for OasChangesError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::parse(
            "YAML deserialization",
            ParseErrorKind::InvalidYaml(err.to_string()),
        )
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// This trait provides methods to add context information to errors,
/// creating a chain of context that helps trace the source of problems.
///
/// # Example
///
/// ```ignore
/// use oas_changes::error::ErrorContext;
///
/// fn load(path: &Path) -> Result<ParsedDocument> {
///     let content = std::fs::read_to_string(path)
///         .context("reading document")?;
///
///     parse_document(&content)
///         .with_context(|| format!("parsing {}", path.display()))
/// }
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    ///
    /// The context string is prepended to the error's existing context,
    /// creating a chain that shows the path through the code.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<OasChangesError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: OasChangesError, new_ctx: &str) -> OasChangesError {
    match err {
        OasChangesError::Parse {
            context: existing,
            source,
        } => OasChangesError::Parse {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OasChangesError::Distribution {
            context: existing,
            source,
        } => OasChangesError::Distribution {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OasChangesError::Report {
            context: existing,
            source,
        } => OasChangesError::Report {
            context: chain_context(new_ctx, &existing),
            source,
        },
        OasChangesError::Io {
            path,
            message,
            source,
        } => OasChangesError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        OasChangesError::Config(msg) => OasChangesError::Config(chain_context(new_ctx, &msg)),
        OasChangesError::Validation(msg) => {
            OasChangesError::Validation(chain_context(new_ctx, &msg))
        }
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;

    /// Convert None to an error with context from a closure.
    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| OasChangesError::Validation(context.into()))
    }

    fn with_context_none<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.ok_or_else(|| OasChangesError::Validation(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ParseError;

    #[test]
    fn test_error_display() {
        let err = OasChangesError::not_openapi("petstore.yaml", "missing `openapi` field");
        let display = err.to_string();
        assert!(
            display.contains("parse") && display.contains("petstore.yaml"),
            "Error message should mention parsing and the file: {}",
            display
        );
    }

    #[test]
    fn test_error_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = OasChangesError::io("/path/to/api.yaml", io_err);

        assert!(err.to_string().contains("/path/to/api.yaml"));
    }

    #[test]
    fn test_cancelled_is_detected() {
        assert!(OasChangesError::cancelled("pass one").is_cancelled());
        assert!(!OasChangesError::config("bad").is_cancelled());
    }

    #[test]
    fn test_context_chaining() {
        let initial_err: Result<()> = Err(OasChangesError::parse(
            "initial context",
            ParseErrorKind::EmptyDocument,
        ));

        let err_with_context = initial_err.context("outer context");

        match err_with_context {
            Err(OasChangesError::Parse { context, .. }) => {
                assert!(context.contains("outer context"), "{}", context);
                assert!(context.contains("initial context"), "{}", context);
            }
            _ => panic!("Expected Parse error"),
        }
    }

    #[test]
    fn test_context_chaining_multiple_levels() {
        fn inner() -> Result<()> {
            Err(OasChangesError::cancelled("base"))
        }

        fn middle() -> Result<()> {
            inner().context("middle layer")
        }

        fn outer() -> Result<()> {
            middle().context("outer layer")
        }

        match outer() {
            Err(OasChangesError::Distribution { context, .. }) => {
                assert_eq!(context, "outer layer: middle layer: base");
            }
            _ => panic!("Expected Distribution error"),
        }
    }

    #[test]
    fn test_parse_error_conversion() {
        let err: OasChangesError = ParseError::UnsupportedVersion("2.0".to_string()).into();
        match err {
            OasChangesError::Parse {
                source: ParseErrorKind::UnsupportedVersion { version, .. },
                ..
            } => assert_eq!(version, "2.0"),
            other => panic!("Expected Parse error, got {other:?}"),
        }

        let err: OasChangesError = ParseError::IoError("gone".to_string()).into();
        assert!(matches!(err, OasChangesError::Io { .. }));
    }

    #[test]
    fn test_option_context() {
        let some_value: Option<i32> = Some(42);
        assert_eq!(some_value.context_none("missing value").ok(), Some(42));

        let none_value: Option<i32> = None;
        match none_value.context_none("missing value") {
            Err(OasChangesError::Validation(msg)) => assert_eq!(msg, "missing value"),
            _ => panic!("Expected Validation error"),
        }
    }
}
