//! Parser error types and source format tags.

use crate::error::{OasChangesError, ParseErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading an OpenAPI document
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("YAML parse error: {0}")]
    YamlError(String),

    #[error("Document does not match the OpenAPI model: {0}")]
    InvalidStructure(String),

    #[error("Unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("Not an OpenAPI document: {0}")]
    UnknownFormat(String),

    #[error("Document is empty")]
    Empty,
}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::YamlError(err.to_string())
    }
}

impl From<ParseError> for OasChangesError {
    fn from(err: ParseError) -> Self {
        let kind = match err {
            ParseError::IoError(msg) => {
                return Self::Io {
                    path: None,
                    message: msg.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, msg),
                }
            }
            ParseError::JsonError(msg) => ParseErrorKind::InvalidJson(msg),
            ParseError::YamlError(msg) => ParseErrorKind::InvalidYaml(msg),
            ParseError::InvalidStructure(msg) => ParseErrorKind::InvalidModel(msg),
            ParseError::UnsupportedVersion(version) => ParseErrorKind::UnsupportedVersion {
                version,
                supported: "3.0, 3.1".to_string(),
            },
            ParseError::UnknownFormat(msg) => ParseErrorKind::NotOpenApi(msg),
            ParseError::Empty => ParseErrorKind::EmptyDocument,
        };
        Self::parse("loading document", kind)
    }
}

/// Serialization the document was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Yaml,
    Json,
}

impl SourceFormat {
    /// Code fence language for values quoted from this source.
    #[must_use]
    pub const fn fence(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// JSON when the first non-whitespace character opens an object or array.
    #[must_use]
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{' | '[') => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Yaml => write!(f, "YAML"),
            Self::Json => write!(f, "JSON"),
        }
    }
}
