//! Property-level diff records.

use crate::model::ObjectKind;
use crate::parsers::Position;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// Location hash of a diff without any source coordinates.
pub const UNKNOWN_LOCATION: &str = "0:0:0:0";

/// The five kinds of change a diff can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChangeKind {
    PropertyAdded,
    PropertyRemoved,
    ObjectAdded,
    ObjectRemoved,
    Modified,
}

impl ChangeKind {
    #[must_use]
    pub const fn is_addition(self) -> bool {
        matches!(self, Self::PropertyAdded | Self::ObjectAdded)
    }

    #[must_use]
    pub const fn is_removal(self) -> bool {
        matches!(self, Self::PropertyRemoved | Self::ObjectRemoved)
    }

    #[must_use]
    pub const fn is_modification(self) -> bool {
        matches!(self, Self::Modified)
    }

    /// Verb used in reports.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::PropertyAdded | Self::ObjectAdded => "added",
            Self::PropertyRemoved | Self::ObjectRemoved => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PropertyAdded => "PropertyAdded",
            Self::PropertyRemoved => "PropertyRemoved",
            Self::ObjectAdded => "ObjectAdded",
            Self::ObjectRemoved => "ObjectRemoved",
            Self::Modified => "Modified",
        };
        f.write_str(name)
    }
}

/// Source position of a diff in both documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub original_line: Option<usize>,
    pub original_column: Option<usize>,
    pub new_line: Option<usize>,
    pub new_column: Option<usize>,
}

impl Coordinates {
    #[must_use]
    pub fn new(original: Option<Position>, new: Option<Position>) -> Self {
        Self {
            original_line: original.map(|p| p.line),
            original_column: original.map(|p| p.column),
            new_line: new.map(|p| p.line),
            new_column: new.map(|p| p.column),
        }
    }

    /// `"{origLine}:{origCol}:{newLine}:{newCol}"`, zero for anything missing.
    #[must_use]
    pub fn location_hash(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.original_line.unwrap_or(0),
            self.original_column.unwrap_or(0),
            self.new_line.unwrap_or(0),
            self.new_column.unwrap_or(0)
        )
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.original_line.is_none()
            && self.original_column.is_none()
            && self.new_line.is_none()
            && self.new_column.is_none()
    }

    /// Line to quote context from: the new side when present.
    #[must_use]
    pub fn context_line(&self) -> Option<usize> {
        self.new_line.or(self.original_line)
    }
}

/// Identifies a subobject of a document by content hash and array position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectHandle {
    pub hash: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// Position of an added or removed map entry on the object owning the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    /// Map field of the owner; absent when the owner is the map itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub kind: ObjectKind,
}

/// One property-level difference between the original and the modified document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    pub property: String,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
    #[serde(default)]
    pub coordinates: Coordinates,
    pub breaking: bool,
    /// Node path the diff is attributed to.
    pub path: String,
    /// Type label of the object the diff is attributed to.
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_object: Option<ObjectHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_object: Option<ObjectHandle>,
    /// Set on map-entry additions and removals; the property is the key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<MapEntry>,
    /// File the coordinates point into, when not the root document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Diff {
    #[must_use]
    pub fn new(property: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            property: property.into(),
            kind,
            original: None,
            new: None,
            coordinates: Coordinates::default(),
            breaking: false,
            path: String::new(),
            object_type: String::new(),
            original_object: None,
            new_object: None,
            entry: None,
            source: None,
        }
    }

    #[must_use]
    pub fn values(mut self, original: Option<Value>, new: Option<Value>) -> Self {
        self.original = original;
        self.new = new;
        self
    }

    #[must_use]
    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = coordinates;
        self
    }

    #[must_use]
    pub fn breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    #[must_use]
    pub fn attributed(mut self, path: impl Into<String>, object_type: impl Into<String>) -> Self {
        self.path = path.into();
        self.object_type = object_type.into();
        self
    }

    #[must_use]
    pub fn sourced(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn location_hash(&self) -> String {
        self.coordinates.location_hash()
    }

    /// Ledger key: the location hash, qualified by the file for diffs
    /// located outside the root document.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        match &self.source {
            Some(file) => format!("{file}#{}", self.location_hash()),
            None => self.location_hash(),
        }
    }

    /// Hash over property, kind, values and (when known) new coordinates.
    ///
    /// Attribution fields are left out, so copies of one diff attached to
    /// different nodes hash equally.
    #[must_use]
    pub fn semantic_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.update(self.property.as_bytes());
        hasher.update(&[0]);
        hasher.update(self.kind.to_string().as_bytes());
        hasher.update(&[0]);
        for value in [&self.original, &self.new] {
            match value {
                Some(v) => hasher.update(v.to_string().as_bytes()),
                None => hasher.update(b"~"),
            }
            hasher.update(&[0]);
        }
        if let (Some(line), Some(column)) = (self.coordinates.new_line, self.coordinates.new_column)
        {
            hasher.update(format!("{line}:{column}").as_bytes());
        }
        if let Some(file) = &self.source {
            hasher.update(&[0]);
            hasher.update(file.as_bytes());
        }
        hasher.digest()
    }

    /// Key used for per-node idempotence: `(path, type, property)` plus the
    /// semantic hash, so two servers added in one list stay apart.
    #[must_use]
    pub fn attribution_key(&self) -> (String, String, String, u64) {
        (
            self.path.clone(),
            self.object_type.clone(),
            self.property.clone(),
            self.semantic_hash(),
        )
    }
}
