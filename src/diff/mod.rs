//! Property-level diff of two OpenAPI documents.
//!
//! The [`DiffEngine`] produces a [`DocumentChanges`] tree: one change group
//! per object kind, each holding its own property diffs plus the groups of
//! its changed children. Every [`Diff`] carries source coordinates in both
//! documents, which are what the distribution engine uses to tell the same
//! change apart from a copy reached through another `$ref`.
//!
//! # Example
//!
//! ```ignore
//! use oas_changes::diff::{Changes, DiffEngine};
//! use oas_changes::parsers::parse_document;
//!
//! let left = parse_document("v1.yaml".as_ref())?;
//! let right = parse_document("v2.yaml".as_ref())?;
//! let changes = DiffEngine::new().compare(&left, &right);
//! println!("{} changes, {} breaking", changes.total(), changes.breaking());
//! ```

mod breaking;
mod compare_components;
mod compare_paths;
mod compare_schema;
mod engine;
mod groups;
mod types;

pub use breaking::{is_breaking, is_entry_breaking, is_member_breaking, required_name_breaking};
pub use engine::DiffEngine;
pub use groups::*;
pub use types::{ChangeKind, Coordinates, Diff, MapEntry, ObjectHandle, UNKNOWN_LOCATION};
