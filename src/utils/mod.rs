//! Shared utilities.

mod hash;

pub use hash::{content_hash, id_hash, object_hash};
