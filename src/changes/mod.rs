//! Change distribution.
//!
//! Attaches the diff engine's change groups to the nodes of the right
//! document's semantic graph, deduplicates diffs reached through several
//! `$ref`s and builds the pruned change tree a report is rendered from.
//!
//! ```no_run
//! use oas_changes::changes::{DistributionConfig, Session};
//! use oas_changes::diff::DiffEngine;
//! use oas_changes::graph::SemanticGraph;
//! use oas_changes::parsers::parse_document;
//! use std::path::Path;
//!
//! let left = parse_document(Path::new("v1.yaml")).unwrap();
//! let right = parse_document(Path::new("v2.yaml")).unwrap();
//! let changes = DiffEngine::new().compare(&left, &right);
//!
//! let mut graph = SemanticGraph::build(&right.document);
//! let result = Session::new(DistributionConfig::default())
//!     .distribute(&mut graph, &changes)
//!     .unwrap();
//! println!("{} changes, {} breaking", result.statistics.total, result.statistics.breaking);
//! ```

mod adapter;
mod bridge;
mod context;
mod distribute;
mod ledger;
mod node_dedup;
mod prune;
mod rules;
mod session;
mod stats;
mod visit_components;
mod visit_paths;
mod visit_schema;
mod visitor;

pub use adapter::{adapt, member_override, NodeChange, PathOverride};
pub use bridge::PendingRef;
pub use context::{BuildError, CancelToken};
pub use ledger::{Attribution, DedupLedger};
pub use node_dedup::{HierarchyMap, NodeDedupStats, NodeTreeDeduplicator};
pub use prune::{prune, select_edges, ChangeNode};
pub use rules::transfer_rule_results;
pub use session::{DistributionConfig, DistributionResult, Session};
pub use stats::{ChangeStatistics, TypeCounts};
