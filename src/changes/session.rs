//! Distribution sessions.
//!
//! A [`Session`] owns all per-run state: the dedup ledger and the
//! cancellation token. Each pass runs the visitor on a scoped producer
//! thread while the calling thread drains the bounded change channel and is
//! the only writer of the ledger and the node attachments.

use super::adapter::NodeChange;
use super::bridge::{self, PendingRef};
use super::context::{BuildError, CancelToken, ChangeSink, Ctx, ErrorSink, Published};
use super::ledger::DedupLedger;
use super::prune::{prune, select_edges, ChangeNode};
use super::rules::transfer_rule_results;
use super::stats::ChangeStatistics;
use super::visitor::Visitor;
use crate::diff::{Changes, DocumentChanges};
use crate::error::{DistributionErrorKind, OasChangesError, Result};
use crate::graph::{Edge, SemanticGraph};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::thread;

/// Distribution settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DistributionConfig {
    /// Fail on a change group that no visit rule handles
    pub strict: bool,
    /// Visit path items in parallel on the rayon pool
    pub parallel_paths: bool,
    /// Bound of the change channel
    pub channel_capacity: usize,
    /// Reference replay rounds before giving up
    pub max_replay_rounds: usize,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            strict: false,
            parallel_paths: false,
            channel_capacity: 256,
            max_replay_rounds: 64,
        }
    }
}

/// Everything a distribution run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DistributionResult {
    /// The diff set with reference copies removed
    pub changes: DocumentChanges,
    /// Nodes that received a change or have a changed descendant, in
    /// arrival order
    pub changed_nodes: Vec<ChangeNode>,
    pub changed_edges: Vec<Edge>,
    pub tree: Option<ChangeNode>,
    pub statistics: ChangeStatistics,
    pub build_errors: Vec<BuildError>,
}

impl DistributionResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Copy rule results from the left graph onto the change tree.
    pub fn transfer_rule_results(&mut self, left: &SemanticGraph<'_>) -> usize {
        match self.tree.as_mut() {
            Some(tree) => transfer_rule_results(left, tree),
            None => 0,
        }
    }
}

type AttributionKey = (String, String, String, u64);

/// Consumer-side state of one run.
#[derive(Default)]
struct Consumer {
    attachments: HashMap<usize, Vec<NodeChange>>,
    keys: HashMap<usize, HashSet<AttributionKey>>,
    touched: HashSet<usize>,
    changed: Vec<usize>,
    received: usize,
}

impl Consumer {
    fn accept(&mut self, graph: &SemanticGraph<'_>, ledger: &mut DedupLedger, published: Published) {
        let Published { node, mut change } = published;
        self.received += 1;
        for diff in &change.diffs {
            ledger.observe(diff);
        }
        let keys = self.keys.entry(node).or_default();
        change.diffs.retain(|d| keys.insert(d.attribution_key()));
        if change.diffs.is_empty() {
            return;
        }
        for slot in graph.ancestry(node) {
            if self.touched.insert(slot) {
                self.changed.push(slot);
            }
        }
        self.attachments.entry(node).or_default().push(change);
    }
}

#[derive(Debug, Default)]
pub struct Session {
    config: DistributionConfig,
    ledger: DedupLedger,
    cancel: CancelToken,
}

impl Session {
    #[must_use]
    pub fn new(config: DistributionConfig) -> Self {
        Self {
            config,
            ledger: DedupLedger::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Share an existing cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    #[must_use]
    pub fn ledger(&self) -> &DedupLedger {
        &self.ledger
    }

    #[must_use]
    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// Distribute `changes` onto the right document's `graph`.
    ///
    /// Previous attachments on the graph are cleared first, so running a
    /// session twice over the same inputs yields the same result.
    pub fn distribute<'d>(
        &mut self,
        graph: &mut SemanticGraph<'d>,
        changes: &DocumentChanges,
    ) -> Result<DistributionResult> {
        graph.clear_changes();
        self.ledger = DedupLedger::new();

        let Some(root) = graph.root() else {
            return Ok(DistributionResult {
                changes: DocumentChanges::default(),
                changed_nodes: Vec::new(),
                changed_edges: Vec::new(),
                tree: None,
                statistics: ChangeStatistics::default(),
                build_errors: Vec::new(),
            });
        };

        let (error_tx, error_rx) = mpsc::channel();
        let errors = ErrorSink::new(error_tx);
        let mut consumer = Consumer::default();

        {
            let view: &SemanticGraph<'d> = graph;
            let mut queue = self.pass(view, &mut consumer, &errors, |visitor| {
                visitor.visit(Ctx::new(root, changes.as_group()))
            })?;

            let mut rounds = 0;
            loop {
                queue.retain(|p| self.ledger.guard_replay(&p.path, p.group.address()));
                if queue.is_empty() {
                    break;
                }
                rounds += 1;
                if rounds > self.config.max_replay_rounds {
                    return Err(OasChangesError::distribution(
                        format!("{} references still pending", queue.len()),
                        DistributionErrorKind::ReplayLimit(self.config.max_replay_rounds),
                    ));
                }
                tracing::debug!(round = rounds, pending = queue.len(), "replaying references");
                let batch = std::mem::take(&mut queue);
                queue = self.pass(view, &mut consumer, &errors, move |visitor| {
                    bridge::replay(visitor, batch)
                })?;
            }
        }

        if self.cancel.is_cancelled() {
            return Err(OasChangesError::cancelled("distribution"));
        }

        drop(errors);
        let build_errors: Vec<BuildError> = error_rx.try_iter().collect();
        for error in &build_errors {
            tracing::warn!(path = %error.path, "{}", error.message);
        }

        tracing::debug!(
            received = consumer.received,
            nodes = consumer.attachments.len(),
            located = self.ledger.len(),
            duplicates = self.ledger.dropped(),
            "distribution finished"
        );

        for (slot, attached) in consumer.attachments {
            graph.node_mut(slot).changes.extend(attached);
        }

        let mut deduplicated = changes.clone();
        self.ledger.retain(&mut deduplicated);
        let statistics = ChangeStatistics::from_changes(&deduplicated);

        let tree = prune(graph);
        let changed_edges = tree
            .as_ref()
            .map(|t| select_edges(graph, t))
            .unwrap_or_default();
        let changed_nodes = consumer
            .changed
            .iter()
            .map(|&slot| ChangeNode::flat(graph.node(slot)))
            .collect();

        Ok(DistributionResult {
            changes: deduplicated,
            changed_nodes,
            changed_edges,
            tree,
            statistics,
            build_errors,
        })
    }

    /// Run one producer pass and consume everything it publishes.
    fn pass<'g, 'd, F>(
        &mut self,
        graph: &'g SemanticGraph<'d>,
        consumer: &mut Consumer,
        errors: &ErrorSink,
        work: F,
    ) -> Result<Vec<PendingRef<'g, 'd>>>
    where
        F: FnOnce(&mut Visitor<'g, 'd>) -> Result<()> + Send,
    {
        let (tx, rx) = mpsc::sync_channel(self.config.channel_capacity.max(1));
        let sink = ChangeSink::new(tx, self.cancel.clone());
        let mut visitor = Visitor::new(
            graph,
            sink,
            errors.clone(),
            self.config.strict,
            self.config.parallel_paths,
        );
        let ledger = &mut self.ledger;

        thread::scope(|scope| {
            let producer = scope.spawn(move || {
                let result = work(&mut visitor);
                (result, visitor.into_pending())
            });
            for published in rx {
                consumer.accept(graph, ledger, published);
            }
            match producer.join() {
                Ok((result, pending)) => result.map(|()| pending),
                Err(_) => Err(OasChangesError::distribution(
                    "change producer",
                    DistributionErrorKind::WorkerPanicked("producer thread".to_string()),
                )),
            }
        })
    }
}
