//! Traversal context, change sink and cancellation.

use super::adapter::NodeChange;
use crate::diff::DiffGroup;
use crate::error::{OasChangesError, Result};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, SyncSender};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a session and its workers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A change record on its way to the consumer.
#[derive(Debug)]
pub struct Published {
    /// Arena slot of the node the change is attached to
    pub node: usize,
    pub change: NodeChange,
}

/// Producer end of the change channel.
#[derive(Debug, Clone)]
pub struct ChangeSink {
    tx: SyncSender<Published>,
    cancel: CancelToken,
}

impl ChangeSink {
    pub fn new(tx: SyncSender<Published>, cancel: CancelToken) -> Self {
        Self { tx, cancel }
    }

    /// Send one record. Fails once the session is cancelled or the consumer
    /// has gone away.
    pub fn publish(&self, node: usize, change: NodeChange) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(OasChangesError::cancelled("publishing change"));
        }
        self.tx
            .send(Published { node, change })
            .map_err(|_| OasChangesError::cancelled("change consumer closed"))
    }
}

/// A non-fatal problem met while distributing changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildError {
    pub path: String,
    pub message: String,
}

impl BuildError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Error side channel. Unbounded; a closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ErrorSink(Sender<BuildError>);

impl ErrorSink {
    pub fn new(tx: Sender<BuildError>) -> Self {
        Self(tx)
    }

    pub fn report(&self, error: BuildError) {
        let _ = self.0.send(error);
    }
}

/// Where the visitor is: a node of the right document and the change group
/// that describes it. Derived fresh for every recursion.
#[derive(Debug, Clone, Copy)]
pub struct Ctx<'g> {
    pub node: usize,
    pub group: DiffGroup<'g>,
}

impl<'g> Ctx<'g> {
    pub fn new(node: usize, group: DiffGroup<'g>) -> Self {
        Self { node, group }
    }

    #[must_use]
    pub fn descend(&self, node: usize, group: DiffGroup<'g>) -> Self {
        Self { node, group }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn change() -> NodeChange {
        NodeChange {
            id: "$".to_string(),
            id_hash: 0,
            object_type: "document".to_string(),
            path: None,
            index: None,
            diffs: Vec::new(),
        }
    }

    #[test]
    fn test_publish_after_cancel_fails() {
        let (tx, rx) = mpsc::sync_channel(4);
        let token = CancelToken::new();
        let sink = ChangeSink::new(tx, token.clone());
        assert!(sink.publish(0, change()).is_ok());
        token.cancel();
        let err = sink.publish(0, change()).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_publish_to_closed_consumer_fails() {
        let (tx, rx) = mpsc::sync_channel(1);
        drop(rx);
        let sink = ChangeSink::new(tx, CancelToken::new());
        assert!(sink.publish(0, change()).unwrap_err().is_cancelled());
    }
}
