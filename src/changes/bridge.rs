//! Reference replay.
//!
//! Pass one visits every `$ref` stub it reaches through the definition's
//! subtree built under the stub, so nested changes land at the use site.
//! The stub's group is also queued. Pass two looks the reference's friendly
//! path up in the node catalogue and visits the definition with the queued
//! group, so the definition's own nodes carry the change as well.

use super::context::Ctx;
use super::visitor::Visitor;
use crate::diff::DiffGroup;
use crate::error::Result;
use crate::model::ModelRef;

/// A change group waiting to be replayed at a reference target.
#[derive(Debug, Clone)]
pub struct PendingRef<'g, 'd> {
    /// Node id of the reference target, e.g. `$.components.schemas['Pet']`
    pub path: String,
    pub group: DiffGroup<'g>,
    /// The stub the group was found at
    pub origin: ModelRef<'d>,
}

/// Replay one batch of pending references.
pub(crate) fn replay<'g, 'd>(
    visitor: &mut Visitor<'g, 'd>,
    batch: Vec<PendingRef<'g, 'd>>,
) -> Result<()> {
    for pending in batch {
        let Some(slot) = visitor.graph.slot(&pending.path) else {
            tracing::debug!(
                path = %pending.path,
                origin = ?pending.origin.reference(),
                "reference target not in graph, dropping replay"
            );
            continue;
        };
        if visitor.graph.node(slot).model.is_none() {
            continue;
        }
        tracing::debug!(path = %pending.path, group = %pending.group, "replaying at reference target");
        visitor.visit(Ctx::new(slot, pending.group))?;
    }
    Ok(())
}
