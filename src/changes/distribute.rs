//! Map and slice distributors.
//!
//! A map group is keyed like the map it describes, so entries are found by
//! exact key. A slice group is positional in neither document reliably, so
//! members are found by the content hash recorded in the group's identity.

use super::context::Ctx;
use super::visitor::Visitor;
use crate::diff::Changes;
use crate::error::Result;
use indexmap::IndexMap;

impl<'g, 'd> Visitor<'g, 'd> {
    /// Distribute the groups of a string-keyed map. `field` is the map's
    /// field on the context node, or `None` when the node is the map.
    pub(super) fn map<G: Changes>(
        &mut self,
        ctx: Ctx<'g>,
        field: Option<&str>,
        groups: &'g IndexMap<String, G>,
    ) -> Result<()> {
        for (key, group) in groups {
            self.map_entry(ctx, field, key, group)?;
        }
        Ok(())
    }

    pub(super) fn map_entry<G: Changes>(
        &mut self,
        ctx: Ctx<'g>,
        field: Option<&str>,
        key: &str,
        group: &'g G,
    ) -> Result<()> {
        let base = &self.graph.node(ctx.node).path;
        let path = match field {
            Some(name) => base.field(name).key(key),
            None => base.key(key),
        };
        match self.graph.child_at(&path) {
            Some(slot) => self.visit(ctx.descend(slot, group.as_group())),
            None => {
                tracing::debug!(path = %path, "map entry has no node, attributing to parent");
                self.attribute_to(ctx.node, group.as_group(), path.to_string(), group.kind().label())
            }
        }
    }

    /// Distribute the member groups of a positional list.
    ///
    /// Each group is matched against the members' content hashes, first by
    /// its new-object handle and then by its original-object handle. A
    /// group that matches nothing is reported under `{node}.{field}`.
    pub(super) fn slice<G: Changes>(
        &mut self,
        ctx: Ctx<'g>,
        field: &str,
        groups: &'g [G],
    ) -> Result<()> {
        if groups.is_empty() {
            return Ok(());
        }
        let members = self.graph.members(ctx.node, field);
        let hashes: Vec<Option<u64>> = members
            .iter()
            .map(|&slot| self.graph.node(slot).content_hash())
            .collect();
        for group in groups {
            let identity = group.identity();
            let matching = |handle: Option<u64>| -> Vec<usize> {
                let Some(wanted) = handle else {
                    return Vec::new();
                };
                members
                    .iter()
                    .zip(&hashes)
                    .filter(|(_, hash)| **hash == Some(wanted))
                    .map(|(slot, _)| *slot)
                    .collect()
            };
            let mut found = matching(identity.and_then(|i| i.new).map(|h| h.hash));
            if found.is_empty() {
                found = matching(identity.and_then(|i| i.original).map(|h| h.hash));
            }
            if found.is_empty() {
                let path = format!("{}.{field}", self.graph.node(ctx.node).id);
                tracing::debug!(path = %path, "list member not found, attributing to parent");
                self.attribute_to(ctx.node, group.as_group(), path, field)?;
                continue;
            }
            for slot in found {
                self.visit(ctx.descend(slot, group.as_group()))?;
            }
        }
        Ok(())
    }
}
