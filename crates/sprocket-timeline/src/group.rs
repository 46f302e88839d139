//! Grouping relations over timeline items.
//!
//! A forest over item ids: each node carries an optional parent uplink
//! and a set of child downlinks. Every clip gets a singleton entry at
//! registration time; user groups are extra nodes items get reparented
//! under. The hierarchy validates grouping requests and plans the
//! reversible ops; the model applies them.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use sprocket_core::ItemId;

use crate::ops::{AtomicOp, OpVec};

/// Forest of grouping relations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupHierarchy {
    up: HashMap<ItemId, Option<ItemId>>,
    down: HashMap<ItemId, BTreeSet<ItemId>>,
}

impl GroupHierarchy {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Is this id known to the hierarchy?
    pub fn contains(&self, id: ItemId) -> bool {
        self.up.contains_key(&id)
    }

    /// Direct parent group of an item, if any.
    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.up.get(&id).copied().flatten()
    }

    /// Direct children of a node, in id order.
    pub fn children(&self, id: ItemId) -> Vec<ItemId> {
        self.down
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of nodes in the forest.
    pub fn len(&self) -> usize {
        self.up.len()
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty()
    }

    // ── Direct mutators, driven by op application ───────────────

    pub(crate) fn insert_node(&mut self, id: ItemId, parent: Option<ItemId>) {
        debug_assert!(!self.contains(id), "node {id} already in hierarchy");
        self.up.insert(id, parent);
        self.down.insert(id, BTreeSet::new());
        if let Some(p) = parent {
            debug_assert!(self.down.contains_key(&p));
            self.down.entry(p).or_default().insert(id);
        }
    }

    pub(crate) fn remove_node(&mut self, id: ItemId) {
        debug_assert!(
            self.down.get(&id).map_or(true, BTreeSet::is_empty),
            "removing non-leaf node {id}"
        );
        if let Some(Some(p)) = self.up.remove(&id) {
            if let Some(siblings) = self.down.get_mut(&p) {
                siblings.remove(&id);
            }
        }
        self.down.remove(&id);
    }

    pub(crate) fn set_parent(&mut self, id: ItemId, parent: Option<ItemId>) {
        debug_assert!(self.contains(id));
        let old = self.up.insert(id, parent).flatten();
        if let Some(p) = old {
            if let Some(siblings) = self.down.get_mut(&p) {
                siblings.remove(&id);
            }
        }
        if let Some(p) = parent {
            self.down.entry(p).or_default().insert(id);
        }
    }

    // ── Planning ────────────────────────────────────────────────

    /// Plan grouping `ids` under the fresh group id `gid`: create the
    /// group node, reparent every member to it, and drop any old group a
    /// member fully vacated. Fails on an empty set or an unknown id.
    pub(crate) fn plan_group(
        &self,
        ids: &BTreeSet<ItemId>,
        gid: ItemId,
        group_ids: &HashSet<ItemId>,
    ) -> Option<OpVec> {
        if ids.is_empty() || ids.iter().any(|id| !self.contains(*id)) {
            return None;
        }
        let mut ops: OpVec = smallvec![AtomicOp::CreateNode {
            item: gid,
            parent: None,
            group: true,
        }];
        let mut departures: HashMap<ItemId, usize> = HashMap::new();
        for &id in ids {
            let old = self.parent(id);
            if let Some(old_gid) = old {
                *departures.entry(old_gid).or_insert(0) += 1;
            }
            ops.push(AtomicOp::SetParent {
                item: id,
                old,
                new: Some(gid),
            });
        }
        // Groups whose every member left are dropped, keeping the forest
        // free of empty group nodes.
        for (old_gid, left) in departures {
            let member_count = self.down.get(&old_gid).map_or(0, BTreeSet::len);
            if left == member_count && group_ids.contains(&old_gid) && !ids.contains(&old_gid) {
                ops.push(AtomicOp::DestroyNode {
                    item: old_gid,
                    parent: self.parent(old_gid),
                    group: true,
                });
            }
        }
        Some(ops)
    }

    /// Plan removing `id`'s direct parent binding (one level only).
    /// Fails if the item has no parent. The parent group is destroyed if
    /// `id` was its last member.
    pub(crate) fn plan_ungroup(&self, id: ItemId, group_ids: &HashSet<ItemId>) -> Option<OpVec> {
        let parent = self.parent(id)?;
        let mut ops: OpVec = smallvec![AtomicOp::SetParent {
            item: id,
            old: Some(parent),
            new: None,
        }];
        let siblings = self.down.get(&parent).map_or(0, BTreeSet::len);
        if siblings == 1 && group_ids.contains(&parent) {
            ops.push(AtomicOp::DestroyNode {
                item: parent,
                parent: self.parent(parent),
                group: true,
            });
        }
        Some(ops)
    }

    /// Plan removing `id` from the hierarchy entirely, with all its
    /// descendants when `recursive`. Used at item deregistration.
    pub(crate) fn plan_destruct(
        &self,
        id: ItemId,
        recursive: bool,
        group_ids: &HashSet<ItemId>,
    ) -> OpVec {
        let mut ops = OpVec::new();
        if !self.contains(id) {
            return ops;
        }
        let parent = self.parent(id);
        if recursive {
            self.destruct_subtree(id, group_ids, &mut ops);
        } else {
            for child in self.children(id) {
                ops.push(AtomicOp::SetParent {
                    item: child,
                    old: Some(id),
                    new: None,
                });
            }
            ops.push(AtomicOp::DestroyNode {
                item: id,
                parent,
                group: group_ids.contains(&id),
            });
        }
        // If the departing item was the last member of a group, drop the
        // now-empty group node too.
        if let Some(p) = parent {
            let members = self.down.get(&p).map_or(0, BTreeSet::len);
            if members == 1 && group_ids.contains(&p) {
                ops.push(AtomicOp::DestroyNode {
                    item: p,
                    parent: self.parent(p),
                    group: true,
                });
            }
        }
        ops
    }

    /// Post-order destruction so every node is a leaf when its op runs.
    fn destruct_subtree(&self, id: ItemId, group_ids: &HashSet<ItemId>, ops: &mut OpVec) {
        for child in self.children(id) {
            self.destruct_subtree(child, group_ids, ops);
        }
        ops.push(AtomicOp::DestroyNode {
            item: id,
            parent: self.parent(id),
            group: group_ids.contains(&id),
        });
    }
}
