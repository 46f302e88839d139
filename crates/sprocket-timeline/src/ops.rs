//! Reversible atomic steps and the transaction that accumulates them.
//!
//! Every mutating request on the model is decomposed into `AtomicOp`
//! values. Each op knows its inverse, so a committed list of ops can be
//! replayed backwards for undo and forwards for redo, and a failing
//! request can roll back the ops it already applied before returning.

use smallvec::SmallVec;
use sprocket_core::ItemId;

/// One reversible step of a timeline mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AtomicOp {
    /// Add a placement to a track and update the clip's position.
    PlaceClip {
        track: ItemId,
        clip: ItemId,
        position: i64,
    },
    /// Remove a placement from a track.
    UnplaceClip {
        track: ItemId,
        clip: ItemId,
        position: i64,
    },
    /// Change the clip's owning-track and position fields.
    SetClipState {
        clip: ItemId,
        old_track: Option<ItemId>,
        old_position: i64,
        new_track: Option<ItemId>,
        new_position: i64,
    },
    /// Change a clip's extent (and re-key its placement if moved).
    ResizeClip {
        clip: ItemId,
        old_position: i64,
        old_in: i64,
        old_out: i64,
        new_position: i64,
        new_in: i64,
        new_out: i64,
    },
    /// Insert a node into the group hierarchy under `parent`.
    CreateNode {
        item: ItemId,
        parent: Option<ItemId>,
        group: bool,
    },
    /// Remove a childless node from the group hierarchy.
    DestroyNode {
        item: ItemId,
        parent: Option<ItemId>,
        group: bool,
    },
    /// Rebind a node's parent in the group hierarchy.
    SetParent {
        item: ItemId,
        old: Option<ItemId>,
        new: Option<ItemId>,
    },
}

impl AtomicOp {
    /// The op that exactly undoes this one.
    pub(crate) fn inverse(&self) -> Self {
        match *self {
            Self::PlaceClip {
                track,
                clip,
                position,
            } => Self::UnplaceClip {
                track,
                clip,
                position,
            },
            Self::UnplaceClip {
                track,
                clip,
                position,
            } => Self::PlaceClip {
                track,
                clip,
                position,
            },
            Self::SetClipState {
                clip,
                old_track,
                old_position,
                new_track,
                new_position,
            } => Self::SetClipState {
                clip,
                old_track: new_track,
                old_position: new_position,
                new_track: old_track,
                new_position: old_position,
            },
            Self::ResizeClip {
                clip,
                old_position,
                old_in,
                old_out,
                new_position,
                new_in,
                new_out,
            } => Self::ResizeClip {
                clip,
                old_position: new_position,
                old_in: new_in,
                old_out: new_out,
                new_position: old_position,
                new_in: old_in,
                new_out: old_out,
            },
            Self::CreateNode {
                item,
                parent,
                group,
            } => Self::DestroyNode {
                item,
                parent,
                group,
            },
            Self::DestroyNode {
                item,
                parent,
                group,
            } => Self::CreateNode {
                item,
                parent,
                group,
            },
            Self::SetParent { item, old, new } => Self::SetParent {
                item,
                old: new,
                new: old,
            },
        }
    }
}

/// Short op lists stay inline; most requests take two or three steps.
pub(crate) type OpVec = SmallVec<[AtomicOp; 8]>;

/// Accumulator for the ops a request has already applied.
///
/// On success the buffer becomes one history entry; on failure the model
/// replays the inverses in reverse order and drops the buffer.
#[derive(Debug, Default)]
pub(crate) struct Transaction {
    pub(crate) ops: OpVec,
}

impl Transaction {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, op: AtomicOp) {
        self.ops.push(op);
    }

    pub(crate) fn into_ops(self) -> OpVec {
        self.ops
    }
}
