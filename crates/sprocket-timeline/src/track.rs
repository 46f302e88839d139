//! Track types for the timeline.
//!
//! A track owns the ordered, non-overlapping placement map for one
//! timeline lane, and it alone validates insertion, deletion and resize
//! against that invariant. Keeping the check local to the track lets a
//! multi-track move validate each affected lane independently and compose
//! the reversible steps before any of them commits.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sprocket_core::ItemId;

use crate::clip::Clip;
use crate::ops::AtomicOp;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
}

/// One timeline lane: an ordered sequence of clip placements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    id: ItemId,
    /// Track name
    pub name: String,
    kind: TrackKind,
    /// Placements keyed by start frame. Values are clip ids; clip extents
    /// live in the model's clip registry.
    placements: BTreeMap<i64, ItemId>,
    /// Is track muted
    pub muted: bool,
    /// Is track hidden in the monitor
    pub hidden: bool,
    /// Is track locked (prevents edits)
    pub locked: bool,
    /// Display height in pixels
    pub height: i32,
}

impl Track {
    pub(crate) fn new(id: ItemId, kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            placements: BTreeMap::new(),
            muted: false,
            hidden: false,
            locked: false,
            height: 50,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn is_audio(&self) -> bool {
        self.kind == TrackKind::Audio
    }

    /// Number of clips placed on this track.
    pub fn clips_count(&self) -> usize {
        self.placements.len()
    }

    /// Placements in timeline order as `(start_frame, clip_id)`.
    pub fn placements(&self) -> impl Iterator<Item = (i64, ItemId)> + '_ {
        self.placements.iter().map(|(&pos, &cid)| (pos, cid))
    }

    /// Clip at the given display row (clips are rows in timeline order).
    pub fn clip_by_row(&self, row: usize) -> Option<ItemId> {
        self.placements.values().nth(row).copied()
    }

    /// Display row of a clip on this track.
    pub fn row_of_clip(&self, clip: ItemId) -> Option<usize> {
        self.placements.values().position(|&cid| cid == clip)
    }

    /// Last occupied frame + 1, or 0 for an empty track.
    pub fn duration(&self, clips: &HashMap<ItemId, Clip>) -> i64 {
        self.placements
            .iter()
            .map(|(&pos, cid)| pos + clips.get(cid).map_or(0, Clip::playtime))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn place(&mut self, position: i64, clip: ItemId) {
        let prev = self.placements.insert(position, clip);
        debug_assert!(prev.is_none(), "placement collision at frame {position}");
    }

    pub(crate) fn unplace(&mut self, position: i64) -> Option<ItemId> {
        self.placements.remove(&position)
    }

    /// Check that `[start, start + len)` touches no existing placement,
    /// ignoring the placement keyed at `ignore_key` (a clip's own slot
    /// during resize).
    fn fits(
        &self,
        clips: &HashMap<ItemId, Clip>,
        start: i64,
        len: i64,
        ignore_key: Option<i64>,
    ) -> bool {
        let end = start + len;
        for (&pos, cid) in &self.placements {
            if Some(pos) == ignore_key {
                continue;
            }
            let other_end = pos + clips.get(cid).map_or(0, Clip::playtime);
            if pos < end && start < other_end {
                return false;
            }
        }
        true
    }

    /// Plan inserting `clip` at `position`. Fails on overlap, negative
    /// position, or a locked track; nothing is mutated either way.
    pub(crate) fn plan_insertion(
        &self,
        clips: &HashMap<ItemId, Clip>,
        clip: &Clip,
        position: i64,
    ) -> Option<AtomicOp> {
        if self.locked || position < 0 || clip.playtime() <= 0 {
            return None;
        }
        if !self.fits(clips, position, clip.playtime(), None) {
            return None;
        }
        Some(AtomicOp::PlaceClip {
            track: self.id,
            clip: clip.id(),
            position,
        })
    }

    /// Plan removing `clip` from this track. Fails if the clip is not
    /// placed here.
    pub(crate) fn plan_deletion(&self, clip: &Clip) -> Option<AtomicOp> {
        if self.locked {
            return None;
        }
        if self.placements.get(&clip.position()) != Some(&clip.id()) {
            return None;
        }
        Some(AtomicOp::UnplaceClip {
            track: self.id,
            clip: clip.id(),
            position: clip.position(),
        })
    }

    /// Plan resizing `clip` to `size` frames from its right or left edge.
    /// The moved boundary must not cross a neighboring placement.
    pub(crate) fn plan_resize(
        &self,
        clips: &HashMap<ItemId, Clip>,
        clip: &Clip,
        size: i64,
        right: bool,
    ) -> Option<AtomicOp> {
        if self.locked {
            return None;
        }
        let (new_position, new_in, new_out) = clip.resize_geometry(size, right)?;
        if !self.fits(clips, new_position, new_out - new_in, Some(clip.position())) {
            return None;
        }
        Some(AtomicOp::ResizeClip {
            clip: clip.id(),
            old_position: clip.position(),
            old_in: clip.in_point(),
            old_out: clip.out_point(),
            new_position,
            new_in,
            new_out,
        })
    }
}
