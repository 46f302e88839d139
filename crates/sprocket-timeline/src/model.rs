//! The timeline aggregate.
//!
//! `TimelineModel` owns the canonical registries (clips, tracks, track
//! order, groups), the shared id allocator, the undo history and the
//! composition-graph seam. Every mutating request either fully applies
//! and lands as one history entry, or rolls back synchronously and
//! reports failure; no partial edit is ever observable.
//!
//! The model assumes exclusive ownership by one controlling thread: all
//! mutation goes through `&mut self`, reads through `&self`.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use sprocket_core::{FrameRate, IdAllocator, ItemId, Result, TimelineError};

use crate::clip::{Clip, ClipSource};
use crate::graph::{CompositionGraph, MemoryGraph};
use crate::group::GroupHierarchy;
use crate::history::{HistoryEntry, UndoStack};
use crate::ops::{AtomicOp, Transaction};
use crate::track::{Track, TrackKind};

/// Aggregate root of the timeline.
#[derive(Debug)]
pub struct TimelineModel {
    pub(crate) clips: HashMap<ItemId, Clip>,
    pub(crate) tracks: HashMap<ItemId, Track>,
    /// Track ids in display order.
    pub(crate) track_order: Vec<ItemId>,
    /// Inverse of `track_order`: id to display row.
    pub(crate) track_rows: HashMap<ItemId, usize>,
    pub(crate) groups: GroupHierarchy,
    /// Ids that name user-created groups (as opposed to clip entries).
    pub(crate) group_ids: HashSet<ItemId>,
    pub(crate) frame_rate: FrameRate,
    ids: IdAllocator,
    history: UndoStack,
    graph: Box<dyn CompositionGraph>,
}

impl TimelineModel {
    /// Empty model backed by the in-memory composition graph.
    pub fn new() -> Self {
        Self::with_graph(Box::new(MemoryGraph::new()))
    }

    /// Empty model backed by a caller-supplied composition graph.
    pub fn with_graph(graph: Box<dyn CompositionGraph>) -> Self {
        Self {
            clips: HashMap::new(),
            tracks: HashMap::new(),
            track_order: Vec::new(),
            track_rows: HashMap::new(),
            groups: GroupHierarchy::new(),
            group_ids: HashSet::new(),
            frame_rate: FrameRate::default(),
            ids: IdAllocator::new(),
            history: UndoStack::default(),
            graph,
        }
    }

    /// Model pre-populated with two video tracks and two color clips,
    /// placed through the public move API. Useful for demos and tests.
    pub fn populated() -> Result<Self> {
        let mut model = Self::new();
        let t1 = model.create_track(TrackKind::Video, "V1")?;
        let t2 = model.create_track(TrackKind::Video, "V2")?;
        let source = ClipSource::color("red", 100);
        let c1 = model.create_clip("red", source.clone());
        let c2 = model.create_clip("red", source);
        let placed = model.request_clip_move(c1, t1, 100) && model.request_clip_move(c2, t2, 50);
        debug_assert!(placed);
        model.set_track_property(t1, "height", "60");
        model.set_track_property(t2, "height", "140");
        Ok(model)
    }

    // ── Transaction plumbing ────────────────────────────────────

    fn apply(&mut self, txn: &mut Transaction, op: AtomicOp) {
        self.apply_op(&op);
        txn.record(op);
    }

    fn rollback(&mut self, txn: Transaction) {
        for op in txn.into_ops().iter().rev() {
            self.apply_op(&op.inverse());
        }
    }

    fn commit(&mut self, txn: Transaction, label: &str) {
        self.history.push(HistoryEntry::new(label, txn.into_ops()));
    }

    fn apply_op(&mut self, op: &AtomicOp) {
        match *op {
            AtomicOp::PlaceClip {
                track,
                clip,
                position,
            } => {
                match self.tracks.get_mut(&track) {
                    Some(t) => t.place(position, clip),
                    None => debug_assert!(false, "placing on unknown track {track}"),
                }
                match self.clips.get_mut(&clip) {
                    Some(c) => c.set_position(position),
                    None => debug_assert!(false, "placing unknown clip {clip}"),
                }
            }
            AtomicOp::UnplaceClip {
                track,
                clip,
                position,
            } => {
                let removed = self.tracks.get_mut(&track).and_then(|t| t.unplace(position));
                debug_assert_eq!(removed, Some(clip), "placement registry out of sync");
            }
            AtomicOp::SetClipState {
                clip,
                new_track,
                new_position,
                ..
            } => match self.clips.get_mut(&clip) {
                Some(c) => {
                    c.set_track(new_track);
                    c.set_position(new_position);
                }
                None => debug_assert!(false, "retargeting unknown clip {clip}"),
            },
            AtomicOp::ResizeClip {
                clip,
                old_position,
                new_position,
                new_in,
                new_out,
                ..
            } => {
                let track_id = self.clips.get(&clip).and_then(Clip::track);
                if let Some(tid) = track_id {
                    if old_position != new_position {
                        if let Some(t) = self.tracks.get_mut(&tid) {
                            let removed = t.unplace(old_position);
                            debug_assert_eq!(removed, Some(clip));
                            t.place(new_position, clip);
                        }
                    }
                }
                if let Some(c) = self.clips.get_mut(&clip) {
                    c.set_points(new_in, new_out);
                    c.set_position(new_position);
                }
            }
            AtomicOp::CreateNode {
                item,
                parent,
                group,
            } => {
                self.groups.insert_node(item, parent);
                if group {
                    debug_assert!(!self.group_ids.contains(&item));
                    self.group_ids.insert(item);
                }
            }
            AtomicOp::DestroyNode { item, group, .. } => {
                self.groups.remove_node(item);
                if group {
                    self.group_ids.remove(&item);
                }
            }
            AtomicOp::SetParent { item, new, .. } => {
                self.groups.set_parent(item, new);
            }
        }
    }

    // ── Mutating requests ───────────────────────────────────────

    /// Move a clip to `position` on `track`, leaving its current track
    /// first if placed. Atomic: on any failure the pre-call state is
    /// restored and no history entry is recorded.
    pub fn request_clip_move(&mut self, clip: ItemId, track: ItemId, position: i64) -> bool {
        if !self.is_clip(clip) || !self.is_track(track) {
            debug!(%clip, %track, "rejected move: unknown id");
            return false;
        }
        let mut txn = Transaction::new();
        let old_track = self.clips[&clip].track();
        let old_position = self.clips[&clip].position();
        if let Some(old_tid) = old_track {
            let plan = self.tracks[&old_tid].plan_deletion(&self.clips[&clip]);
            match plan {
                Some(op) => self.apply(&mut txn, op),
                None => {
                    debug!(%clip, track = %old_tid, "rejected move: cannot leave current track");
                    self.rollback(txn);
                    return false;
                }
            }
        }
        let plan = self.tracks[&track].plan_insertion(&self.clips, &self.clips[&clip], position);
        match plan {
            Some(op) => self.apply(&mut txn, op),
            None => {
                debug!(%clip, %track, position, "rejected move: no room on target track");
                self.rollback(txn);
                return false;
            }
        }
        let retarget = AtomicOp::SetClipState {
            clip,
            old_track,
            old_position,
            new_track: Some(track),
            new_position: position,
        };
        self.apply(&mut txn, retarget);
        self.commit(txn, "Move clip");
        true
    }

    /// Resize a clip to `size` frames from its right or left edge. The
    /// owning track validates against neighbors; an unplaced clip only
    /// has to respect its source bounds.
    pub fn request_clip_resize(&mut self, clip: ItemId, size: i64, right: bool) -> bool {
        if !self.is_clip(clip) {
            debug!(%clip, "rejected resize: unknown clip");
            return false;
        }
        let plan = {
            let c = &self.clips[&clip];
            match c.track() {
                Some(tid) => self.tracks[&tid].plan_resize(&self.clips, c, size, right),
                None => {
                    c.resize_geometry(size, right)
                        .map(|(new_position, new_in, new_out)| AtomicOp::ResizeClip {
                            clip,
                            old_position: c.position(),
                            old_in: c.in_point(),
                            old_out: c.out_point(),
                            new_position,
                            new_in,
                            new_out,
                        })
                }
            }
        };
        match plan {
            Some(op) => {
                let mut txn = Transaction::new();
                self.apply(&mut txn, op);
                self.commit(txn, "Resize clip");
                true
            }
            None => {
                debug!(%clip, size, right, "rejected resize");
                false
            }
        }
    }

    /// Group the given items under a fresh group. Returns the new group
    /// id, or `None` if the set is empty or contains an unknown id.
    pub fn request_group_clips(&mut self, ids: &BTreeSet<ItemId>) -> Option<ItemId> {
        if ids.is_empty() || ids.iter().any(|id| !self.groups.contains(*id)) {
            debug!("rejected grouping: empty or invalid id set");
            return None;
        }
        let gid = self.ids.allocate();
        let ops = self.groups.plan_group(ids, gid, &self.group_ids)?;
        let mut txn = Transaction::new();
        for op in ops {
            self.apply(&mut txn, op);
        }
        self.commit(txn, "Group clips");
        Some(gid)
    }

    /// Remove one item's direct parent binding. Fails if it has none.
    pub fn request_ungroup_clip(&mut self, item: ItemId) -> bool {
        let Some(ops) = self.groups.plan_ungroup(item, &self.group_ids) else {
            debug!(%item, "rejected ungroup: item has no parent");
            return false;
        };
        let mut txn = Transaction::new();
        for op in ops {
            self.apply(&mut txn, op);
        }
        self.commit(txn, "Ungroup clips");
        true
    }

    // ── Undo / redo ─────────────────────────────────────────────

    /// Revert the most recent history entry. Returns false on empty
    /// history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.pop_undo() else {
            return false;
        };
        for op in entry.ops.iter().rev() {
            self.apply_op(&op.inverse());
        }
        self.history.push_undone(entry);
        true
    }

    /// Reapply the most recently undone entry.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.pop_redo() else {
            return false;
        };
        for op in entry.ops.iter() {
            self.apply_op(op);
        }
        self.history.push_redone(entry);
        true
    }

    /// The undo/redo history.
    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    // ── Registration / deregistration ───────────────────────────

    /// Create a track at the end of the track order.
    pub fn create_track(&mut self, kind: TrackKind, name: impl Into<String>) -> Result<ItemId> {
        self.create_track_at(kind, name, None)
    }

    /// Create a track at the given display row (append when `None`).
    pub fn create_track_at(
        &mut self,
        kind: TrackKind,
        name: impl Into<String>,
        row: Option<usize>,
    ) -> Result<ItemId> {
        let id = self.ids.allocate();
        let track = Track::new(id, kind, name);
        self.register_track(track, row)?;
        Ok(id)
    }

    fn register_track(&mut self, track: Track, row: Option<usize>) -> Result<()> {
        let id = track.id();
        let row = row.unwrap_or(self.track_order.len());
        if row > self.track_order.len() {
            return Err(TimelineError::InvalidTrackIndex(row));
        }
        // Effective insertion in the composition graph first; the model
        // registries follow only if the engine accepted the track.
        self.graph.insert_track(row)?;
        // The height sync mirrors set_track_property: a refusal is
        // logged, not fatal.
        if let Err(err) = self
            .graph
            .set_track_property(row, "height", &track.height.to_string())
        {
            warn!(%err, "composition graph rejected initial track height");
        }
        debug_assert!(!self.tracks.contains_key(&id), "track id reuse");
        self.track_order.insert(row, id);
        self.tracks.insert(id, track);
        self.rebuild_track_rows();
        debug_assert_eq!(self.graph.tracks_count(), self.tracks.len());
        Ok(())
    }

    /// Remove a track. Its clips become unplaced but stay registered.
    /// Structural deletions are not undoable; the history is cleared so
    /// stale entries cannot replay against missing registries.
    pub fn delete_track(&mut self, track: ItemId) -> bool {
        let Some(&row) = self.track_rows.get(&track) else {
            debug!(%track, "rejected delete: unknown track");
            return false;
        };
        // Graph veto first; a refusal must leave the registries untouched.
        if let Err(err) = self.graph.remove_track(row) {
            warn!(%err, %track, "composition graph rejected track removal");
            return false;
        }
        let clip_ids: Vec<ItemId> = self.tracks[&track].placements().map(|(_, c)| c).collect();
        for cid in clip_ids {
            if let Some(clip) = self.clips.get_mut(&cid) {
                clip.set_track(None);
            }
        }
        self.track_order.remove(row);
        self.tracks.remove(&track);
        self.rebuild_track_rows();
        self.history.clear();
        debug_assert_eq!(self.graph.tracks_count(), self.tracks.len());
        true
    }

    /// Create an unplaced clip and register it (including its singleton
    /// group entry).
    pub fn create_clip(&mut self, name: impl Into<String>, source: ClipSource) -> ItemId {
        let id = self.ids.allocate();
        let clip = Clip::new(id, name, source);
        debug_assert!(!self.clips.contains_key(&id), "clip id reuse");
        self.groups.insert_node(id, None);
        self.clips.insert(id, clip);
        id
    }

    /// Deregister a clip: detach it from its track, remove its group
    /// subtree, drop it from the registry. Not undoable (history is
    /// cleared).
    pub fn delete_clip(&mut self, clip: ItemId) -> bool {
        let Some(c) = self.clips.get(&clip) else {
            debug!(%clip, "rejected delete: unknown clip");
            return false;
        };
        if let Some(tid) = c.track() {
            let position = c.position();
            if let Some(track) = self.tracks.get_mut(&tid) {
                let removed = track.unplace(position);
                debug_assert_eq!(removed, Some(clip));
            }
        }
        let ops = self.groups.plan_destruct(clip, true, &self.group_ids);
        for op in ops {
            self.apply_op(&op);
        }
        self.clips.remove(&clip);
        self.history.clear();
        true
    }

    fn rebuild_track_rows(&mut self) {
        self.track_rows = self
            .track_order
            .iter()
            .enumerate()
            .map(|(row, &id)| (id, row))
            .collect();
    }

    // ── Track properties ────────────────────────────────────────

    /// Set a named track property, mirroring it into the composition
    /// graph. Known keys: `name`, `height`, `muted`, `hidden`, `locked`.
    /// The model field changes only if the graph accepts the property, so
    /// the two never diverge.
    pub fn set_track_property(&mut self, track: ItemId, key: &str, value: &str) -> bool {
        let Some(&row) = self.track_rows.get(&track) else {
            return false;
        };
        let parsed = match key {
            "name" => Some(TrackProp::Name(value.to_string())),
            "height" => match value.parse::<i32>() {
                Ok(h) if h > 0 => Some(TrackProp::Height(h)),
                _ => None,
            },
            "muted" => parse_flag(value).map(TrackProp::Muted),
            "hidden" => parse_flag(value).map(TrackProp::Hidden),
            "locked" => parse_flag(value).map(TrackProp::Locked),
            _ => None,
        };
        let Some(parsed) = parsed else {
            debug!(%track, key, value, "rejected track property");
            return false;
        };
        if let Err(err) = self.graph.set_track_property(row, key, value) {
            warn!(%err, %track, key, "composition graph rejected property");
            return false;
        }
        let Some(t) = self.tracks.get_mut(&track) else {
            debug_assert!(false, "track rows out of sync with registry");
            return false;
        };
        match parsed {
            TrackProp::Name(name) => t.name = name,
            TrackProp::Height(h) => t.height = h,
            TrackProp::Muted(b) => t.muted = b,
            TrackProp::Hidden(b) => t.hidden = b,
            TrackProp::Locked(b) => t.locked = b,
        }
        true
    }

    // ── Read accessors (pure) ───────────────────────────────────

    pub fn tracks_count(&self) -> usize {
        debug_assert_eq!(self.track_order.len(), self.tracks.len());
        debug_assert_eq!(self.graph.tracks_count(), self.tracks.len());
        self.tracks.len()
    }

    pub fn clips_count(&self) -> usize {
        self.clips.len()
    }

    /// Number of clips placed on a track (0 for an unknown id).
    pub fn track_clips_count(&self, track: ItemId) -> usize {
        self.tracks.get(&track).map_or(0, Track::clips_count)
    }

    /// A clip's owning track, `None` while unplaced or unknown.
    pub fn clip_track(&self, clip: ItemId) -> Option<ItemId> {
        self.clips.get(&clip).and_then(Clip::track)
    }

    /// A clip's start frame.
    pub fn clip_position(&self, clip: ItemId) -> Option<i64> {
        self.clips.get(&clip).map(Clip::position)
    }

    /// An item's direct parent group.
    pub fn group_parent(&self, item: ItemId) -> Option<ItemId> {
        self.groups.parent(item)
    }

    pub fn is_clip(&self, id: ItemId) -> bool {
        self.clips.contains_key(&id)
    }

    pub fn is_track(&self, id: ItemId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn is_group(&self, id: ItemId) -> bool {
        self.group_ids.contains(&id)
    }

    pub fn track_by_id(&self, id: ItemId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn clip_by_id(&self, id: ItemId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    /// Display row of a track.
    pub fn track_row(&self, track: ItemId) -> Option<usize> {
        self.track_rows.get(&track).copied()
    }

    /// Track at a display row.
    pub fn track_at_row(&self, row: usize) -> Option<ItemId> {
        self.track_order.get(row).copied()
    }

    /// The grouping forest (read only).
    pub fn group_hierarchy(&self) -> &GroupHierarchy {
        &self.groups
    }

    /// Total timeline extent in frames: the maximum across all tracks.
    pub fn duration(&self) -> i64 {
        self.tracks
            .values()
            .map(|t| t.duration(&self.clips))
            .max()
            .unwrap_or(0)
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    pub fn set_frame_rate(&mut self, rate: FrameRate) {
        self.frame_rate = rate;
    }
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed, validated track property value.
enum TrackProp {
    Name(String),
    Height(i32),
    Muted(bool),
    Hidden(bool),
    Locked(bool),
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
