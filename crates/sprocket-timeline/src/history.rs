//! Undo/redo history.
//!
//! Each successful mutating request pushes exactly one labeled entry
//! holding the ops it applied. Undo replays the inverses in reverse
//! order, redo replays the originals; the model drives both.

use crate::ops::{AtomicOp, OpVec};

/// One atomic, user-visible history record.
#[derive(Debug)]
pub struct HistoryEntry {
    label: String,
    pub(crate) ops: OpVec,
}

impl HistoryEntry {
    pub(crate) fn new(label: impl Into<String>, ops: OpVec) -> Self {
        Self {
            label: label.into(),
            ops,
        }
    }

    /// Human-readable label ("Move clip", "Group clips", ...).
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Undo/redo history stack with bounded depth.
#[derive(Debug)]
pub struct UndoStack {
    /// Entries that have been executed (most recent last).
    undo: Vec<HistoryEntry>,
    /// Entries that have been undone (most recent last).
    redo: Vec<HistoryEntry>,
    /// Maximum history depth.
    max_depth: usize,
}

impl UndoStack {
    /// Create a new undo stack with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Push a freshly executed entry. Clears the redo stack (a new
    /// action invalidates redo history).
    pub(crate) fn push(&mut self, entry: HistoryEntry) {
        self.redo.clear();
        self.undo.push(entry);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    /// Take the most recent entry for undoing.
    pub(crate) fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo.pop()
    }

    /// Park an undone entry on the redo stack.
    pub(crate) fn push_undone(&mut self, entry: HistoryEntry) {
        self.redo.push(entry);
    }

    /// Take the most recent undone entry for redoing.
    pub(crate) fn pop_redo(&mut self) -> Option<HistoryEntry> {
        self.redo.pop()
    }

    /// Put a redone entry back on the undo stack without touching redo.
    pub(crate) fn push_redone(&mut self, entry: HistoryEntry) {
        self.undo.push(entry);
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Label of the entry the next undo would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo.last().map(HistoryEntry::label)
    }

    /// Label of the entry the next redo would reapply.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(HistoryEntry::label)
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;
    use sprocket_core::ItemId;

    fn entry(label: &str) -> HistoryEntry {
        HistoryEntry::new(
            label,
            smallvec![AtomicOp::SetClipState {
                clip: ItemId::from_raw(0),
                old_track: None,
                old_position: 0,
                new_track: None,
                new_position: 0,
            }],
        )
    }

    #[test]
    fn push_clears_redo() {
        let mut stack = UndoStack::new(100);
        stack.push(entry("Move clip"));
        let e = stack.pop_undo().unwrap();
        stack.push_undone(e);
        assert!(stack.can_redo());

        stack.push(entry("Resize clip"));
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_label(), Some("Resize clip"));
    }

    #[test]
    fn redo_roundtrip_keeps_entry() {
        let mut stack = UndoStack::new(100);
        stack.push(entry("Group clips"));
        let e = stack.pop_undo().unwrap();
        stack.push_undone(e);
        assert_eq!(stack.redo_label(), Some("Group clips"));

        let e = stack.pop_redo().unwrap();
        stack.push_redone(e);
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn max_depth_drops_oldest() {
        let mut stack = UndoStack::new(3);
        for i in 0..5 {
            stack.push(entry(&format!("edit {i}")));
        }
        assert_eq!(stack.undo_count(), 3);
        assert_eq!(stack.undo_label(), Some("edit 4"));
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut stack = UndoStack::default();
        stack.push(entry("Move clip"));
        let e = stack.pop_undo().unwrap();
        stack.push_undone(e);
        stack.push(entry("Move clip"));
        stack.clear();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }
}
