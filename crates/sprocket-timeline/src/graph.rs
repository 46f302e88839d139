//! Seam to the media composition engine.
//!
//! The model talks to the compositing backend only through this trait:
//! structural track insertion/removal and per-track properties. All calls
//! are serialized through the single-threaded model, so implementations
//! need no internal locking.

use std::collections::HashMap;

use sprocket_core::{Result, TimelineError};

/// The narrow surface of the underlying composition engine.
pub trait CompositionGraph: std::fmt::Debug {
    /// Insert a track at the given index, shifting later tracks down.
    fn insert_track(&mut self, index: usize) -> Result<()>;

    /// Remove the track at the given index.
    fn remove_track(&mut self, index: usize) -> Result<()>;

    /// Set a property on the track at the given index.
    fn set_track_property(&mut self, index: usize, key: &str, value: &str) -> Result<()>;

    /// Read a property back, if set.
    fn track_property(&self, index: usize, key: &str) -> Option<String>;

    /// Number of tracks currently in the graph.
    fn tracks_count(&self) -> usize;
}

/// In-memory composition graph: the engine default, and what tests run
/// against. Tracks are property bags in display order.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    tracks: Vec<HashMap<String, String>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CompositionGraph for MemoryGraph {
    fn insert_track(&mut self, index: usize) -> Result<()> {
        if index > self.tracks.len() {
            return Err(TimelineError::InvalidTrackIndex(index));
        }
        self.tracks.insert(index, HashMap::new());
        Ok(())
    }

    fn remove_track(&mut self, index: usize) -> Result<()> {
        if index >= self.tracks.len() {
            return Err(TimelineError::InvalidTrackIndex(index));
        }
        self.tracks.remove(index);
        Ok(())
    }

    fn set_track_property(&mut self, index: usize, key: &str, value: &str) -> Result<()> {
        let track = self
            .tracks
            .get_mut(index)
            .ok_or(TimelineError::InvalidTrackIndex(index))?;
        track.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn track_property(&self, index: usize, key: &str) -> Option<String> {
        self.tracks.get(index)?.get(key).cloned()
    }

    fn tracks_count(&self) -> usize {
        self.tracks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove_shift_indices() {
        let mut g = MemoryGraph::new();
        g.insert_track(0).unwrap();
        g.insert_track(1).unwrap();
        g.insert_track(1).unwrap();
        assert_eq!(g.tracks_count(), 3);
        g.remove_track(1).unwrap();
        assert_eq!(g.tracks_count(), 2);
    }

    #[test]
    fn out_of_range_indices_error() {
        let mut g = MemoryGraph::new();
        assert!(g.insert_track(1).is_err());
        assert!(g.remove_track(0).is_err());
        assert!(g.set_track_property(0, "height", "60").is_err());
    }

    #[test]
    fn properties_roundtrip() {
        let mut g = MemoryGraph::new();
        g.insert_track(0).unwrap();
        g.set_track_property(0, "height", "140").unwrap();
        assert_eq!(g.track_property(0, "height").as_deref(), Some("140"));
        assert_eq!(g.track_property(0, "muted"), None);
    }
}
