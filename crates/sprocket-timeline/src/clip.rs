//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use sprocket_core::ItemId;

/// Reference to a media source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipSource {
    /// Path or resource string of the media
    pub path: String,
    /// Producer service used by the composition engine
    pub service: String,
    /// Source length in frames
    pub length: i64,
    /// Content hash of the media file (empty if not yet computed)
    pub hash: String,
}

impl ClipSource {
    /// Create a reference to a media file.
    pub fn new(path: impl Into<String>, length: i64) -> Self {
        Self {
            path: path.into(),
            service: "avformat".into(),
            length,
            hash: String::new(),
        }
    }

    /// Create a synthetic color producer (useful for tests and slugs).
    pub fn color(name: impl Into<String>, length: i64) -> Self {
        Self {
            path: name.into(),
            service: "color".into(),
            length,
            hash: String::new(),
        }
    }
}

/// A placed instance of a media source.
///
/// The clip's id is immutable for its lifetime. Position and owning track
/// are only mutated by the model's transactional ops so that the track
/// placement maps never go out of sync with the clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    id: ItemId,
    /// Display name
    pub name: String,
    /// Source media reference
    pub source: ClipSource,
    in_point: i64,
    out_point: i64,
    position: i64,
    track: Option<ItemId>,
    /// Playback speed (1.0 = normal)
    pub speed: f64,
    /// Is clip enabled
    pub enabled: bool,
    /// Fade-in length in frames
    pub fade_in: i64,
    /// Fade-out length in frames
    pub fade_out: i64,
}

impl Clip {
    pub(crate) fn new(id: ItemId, name: impl Into<String>, source: ClipSource) -> Self {
        let out_point = source.length;
        Self {
            id,
            name: name.into(),
            source,
            in_point: 0,
            out_point,
            position: 0,
            track: None,
            speed: 1.0,
            enabled: true,
            fade_in: 0,
            fade_out: 0,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Start frame on the timeline.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Owning track, `None` while unplaced.
    pub fn track(&self) -> Option<ItemId> {
        self.track
    }

    /// Source in point (inclusive).
    pub fn in_point(&self) -> i64 {
        self.in_point
    }

    /// Source out point (exclusive).
    pub fn out_point(&self) -> i64 {
        self.out_point
    }

    /// Number of frames the clip occupies on the timeline.
    pub fn playtime(&self) -> i64 {
        self.out_point - self.in_point
    }

    /// One past the last timeline frame of the clip.
    pub fn end(&self) -> i64 {
        self.position + self.playtime()
    }

    pub(crate) fn set_position(&mut self, position: i64) {
        self.position = position;
    }

    pub(crate) fn set_track(&mut self, track: Option<ItemId>) {
        self.track = track;
    }

    pub(crate) fn set_points(&mut self, in_point: i64, out_point: i64) {
        debug_assert!(in_point < out_point);
        self.in_point = in_point;
        self.out_point = out_point;
    }

    /// Geometry of a resize to `size` frames, growing or shrinking from
    /// the right edge (`right == true`) or the left edge. Returns
    /// `(new_position, new_in, new_out)`, or `None` if the new extent
    /// would leave the source bounds or the timeline.
    pub(crate) fn resize_geometry(&self, size: i64, right: bool) -> Option<(i64, i64, i64)> {
        if size <= 0 {
            return None;
        }
        if right {
            let new_out = self.in_point + size;
            if new_out > self.source.length {
                return None;
            }
            Some((self.position, self.in_point, new_out))
        } else {
            let new_in = self.out_point - size;
            let new_position = self.position + self.playtime() - size;
            if new_in < 0 || new_position < 0 {
                return None;
            }
            Some((new_position, new_in, self.out_point))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(len: i64) -> Clip {
        Clip::new(ItemId::from_raw(0), "test", ClipSource::color("red", len))
    }

    #[test]
    fn fresh_clip_spans_full_source() {
        let c = clip(100);
        assert_eq!(c.playtime(), 100);
        assert_eq!(c.in_point(), 0);
        assert_eq!(c.out_point(), 100);
        assert!(c.track().is_none());
    }

    #[test]
    fn resize_right_shrinks_out_point() {
        let c = clip(100);
        let (pos, inp, out) = c.resize_geometry(50, true).unwrap();
        assert_eq!((pos, inp, out), (0, 0, 50));
    }

    #[test]
    fn resize_right_respects_source_length() {
        let c = clip(100);
        assert!(c.resize_geometry(101, true).is_none());
    }

    #[test]
    fn resize_left_moves_position() {
        let mut c = clip(100);
        c.set_position(40);
        c.set_points(20, 100);
        let (pos, inp, out) = c.resize_geometry(60, false).unwrap();
        assert_eq!((pos, inp, out), (60, 40, 100));
    }

    #[test]
    fn resize_left_cannot_cross_source_start() {
        let c = clip(100);
        assert!(c.resize_geometry(150, false).is_none());
    }

    #[test]
    fn zero_size_rejected() {
        let c = clip(100);
        assert!(c.resize_geometry(0, true).is_none());
        assert!(c.resize_geometry(-5, false).is_none());
    }
}
