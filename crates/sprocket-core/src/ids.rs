//! Item identity.
//!
//! Clips, tracks and groups share one id space: a session-wide
//! monotonically increasing counter owned by the timeline model. Ids are
//! never reused within a session; a new model starts the counter over.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a timeline item (clip, track or group).
///
/// Immutable for the lifetime of the item it names.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ItemId(i32);

impl ItemId {
    /// Construct an id from a raw integer. Intended for tests and
    /// deserialization; live ids come from [`IdAllocator`].
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id allocator shared by clips, tracks and groups.
///
/// Owned by the aggregate model; never exposed as a global.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next: i32,
}

impl IdAllocator {
    /// Fresh allocator starting at zero.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> ItemId {
        let id = ItemId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn allocated(&self) -> usize {
        self.next as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic() {
        let mut alloc = IdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        assert!(a < b && b < c);
        assert_eq!(alloc.allocated(), 3);
    }

    #[test]
    fn raw_roundtrip() {
        let id = ItemId::from_raw(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.to_string(), "#42");
    }
}
