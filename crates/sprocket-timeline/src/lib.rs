//! Sprocket Timeline - Transactional timeline data model
//!
//! Implements the editable, undoable timeline behind the editor:
//! - Tracks of non-overlapping clip placements
//! - Grouping of items for joint manipulation
//! - Atomic mutating requests with composed undo/redo history
//! - A tree projection for observer/view layers
//! - A narrow seam to the media composition engine

pub mod clip;
pub mod graph;
pub mod group;
pub mod history;
pub mod model;
pub mod track;
pub mod view;

mod ops;

pub use clip::{Clip, ClipSource};
pub use graph::{CompositionGraph, MemoryGraph};
pub use group::GroupHierarchy;
pub use history::{HistoryEntry, UndoStack};
pub use model::TimelineModel;
pub use track::{Track, TrackKind};
pub use view::{AttrRole, AttrValue, NodeId, NodeKind};
