//! Sprocket Core - Foundation types for the timeline engine
//!
//! This crate provides the fundamental types used throughout Sprocket:
//! - Item identity (ItemId, IdAllocator)
//! - Time representation (RationalTime, FrameRate)
//! - The shared error type

pub mod error;
pub mod ids;
pub mod time;

pub use error::{Result, TimelineError};
pub use ids::{IdAllocator, ItemId};
pub use time::{FrameRate, RationalTime};
