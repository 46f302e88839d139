//! Error types for Sprocket.
//!
//! Rejected edit requests are reported as boolean failures by the model,
//! never as errors; this type covers fallible infrastructure operations
//! (composition-graph mutations, registration).

use thiserror::Error;

/// Main error type for Sprocket operations.
#[derive(Error, Debug)]
pub enum TimelineError {
    #[error("composition graph error: {0}")]
    Graph(String),

    #[error("unknown item id: {0}")]
    UnknownId(i32),

    #[error("invalid track index: {0}")]
    InvalidTrackIndex(usize),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for Sprocket operations.
pub type Result<T> = std::result::Result<T, TimelineError>;
