//! Integration test crate for Sprocket.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the engine crates to verify they work together.

#[cfg(test)]
mod timeline;
