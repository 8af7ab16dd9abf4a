//! # Composition Engine
//!
//! The edit engine runs one processing request end to end: stage the
//! uploads, open and prepare every clip, join them, fit the soundtrack, and
//! encode the result.

pub mod engine;

// Re-exports for convenience
pub use engine::{EditEngine, EditRequest, RenderedVideo};
