//! # Media Module
//!
//! Clip descriptions and the external toolkit that renders them.
//!
//! A [`VideoClip`] or [`AudioClip`] records an opened file plus the chain of
//! operations applied to it (resize, filter, fades, concatenation, trims).
//! Nothing is decoded until the [`EncodePlan`] built from a clip is handed to
//! a [`MediaBackend`], which by default drives the `ffmpeg` executables.

pub mod audio;
pub mod backend;
pub mod clip;
pub mod encoder;
pub mod graph;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use audio::{fit_to_duration, AudioClip, AudioNode};
pub use backend::{FfmpegBackend, MediaBackend};
pub use clip::{ConcatMethod, VideoClip, VideoNode};
pub use encoder::EncodePlan;
pub use graph::FilterGraph;
pub use types::{ExportFormat, MediaInfo, MediaSource};
