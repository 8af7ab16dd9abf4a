//! # Reel-Composer
//!
//! Merge several video clips into one rendered file, with a visual filter, a
//! transition between clips, and an optional soundtrack looped or trimmed to
//! fit.
//!
//! All decoding, filtering and encoding is done by an external toolkit
//! (`ffmpeg`). This library only describes what should happen to each clip
//! and drives the toolkit.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reel_composer::{
//!     composition::EditEngine,
//!     config::Config,
//!     effects::{Filter, Transition},
//!     media::FfmpegBackend,
//!     session::{EditSettings, Session, Upload},
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let engine = EditEngine::new(config.encode.clone(), Arc::new(FfmpegBackend::default()));
//!
//! let mut session = Session::new(EditSettings {
//!     filter: Filter::Sepia,
//!     transition: Transition::Fade,
//!     ..EditSettings::default()
//! })?;
//! session.add_video(Upload::from_path("intro.mp4").await?)?;
//! session.add_video(Upload::from_path("beach.mp4").await?)?;
//! session.set_audio(Upload::from_path("song.mp3").await?)?;
//!
//! match session.process(&engine).await {
//!     Ok(path) => println!("Rendered {:?}", path),
//!     Err(e) => eprintln!("{}", e.user_message()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`session`] - Per-user state, uploads and the scratch workspace
//! - [`composition`] - The edit engine that runs a processing request
//! - [`effects`] - Filters and transitions
//! - [`media`] - Clip descriptions, the ffmpeg graph builder and backend
//! - [`config`] - Configuration management

pub mod composition;
pub mod config;
pub mod effects;
pub mod error;
pub mod media;
pub mod session;

// Re-export commonly used types for convenience
pub use crate::{
    composition::EditEngine,
    config::Config,
    effects::{Filter, Transition},
    error::{ComposerError, ProcessError, Result},
    media::{ExportFormat, FfmpegBackend, MediaBackend},
    session::{EditSettings, Session, Upload},
};
