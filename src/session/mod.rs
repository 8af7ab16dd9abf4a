//! # Session
//!
//! Per-user editing state: uploads, selections, the result of the last run
//! and the scratch workspace that holds staged inputs and rendered outputs.

pub mod state;
pub mod workspace;

pub use state::{EditSettings, Session, HEIGHT_RANGE, WIDTH_RANGE};
pub use workspace::{Download, StagedFile, Upload, Workspace, AUDIO_EXTENSIONS, VIDEO_EXTENSIONS};
