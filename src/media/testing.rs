//! Fixtures shared by the unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{MediaError, Result};
use crate::media::audio::AudioClip;
use crate::media::backend::MediaBackend;
use crate::media::clip::VideoClip;
use crate::media::types::{MediaInfo, MediaSource};

pub(crate) fn video_info(duration: f64) -> MediaInfo {
    MediaInfo {
        duration,
        resolution: Some((640, 480)),
        has_audio: true,
    }
}

pub(crate) fn audio_info(duration: f64) -> MediaInfo {
    MediaInfo {
        duration,
        resolution: None,
        has_audio: true,
    }
}

pub(crate) fn video_clip(name: &str, duration: f64) -> VideoClip {
    VideoClip::open(MediaSource::new(name, video_info(duration))).unwrap()
}

pub(crate) fn silent_video_clip(name: &str, duration: f64) -> VideoClip {
    let info = MediaInfo {
        has_audio: false,
        ..video_info(duration)
    };
    VideoClip::open(MediaSource::new(name, info)).unwrap()
}

pub(crate) fn audio_clip(name: &str, duration: f64) -> AudioClip {
    AudioClip::open(MediaSource::new(name, audio_info(duration))).unwrap()
}

/// Backend double that answers probes from a table and records every run
///
/// Probes match on the end of the file name, so staged copies such as
/// `video_00_a.mp4` resolve to the entry for `a.mp4`. Successful runs write
/// a placeholder to the last argument, which is always the output file.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    media: HashMap<String, MediaInfo>,
    pub(crate) runs: Mutex<Vec<Vec<String>>>,
    fail_runs: bool,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_media(mut self, name: &str, info: MediaInfo) -> Self {
        self.media.insert(name.to_string(), info);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_runs = true;
        self
    }

    pub(crate) fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }
}

impl MediaBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        self.media
            .iter()
            .find(|(name, _)| file_name.ends_with(name.as_str()))
            .map(|(_, info)| info.clone())
            .ok_or_else(|| {
                MediaError::ProbeFailed {
                    path: path.display().to_string(),
                    reason: "unknown test media".to_string(),
                }
                .into()
            })
    }

    fn run(&self, args: &[String]) -> Result<()> {
        self.runs.lock().unwrap().push(args.to_vec());

        if self.fail_runs {
            return Err(MediaError::EncodingFailed {
                reason: "encoder refused the job".to_string(),
            }
            .into());
        }

        if let Some(output) = args.last() {
            std::fs::write(output, b"rendered")?;
        }
        Ok(())
    }
}
