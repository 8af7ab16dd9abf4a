use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    composition::{engine::remove_if_present, EditEngine, EditRequest, RenderedVideo},
    effects::{Filter, Transition},
    error::{ConfigError, ProcessError, Result},
    media::ExportFormat,
    session::workspace::{Download, Upload, Workspace, AUDIO_EXTENSIONS, VIDEO_EXTENSIONS},
};

/// Accepted output widths in pixels
pub const WIDTH_RANGE: RangeInclusive<u32> = 320..=3840;

/// Accepted output heights in pixels
pub const HEIGHT_RANGE: RangeInclusive<u32> = 240..=2160;

/// What the user asked for: output size, filter, transition and container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSettings {
    pub width: u32,
    pub height: u32,
    pub filter: Filter,
    pub transition: Transition,
    pub format: ExportFormat,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            filter: Filter::None,
            transition: Transition::None,
            format: ExportFormat::Mp4,
        }
    }
}

impl EditSettings {
    pub fn validate(&self) -> Result<()> {
        if !WIDTH_RANGE.contains(&self.width) {
            return Err(ConfigError::InvalidValue {
                key: "output.width".to_string(),
                value: self.width.to_string(),
            }
            .into());
        }

        if !HEIGHT_RANGE.contains(&self.height) {
            return Err(ConfigError::InvalidValue {
                key: "output.height".to_string(),
                value: self.height.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// One-line description of a run over `video_count` clips
    pub fn summary(&self, video_count: usize) -> String {
        format!(
            "{} video(s) -> {}x{}, filter: {}, transition: {}, format: {}",
            video_count, self.width, self.height, self.filter, self.transition, self.format
        )
    }
}

/// State of one editing session
///
/// Holds the uploads and selections between runs, the outcome of the last
/// run, and the scratch workspace the outputs live in.
#[derive(Debug)]
pub struct Session {
    videos: Vec<Upload>,
    audio: Option<Upload>,
    pub settings: EditSettings,
    processing_complete: bool,
    output: Option<RenderedVideo>,
    workspace: Workspace,
}

impl Session {
    /// Start a session with its own workspace in the system temp directory
    pub fn new(settings: EditSettings) -> Result<Self> {
        Ok(Self::with_workspace(settings, Workspace::new()?))
    }

    pub fn with_workspace(settings: EditSettings, workspace: Workspace) -> Self {
        Self {
            videos: Vec::new(),
            audio: None,
            settings,
            processing_complete: false,
            output: None,
            workspace,
        }
    }

    /// Replace the uploaded clips
    ///
    /// Nothing changes unless every upload is an accepted video.
    pub fn set_videos(&mut self, uploads: Vec<Upload>) -> Result<()> {
        for upload in &uploads {
            upload.ensure_kind("video", VIDEO_EXTENSIONS)?;
        }
        self.videos = uploads;
        Ok(())
    }

    pub fn add_video(&mut self, upload: Upload) -> Result<()> {
        upload.ensure_kind("video", VIDEO_EXTENSIONS)?;
        self.videos.push(upload);
        Ok(())
    }

    pub fn set_audio(&mut self, upload: Upload) -> Result<()> {
        upload.ensure_kind("audio", AUDIO_EXTENSIONS)?;
        self.audio = Some(upload);
        Ok(())
    }

    pub fn clear_audio(&mut self) {
        self.audio = None;
    }

    pub fn videos(&self) -> &[Upload] {
        &self.videos
    }

    pub fn audio(&self) -> Option<&Upload> {
        self.audio.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.processing_complete
    }

    pub fn output_file(&self) -> Option<&Path> {
        self.output.as_ref().map(|rendered| rendered.path.as_path())
    }

    /// Container of the last rendered file
    pub fn output_format(&self) -> Option<ExportFormat> {
        self.output.as_ref().map(|rendered| rendered.format)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Render the current uploads with the current settings
    ///
    /// The previous result is dropped, file included, as soon as a new run
    /// starts; on failure the session stays incomplete with no output
    /// recorded.
    pub async fn process(&mut self, engine: &EditEngine) -> std::result::Result<PathBuf, ProcessError> {
        self.processing_complete = false;
        if let Some(previous) = self.output.take() {
            remove_if_present(&previous.path).await;
        }

        info!("Processing {}", self.settings.summary(self.videos.len()));

        let rendered = engine
            .process(EditRequest {
                videos: &self.videos,
                audio: self.audio.as_ref(),
                settings: &self.settings,
                workspace: &self.workspace,
            })
            .await?;

        let path = rendered.path.clone();
        self.output = Some(rendered);
        self.processing_complete = true;
        Ok(path)
    }

    /// The last rendered file, if the last run completed
    pub async fn download(&self) -> Result<Option<Download>> {
        let rendered = match (&self.output, self.processing_complete) {
            (Some(rendered), true) => rendered,
            _ => return Ok(None),
        };

        let path = &rendered.path;
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Some(Download {
            file_name,
            mime_type: rendered.format.mime_type(),
            bytes,
        }))
    }
}
