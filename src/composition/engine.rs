use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task;
use tracing::{debug, error, info, warn};

use crate::{
    config::EncodeConfig,
    error::{ComposerError, MediaError, ProcessError, Result},
    media::{fit_to_duration, AudioClip, EncodePlan, ExportFormat, MediaBackend, MediaInfo, MediaSource, VideoClip},
    session::{EditSettings, StagedFile, Upload, Workspace},
};

/// Everything one processing run needs, borrowed from the session
#[derive(Debug, Clone, Copy)]
pub struct EditRequest<'a> {
    pub videos: &'a [Upload],
    pub audio: Option<&'a Upload>,
    pub settings: &'a EditSettings,
    pub workspace: &'a Workspace,
}

/// A finished render
#[derive(Debug, Clone)]
pub struct RenderedVideo {
    pub path: PathBuf,
    pub format: ExportFormat,
    pub duration: f64,
    pub file_size: u64,
}

/// Engine that turns uploads and settings into one rendered file
///
/// The pipeline is strictly sequential:
/// 1. Clip Loading - Stage each upload, open it, resize it, filter it
/// 2. Joining - Apply the transition across all clips
/// 3. Soundtrack - Loop/trim the uploaded audio to the video length
/// 4. Encoding - Render soundtrack and picture through the media backend
pub struct EditEngine {
    encode: EncodeConfig,
    backend: Arc<dyn MediaBackend>,
}

impl EditEngine {
    pub fn new(encode: EncodeConfig, backend: Arc<dyn MediaBackend>) -> Self {
        Self { encode, backend }
    }

    pub fn backend(&self) -> &dyn MediaBackend {
        self.backend.as_ref()
    }

    /// Run one request end to end
    ///
    /// An empty clip list is reported as [`ProcessError::NoInput`] before
    /// anything is staged or encoded. Any later failure becomes
    /// [`ProcessError::ProcessingFailed`]; staged inputs and scratch audio are
    /// removed either way.
    pub async fn process(&self, request: EditRequest<'_>) -> std::result::Result<RenderedVideo, ProcessError> {
        if request.videos.is_empty() {
            warn!("Nothing to process: no videos uploaded");
            return Err(ProcessError::NoInput);
        }

        info!("🎬 Starting edit: {}", request.settings.summary(request.videos.len()));

        self.run_pipeline(request).await.map_err(|e| {
            error!("Processing failed: {}", e);
            ProcessError::from(e)
        })
    }

    async fn run_pipeline(&self, request: EditRequest<'_>) -> Result<RenderedVideo> {
        request.settings.validate()?;

        // Staged copies live until the pipeline returns, on every path
        let mut staged = Vec::new();

        // Pipeline Step 1: Clip Loading
        let clips = self.load_clips(&request, &mut staged).await?;

        // Pipeline Step 2: Joining
        let combined = request
            .settings
            .transition
            .apply(clips)
            .ok_or_else(|| ComposerError::generic("no clips to join"))?;
        info!(
            "🔗 Joined clips with '{}' transition: {:.2}s",
            request.settings.transition,
            combined.duration()
        );

        // Pipeline Step 3: Soundtrack
        let final_clip = match request.audio {
            Some(upload) => {
                let staged_audio = request.workspace.stage(upload, "audio").await?;
                let soundtrack = self.load_soundtrack(staged_audio.path(), combined.duration()).await?;
                staged.push(staged_audio);
                combined.with_audio(soundtrack)
            }
            None => combined,
        };

        // Pipeline Step 4: Encoding
        let output = request.workspace.output_path(request.settings.format);
        let rendered = self
            .encode(&final_clip, request.settings.format, &output, &request.workspace.temp_audio_path())
            .await?;

        drop(staged);
        Ok(rendered)
    }

    // ==========================================
    // PIPELINE STEP 1: CLIP LOADING
    // ==========================================

    async fn load_clips(
        &self,
        request: &EditRequest<'_>,
        staged: &mut Vec<StagedFile>,
    ) -> Result<Vec<VideoClip>> {
        info!("📹 Loading {} clip(s)...", request.videos.len());
        let settings = request.settings;
        let mut clips = Vec::with_capacity(request.videos.len());

        for (index, upload) in request.videos.iter().enumerate() {
            let file = request
                .workspace
                .stage(upload, &format!("video_{:02}", index))
                .await?;
            let info = self.probe(file.path()).await?;
            debug!(
                "   {} - {:.2}s, {:?}, audio: {}",
                upload.name(),
                info.duration,
                info.resolution,
                info.has_audio
            );

            let clip = VideoClip::open(MediaSource::new(file.path(), info))?
                .resized(settings.width, settings.height);
            clips.push(settings.filter.apply(clip));
            staged.push(file);
        }

        Ok(clips)
    }

    // ==========================================
    // PIPELINE STEP 3: SOUNDTRACK
    // ==========================================

    async fn load_soundtrack(&self, path: &Path, video_duration: f64) -> Result<AudioClip> {
        let info = self.probe(path).await?;
        info!(
            "🎵 Fitting {:.2}s of audio to {:.2}s of video",
            info.duration, video_duration
        );
        let audio = AudioClip::open(MediaSource::new(path, info))?;
        fit_to_duration(audio, video_duration)
    }

    // ==========================================
    // PIPELINE STEP 4: ENCODING
    // ==========================================

    async fn encode(
        &self,
        clip: &VideoClip,
        format: ExportFormat,
        output: &Path,
        temp_audio: &Path,
    ) -> Result<RenderedVideo> {
        info!("💾 Encoding {:.2}s to {:?}", clip.duration(), output);
        let plan = EncodePlan::build(clip, format, &self.encode, output, temp_audio);

        let result = self.run_plan(&plan).await;
        remove_if_present(&plan.temp_audio).await;
        if let Err(e) = result {
            remove_if_present(&plan.output).await;
            return Err(e);
        }

        let metadata = tokio::fs::metadata(&plan.output).await.map_err(|e| MediaError::EncodingFailed {
            reason: format!("no output written to {}: {}", plan.output.display(), e),
        })?;

        info!("   ✅ Output ready: {:.1} MB", metadata.len() as f64 / 1024.0 / 1024.0);

        Ok(RenderedVideo {
            path: plan.output,
            format,
            duration: plan.duration,
            file_size: metadata.len(),
        })
    }

    async fn run_plan(&self, plan: &EncodePlan) -> Result<()> {
        debug!("Rendering soundtrack to {:?}", plan.temp_audio);
        self.run(plan.soundtrack_pass.clone()).await?;
        debug!("Rendering picture to {:?}", plan.output);
        self.run(plan.picture_pass.clone()).await
    }

    // ==========================================
    // BACKEND CALLS
    // ==========================================

    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let backend = Arc::clone(&self.backend);
        let path = path.to_path_buf();
        task::spawn_blocking(move || backend.probe(&path))
            .await
            .map_err(|e| ComposerError::generic(format!("probe task failed: {}", e)))?
    }

    async fn run(&self, args: Vec<String>) -> Result<()> {
        let backend = Arc::clone(&self.backend);
        task::spawn_blocking(move || backend.run(&args))
            .await
            .map_err(|e| MediaError::EncodingFailed {
                reason: format!("Failed to spawn encoder task: {}", e),
            })?
    }
}

/// Delete a file, tolerating one that is already gone
pub(crate) async fn remove_if_present(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Filter, Transition};
    use crate::media::testing::{audio_info, video_info, RecordingBackend};

    fn engine_with(backend: RecordingBackend) -> (EditEngine, Arc<RecordingBackend>) {
        let backend = Arc::new(backend);
        (EditEngine::new(EncodeConfig::default(), backend.clone()), backend)
    }

    fn uploads(names: &[&str]) -> Vec<Upload> {
        names.iter().map(|name| Upload::new(*name, vec![0; 8])).collect()
    }

    fn three_clip_backend() -> RecordingBackend {
        RecordingBackend::new()
            .with_media("a.mp4", video_info(5.0))
            .with_media("b.mp4", video_info(5.0))
            .with_media("c.mp4", video_info(5.0))
    }

    fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|arg| arg == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[tokio::test]
    async fn test_no_videos_never_encodes() {
        let (engine, backend) = engine_with(RecordingBackend::new());
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings::default();
        let audio = Upload::new("song.mp3", vec![0; 8]);

        let result = engine
            .process(EditRequest {
                videos: &[],
                audio: Some(&audio),
                settings: &settings,
                workspace: &workspace,
            })
            .await;

        assert!(matches!(result, Err(ProcessError::NoInput)));
        assert_eq!(backend.run_count(), 0);
        assert_eq!(std::fs::read_dir(workspace.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_hard_cut_of_three_clips() {
        let (engine, backend) = engine_with(three_clip_backend());
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings::default();
        let videos = uploads(&["a.mp4", "b.mp4", "c.mp4"]);

        let rendered = engine
            .process(EditRequest {
                videos: &videos,
                audio: None,
                settings: &settings,
                workspace: &workspace,
            })
            .await
            .unwrap();

        assert!((rendered.duration - 15.0).abs() < 1e-9);
        assert_eq!(rendered.format, ExportFormat::Mp4);
        assert!(rendered.path.exists());
        assert_eq!(backend.run_count(), 2);
    }

    #[tokio::test]
    async fn test_fade_of_three_clips() {
        let (engine, backend) = engine_with(three_clip_backend());
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings {
            transition: Transition::Fade,
            filter: Filter::Grayscale,
            ..EditSettings::default()
        };
        let videos = uploads(&["a.mp4", "b.mp4", "c.mp4"]);

        let rendered = engine
            .process(EditRequest {
                videos: &videos,
                audio: None,
                settings: &settings,
                workspace: &workspace,
            })
            .await
            .unwrap();

        assert!((rendered.duration - 13.0).abs() < 1e-9);

        let runs = backend.runs.lock().unwrap();
        let picture = &runs[1];
        let graph = arg_after(picture, "-filter_complex").unwrap();
        assert_eq!(graph.matches("hue=s=0").count(), 3);
        assert_eq!(graph.matches("scale=1280:720").count(), 3);
        assert_eq!(graph.matches("xfade=").count(), 2);
    }

    #[tokio::test]
    async fn test_soundtrack_is_fitted_and_scratch_removed() {
        let (engine, backend) = engine_with(
            RecordingBackend::new()
                .with_media("a.mp4", video_info(10.0))
                .with_media("song.mp3", audio_info(4.0)),
        );
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings::default();
        let videos = uploads(&["a.mp4"]);
        let audio = Upload::new("song.mp3", vec![0; 8]);

        let rendered = engine
            .process(EditRequest {
                videos: &videos,
                audio: Some(&audio),
                settings: &settings,
                workspace: &workspace,
            })
            .await
            .unwrap();

        let runs = backend.runs.lock().unwrap();
        let soundtrack = &runs[0];
        assert_eq!(soundtrack.last().map(String::as_str), workspace.temp_audio_path().to_str());
        let graph = arg_after(soundtrack, "-filter_complex").unwrap();
        assert_eq!(soundtrack.iter().filter(|arg| *arg == "-i").count(), 1);
        assert!(graph.contains("aloop=loop=2:"));
        assert!(graph.contains("atrim=start=0.000:end=10.000"));

        assert!(!workspace.temp_audio_path().exists());
        // only the rendered output is left behind
        let left: Vec<_> = std::fs::read_dir(workspace.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(left, vec![rendered.path]);
    }

    #[tokio::test]
    async fn test_encoder_failure_is_reported_and_cleaned_up() {
        let (engine, backend) = engine_with(three_clip_backend().failing());
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings::default();
        let videos = uploads(&["a.mp4", "b.mp4"]);

        let result = engine
            .process(EditRequest {
                videos: &videos,
                audio: None,
                settings: &settings,
                workspace: &workspace,
            })
            .await;

        match result {
            Err(ProcessError::ProcessingFailed(detail)) => {
                assert!(detail.contains("encoder refused the job"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(backend.run_count(), 1);
        assert_eq!(std::fs::read_dir(workspace.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_clip_fails_processing() {
        let (engine, backend) = engine_with(
            RecordingBackend::new()
                .with_media("a.mp4", video_info(5.0))
                .with_media(
                    "broken.mp4",
                    MediaInfo {
                        duration: 2.0,
                        resolution: None,
                        has_audio: true,
                    },
                ),
        );
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings::default();
        let videos = uploads(&["a.mp4", "broken.mp4"]);

        let result = engine
            .process(EditRequest {
                videos: &videos,
                audio: None,
                settings: &settings,
                workspace: &workspace,
            })
            .await;

        assert!(matches!(result, Err(ProcessError::ProcessingFailed(_))));
        assert_eq!(backend.run_count(), 0);
        assert_eq!(std::fs::read_dir(workspace.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_range_size_is_a_processing_failure() {
        let (engine, backend) = engine_with(three_clip_backend());
        let workspace = Workspace::new().unwrap();
        let settings = EditSettings {
            width: 10,
            ..EditSettings::default()
        };
        let videos = uploads(&["a.mp4"]);

        let result = engine
            .process(EditRequest {
                videos: &videos,
                audio: None,
                settings: &settings,
                workspace: &workspace,
            })
            .await;

        assert!(matches!(result, Err(ProcessError::ProcessingFailed(_))));
        assert_eq!(backend.run_count(), 0);
    }
}
