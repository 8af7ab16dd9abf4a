use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{MediaError, Result};
use crate::media::types::MediaInfo;

/// How much of the encoder's stderr is kept in an error message
const STDERR_TAIL_LINES: usize = 12;

/// External toolkit that opens, measures and renders media
///
/// The engine never decodes anything itself: it probes files through the
/// backend and hands it complete command lines to execute.
pub trait MediaBackend: Send + Sync {
    /// Backend name
    fn name(&self) -> &str;

    /// Check if the toolkit is installed on this system
    fn is_available(&self) -> bool;

    /// Read duration, picture size and stream layout of a file
    fn probe(&self, path: &Path) -> Result<MediaInfo>;

    /// Run one encoder invocation to completion
    fn run(&self, args: &[String]) -> Result<()>;
}

/// Backend driving the `ffmpeg` and `ffprobe` executables
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegBackend {
    pub fn new<P: Into<PathBuf>>(ffmpeg: P, ffprobe: P) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn tool_responds(program: &Path) -> bool {
        Command::new(program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl MediaBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn is_available(&self) -> bool {
        Self::tool_responds(&self.ffmpeg) && Self::tool_responds(&self.ffprobe)
    }

    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        debug!("Probing {:?}", path);

        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration:stream=codec_type,width,height,duration",
                "-of",
                "json",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MediaError::ProbeFailed {
                path: path.display().to_string(),
                reason: format!("could not run {}: {}", self.ffprobe.display(), e),
            })?;

        if !output.status.success() {
            return Err(MediaError::ProbeFailed {
                path: path.display().to_string(),
                reason: stderr_tail(&output.stderr),
            }
            .into());
        }

        parse_probe_output(path, &String::from_utf8_lossy(&output.stdout))
    }

    fn run(&self, args: &[String]) -> Result<()> {
        debug!("Running {} {}", self.ffmpeg.display(), args.join(" "));

        let output = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| MediaError::EncodingFailed {
                reason: format!("FFmpeg execution failed: {}", e),
            })?;

        if !output.status.success() {
            return Err(MediaError::EncodingFailed {
                reason: format!("FFmpeg failed: {}", stderr_tail(&output.stderr)),
            }
            .into());
        }

        info!("FFmpeg pass finished");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
}

/// Turn `ffprobe -of json` output into [`MediaInfo`]
///
/// The container duration covers its longest stream, so a file with a
/// video stream is measured by that stream when ffprobe reports it.
pub(crate) fn parse_probe_output(path: &Path, json: &str) -> Result<MediaInfo> {
    let probe_failed = |reason: String| MediaError::ProbeFailed {
        path: path.display().to_string(),
        reason,
    };

    let parsed: ProbeOutput =
        serde_json::from_str(json).map_err(|e| probe_failed(format!("unreadable probe output: {}", e)))?;

    let video_duration = parsed
        .streams
        .iter()
        .filter(|stream| stream.codec_type.as_deref() == Some("video"))
        .find_map(|stream| parse_seconds(stream.duration.as_deref()));

    let duration = video_duration
        .or_else(|| parse_seconds(parsed.format.as_ref().and_then(|format| format.duration.as_deref())))
        .ok_or_else(|| probe_failed("no duration reported".to_string()))?;

    let resolution = parsed
        .streams
        .iter()
        .filter(|stream| stream.codec_type.as_deref() == Some("video"))
        .find_map(|stream| Some((stream.width?, stream.height?)));

    let has_audio = parsed
        .streams
        .iter()
        .any(|stream| stream.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        duration,
        resolution,
        has_audio,
    })
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
