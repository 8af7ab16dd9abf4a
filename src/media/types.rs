use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Stream information reported by the probe for a single media file
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,

    /// Picture size (width, height), if the file has a video stream
    pub resolution: Option<(u32, u32)>,

    /// Whether the file carries an audio stream
    pub has_audio: bool,
}

/// An opened media file: where it lives and what the probe found
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub path: PathBuf,
    pub info: MediaInfo,
}

impl MediaSource {
    pub fn new<P: Into<PathBuf>>(path: P, info: MediaInfo) -> Self {
        Self {
            path: path.into(),
            info,
        }
    }
}

/// Output container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mp4,
    Avi,
    Mov,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Mp4, ExportFormat::Avi, ExportFormat::Mov];

    /// File extension, also used as the container name
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Avi => "video/x-msvideo",
            Self::Mov => "video/quicktime",
        }
    }

    pub fn video_codec(self) -> &'static str {
        "libx264"
    }

    pub fn audio_codec(self) -> &'static str {
        match self {
            Self::Mp4 | Self::Mov => "aac",
            Self::Avi => "libmp3lame",
        }
    }

    /// Extra muxer flags for the container
    pub fn muxer_args(self) -> &'static [&'static str] {
        match self {
            Self::Mp4 | Self::Mov => &["-movflags", "+faststart"],
            Self::Avi => &[],
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "output.format".to_string(),
                value: s.to_string(),
            })
    }
}
