use crate::effects::Filter;
use crate::error::{MediaError, Result};
use crate::media::audio::AudioClip;
use crate::media::types::MediaSource;

/// How [`VideoClip::concatenate`] lays clips of different sizes out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatMethod {
    /// Play clips back to back at the size of the first clip
    Chain,
    /// Place every clip centred on a canvas as large as the largest clip
    Compose,
}

/// One step in the description of a video clip
#[derive(Debug, Clone, PartialEq)]
pub enum VideoNode {
    Source(MediaSource),
    Resized(Box<VideoClip>),
    Filtered {
        input: Box<VideoClip>,
        filter: Filter,
    },
    /// Fades out over the last `duration` seconds into whatever follows it
    CrossFadeOut {
        input: Box<VideoClip>,
        duration: f64,
    },
    /// Stationary until `hold`, then moves left by one width per second
    SlideOut {
        input: Box<VideoClip>,
        hold: f64,
    },
    Concat {
        clips: Vec<VideoClip>,
        method: ConcatMethod,
    },
    WithAudio {
        input: Box<VideoClip>,
        audio: AudioClip,
    },
}

/// Handle to an opened video and the chain of operations applied to it
///
/// Clips never touch pixels. They only record what should happen so the
/// media backend can render it later, while keeping duration and picture
/// size known at every step.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoClip {
    node: VideoNode,
    duration: f64,
    size: (u32, u32),
}

impl VideoClip {
    /// Open a probed file as a clip
    pub fn open(source: MediaSource) -> Result<Self> {
        let path = source.path.display().to_string();
        let size = source
            .info
            .resolution
            .ok_or_else(|| MediaError::NoVideoStream { path: path.clone() })?;

        if !(source.info.duration > 0.0) {
            return Err(MediaError::EmptyDuration { path }.into());
        }

        Ok(Self {
            duration: source.info.duration,
            size,
            node: VideoNode::Source(source),
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.0
    }

    pub fn height(&self) -> u32 {
        self.size.1
    }

    pub fn node(&self) -> &VideoNode {
        &self.node
    }

    /// Length of the cross-fade this clip carries into the next one
    pub fn fade_out_secs(&self) -> f64 {
        match &self.node {
            VideoNode::CrossFadeOut { duration, .. } => *duration,
            _ => 0.0,
        }
    }

    /// Scale the picture to exactly `width` x `height`
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.size == (width, height) {
            return self;
        }
        Self {
            duration: self.duration,
            size: (width, height),
            node: VideoNode::Resized(Box::new(self)),
        }
    }

    pub fn filtered(self, filter: Filter) -> Self {
        if filter == Filter::None {
            return self;
        }
        Self {
            duration: self.duration,
            size: self.size,
            node: VideoNode::Filtered {
                input: Box::new(self),
                filter,
            },
        }
    }

    /// Fade out over the last `secs` seconds, clamped to the clip length
    pub fn crossfade_out(self, secs: f64) -> Self {
        let fade = secs.clamp(0.0, self.duration);
        Self {
            duration: self.duration,
            size: self.size,
            node: VideoNode::CrossFadeOut {
                input: Box::new(self),
                duration: fade,
            },
        }
    }

    /// Slide out to the left during the last `secs` seconds
    pub fn slide_out(self, secs: f64) -> Self {
        let hold = (self.duration - secs).max(0.0);
        Self {
            duration: self.duration,
            size: self.size,
            node: VideoNode::SlideOut {
                input: Box::new(self),
                hold,
            },
        }
    }

    /// Replace the soundtrack; the clip keeps its own duration
    pub fn with_audio(self, audio: AudioClip) -> Self {
        Self {
            duration: self.duration,
            size: self.size,
            node: VideoNode::WithAudio {
                input: Box::new(self),
                audio,
            },
        }
    }

    /// Join clips in order
    ///
    /// Returns `None` for an empty list. A clip carrying a cross-fade overlaps
    /// the start of the clip after it, shortening the total by the overlap.
    pub fn concatenate(clips: Vec<VideoClip>, method: ConcatMethod) -> Option<Self> {
        let first = clips.first()?;

        let size = match method {
            ConcatMethod::Chain => first.size,
            ConcatMethod::Compose => clips.iter().fold((0, 0), |(w, h), clip| {
                (w.max(clip.width()), h.max(clip.height()))
            }),
        };

        let total: f64 = clips.iter().map(VideoClip::duration).sum();
        let overlap: f64 = junction_overlaps(&clips).iter().sum();

        Some(Self {
            duration: total - overlap,
            size,
            node: VideoNode::Concat { clips, method },
        })
    }
}

/// Overlap in seconds at each junction between consecutive clips
///
/// A fade can never be longer than the clip it fades into.
pub(crate) fn junction_overlaps(clips: &[VideoClip]) -> Vec<f64> {
    clips
        .windows(2)
        .map(|pair| pair[0].fade_out_secs().min(pair[1].duration()))
        .collect()
}
