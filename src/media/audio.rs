use tracing::debug;

use crate::error::{MediaError, Result};
use crate::media::types::MediaSource;

/// One step in the description of an audio clip
#[derive(Debug, Clone, PartialEq)]
pub enum AudioNode {
    Source(MediaSource),
    Concat(Vec<AudioClip>),
    Loop {
        input: Box<AudioClip>,
        repeats: usize,
    },
    Subclip {
        input: Box<AudioClip>,
        start: f64,
        end: f64,
    },
}

/// Handle to an opened audio file and the operations applied to it
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    node: AudioNode,
    duration: f64,
}

impl AudioClip {
    /// Open a probed file as an audio clip
    pub fn open(source: MediaSource) -> Result<Self> {
        if !source.info.has_audio {
            return Err(MediaError::ProbeFailed {
                path: source.path.display().to_string(),
                reason: "no audio stream".to_string(),
            }
            .into());
        }
        if !(source.info.duration > 0.0) {
            return Err(MediaError::EmptyDuration {
                path: source.path.display().to_string(),
            }
            .into());
        }

        Ok(Self {
            duration: source.info.duration,
            node: AudioNode::Source(source),
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn node(&self) -> &AudioNode {
        &self.node
    }

    /// Play clips back to back
    pub fn concatenate(clips: Vec<AudioClip>) -> Self {
        Self {
            duration: clips.iter().map(AudioClip::duration).sum(),
            node: AudioNode::Concat(clips),
        }
    }

    /// Play the clip `repeats` times in a row from a single reader
    pub fn looped(self, repeats: usize) -> Self {
        let repeats = repeats.max(1);
        Self {
            duration: self.duration * repeats as f64,
            node: AudioNode::Loop {
                input: Box::new(self),
                repeats,
            },
        }
    }

    /// Keep only `[start, end)`, clamped to the clip
    pub fn subclip(self, start: f64, end: f64) -> Self {
        let end = end.min(self.duration);
        let start = start.clamp(0.0, end);
        Self {
            duration: end - start,
            node: AudioNode::Subclip {
                input: Box::new(self),
                start,
                end,
            },
        }
    }
}

/// Loop and trim `audio` so it lasts exactly `target` seconds
///
/// Shorter audio is repeated `ceil(target / duration)` times before the
/// trim. There is no fade at the loop seam.
pub fn fit_to_duration(audio: AudioClip, target: f64) -> Result<AudioClip> {
    if !(audio.duration() > 0.0) {
        return Err(MediaError::EncodingFailed {
            reason: "audio track has zero length".to_string(),
        }
        .into());
    }

    let looped = if audio.duration() < target {
        let repeats = (target / audio.duration()).ceil() as usize;
        debug!(
            "Looping {:.2}s of audio {} times to cover {:.2}s",
            audio.duration(),
            repeats,
            target
        );
        audio.looped(repeats)
    } else {
        audio
    };

    Ok(looped.subclip(0.0, target))
}
