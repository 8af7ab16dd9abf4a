use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::media::{ConcatMethod, VideoClip};

/// Length of the fade or slide at each junction, in seconds
pub const TRANSITION_SECS: f64 = 1.0;

/// How consecutive clips are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Transition {
    /// Hard cut
    #[default]
    None,
    /// Cross-fade into the next clip
    Fade,
    /// Slide the outgoing clip off to the left
    Slide,
}

impl Transition {
    pub const ALL: [Transition; 3] = [Transition::None, Transition::Fade, Transition::Slide];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fade => "fade",
            Self::Slide => "slide",
        }
    }

    /// Look a transition up by name, falling back to a hard cut
    pub fn from_name(name: &str) -> Self {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|transition| transition.name().eq_ignore_ascii_case(wanted))
            .unwrap_or_else(|| {
                warn!("Unknown transition '{}', clips will be cut together", name);
                Self::None
            })
    }

    /// Join `clips` into one clip using this transition
    ///
    /// Returns `None` when there is nothing to join. A single clip comes back
    /// untouched whatever the transition.
    pub fn apply(self, mut clips: Vec<VideoClip>) -> Option<VideoClip> {
        if clips.len() <= 1 {
            return clips.pop();
        }

        debug!("Joining {} clips with '{}' transition", clips.len(), self);

        let last = clips.len() - 1;
        match self {
            Self::None => VideoClip::concatenate(clips, ConcatMethod::Chain),
            Self::Fade => {
                let faded = clips
                    .into_iter()
                    .enumerate()
                    .map(|(i, clip)| if i < last { clip.crossfade_out(TRANSITION_SECS) } else { clip })
                    .collect();
                VideoClip::concatenate(faded, ConcatMethod::Chain)
            }
            Self::Slide => {
                let sliding = clips
                    .into_iter()
                    .enumerate()
                    .map(|(i, clip)| if i < last { clip.slide_out(TRANSITION_SECS) } else { clip })
                    .collect();
                VideoClip::concatenate(sliding, ConcatMethod::Compose)
            }
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Transition {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Transition> for String {
    fn from(transition: Transition) -> Self {
        transition.name().to_string()
    }
}
