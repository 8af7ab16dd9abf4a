use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::media::VideoClip;

/// RGB multiplier used by [`Filter::ColorBoost`]
pub const COLOR_BOOST_FACTOR: f32 = 1.5;

/// RGB multiplier used by [`Filter::BrightnessBoost`]
pub const BRIGHTNESS_BOOST_FACTOR: f32 = 1.2;

/// Visual filter applied to every clip before the transition step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Filter {
    #[default]
    None,
    Grayscale,
    Sepia,
    ColorBoost,
    Invert,
    BrightnessBoost,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::None,
        Filter::Grayscale,
        Filter::Sepia,
        Filter::ColorBoost,
        Filter::Invert,
        Filter::BrightnessBoost,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::ColorBoost => "color-boost",
            Self::Invert => "invert",
            Self::BrightnessBoost => "brightness-boost",
        }
    }

    /// Look a filter up by name
    ///
    /// Unknown names fall back to [`Filter::None`].
    pub fn from_name(name: &str) -> Self {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.name().eq_ignore_ascii_case(wanted))
            .unwrap_or_else(|| {
                warn!("Unknown filter '{}', no filter will be applied", name);
                Self::None
            })
    }

    /// Apply this filter to a clip
    pub fn apply(self, clip: VideoClip) -> VideoClip {
        clip.filtered(self)
    }

    /// The ffmpeg filter chain that implements this filter
    pub fn ffmpeg_chain(self) -> Option<String> {
        let multiply = |factor: f32| {
            let expr = format!("'clip(val*{},0,255)'", factor);
            format!("lutrgb=r={expr}:g={expr}:b={expr}")
        };

        match self {
            Self::None => None,
            Self::Grayscale => Some("hue=s=0".to_string()),
            Self::Sepia => Some(
                "colorchannelmixer=.393:.769:.189:0:.349:.686:.168:0:.272:.534:.131".to_string(),
            ),
            Self::ColorBoost => Some(multiply(COLOR_BOOST_FACTOR)),
            Self::Invert => Some("negate".to_string()),
            Self::BrightnessBoost => Some(multiply(BRIGHTNESS_BOOST_FACTOR)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Filter {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Filter> for String {
    fn from(filter: Filter) -> Self {
        filter.name().to_string()
    }
}
