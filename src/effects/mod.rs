//! # Effects
//!
//! The fixed set of visual filters and clip transitions.
//!
//! Both are closed enums: a filter maps to exactly one toolkit effect with a
//! hardcoded parameter, and a transition decides how consecutive clips are
//! joined. Neither touches pixels; they only extend the clip description
//! that the media backend renders.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use reel_composer::effects::{Filter, Transition};
//! # fn clips() -> Vec<reel_composer::media::VideoClip> { Vec::new() }
//!
//! let filtered: Vec<_> = clips()
//!     .into_iter()
//!     .map(|clip| Filter::Sepia.apply(clip))
//!     .collect();
//! let joined = Transition::Fade.apply(filtered);
//! ```

pub mod filter;
pub mod transition;

pub use filter::{Filter, BRIGHTNESS_BOOST_FACTOR, COLOR_BOOST_FACTOR};
pub use transition::{Transition, TRANSITION_SECS};
