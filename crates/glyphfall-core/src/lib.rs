//! Core types shared across glyphfall crates.
//!
//! Everything here is plain data: logical pixel geometry, colors, easing
//! curves, rain tuning constants and the scroll progress math that drives
//! animation intensity.

mod ease;
mod geometry;
mod palette;
mod scroll;
mod tuning;

pub use ease::Ease;
pub use geometry::{Point, PxRect};
pub use palette::{ParseColorError, Palette, Rgb};
pub use scroll::{ScrollState, container_opacity, speed_multiplier};
pub use tuning::{InvalidTuning, RainTuning, Span, TuningField};
