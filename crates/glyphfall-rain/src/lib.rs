//! Glyph rain for glyphfall page sections.
//!
//! A [`MatrixRain`] controller owns one container's columns of falling
//! glyphs and its splash particle pool. It drives them through an injected
//! [`glyphfall_engine::AnimationEngine`], reacts to the section's scroll
//! triggers, and keeps plain records that [`RainView`] projects onto a
//! terminal buffer.

mod chars;
mod column;
mod container;
mod error;
mod rain;
mod registry;
mod render;
mod splash;

pub use chars::{MATRIX_CHARS, PARTICLE_CHARS};
pub use column::{Column, Glyph, Tier};
pub use container::Container;
pub use error::{Capability, RainError};
pub use rain::MatrixRain;
pub use registry::RainRegistry;
pub use render::{Projection, RainView};
pub use splash::{Flash, Particle, ParticleColor};
