//! Tuning constants for the glyph rain and its splash effect.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ease::Ease;

/// An inclusive-exclusive range of `f32` values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// `true` when sampling would have nothing to choose from, including
    /// when either bound is NaN.
    pub fn is_degenerate(&self) -> bool {
        self.max.partial_cmp(&self.min) != Some(Ordering::Greater)
    }

    fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// Smallest column or row pitch; anything finer allocates a glyph per pixel.
const MIN_PITCH: f32 = 4.0;
const MAX_PITCH: f32 = 1000.0;
const MAX_OVERSCAN: usize = 200;
const MAX_SPLASH_PARTICLES: usize = 1000;

/// A [`RainTuning`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningField {
    ColumnPitch,
    RowPitch,
    Overscan,
    FallDuration,
    GlyphStagger,
    Overshoot,
    RecycleOffset,
    FadeOut,
    HighlightChance,
    SplashParticles,
    AccentChance,
    SplashDistance,
    SplashScale,
    SplashDuration,
    ParticleStagger,
    FlashDuration,
    FlashAlpha,
    FlashRadius,
    OpacityTween,
}

impl TuningField {
    /// Key of the field in the config file.
    pub fn key(self) -> &'static str {
        match self {
            TuningField::ColumnPitch => "column_pitch",
            TuningField::RowPitch => "row_pitch",
            TuningField::Overscan => "overscan",
            TuningField::FallDuration => "fall_duration",
            TuningField::GlyphStagger => "glyph_stagger",
            TuningField::Overshoot => "overshoot",
            TuningField::RecycleOffset => "recycle_offset",
            TuningField::FadeOut => "fade_out",
            TuningField::HighlightChance => "highlight_chance",
            TuningField::SplashParticles => "splash_particles",
            TuningField::AccentChance => "accent_chance",
            TuningField::SplashDistance => "splash_distance",
            TuningField::SplashScale => "splash_scale",
            TuningField::SplashDuration => "splash_duration",
            TuningField::ParticleStagger => "particle_stagger",
            TuningField::FlashDuration => "flash_duration",
            TuningField::FlashAlpha => "flash_alpha",
            TuningField::FlashRadius => "flash_radius",
            TuningField::OpacityTween => "opacity_tween",
        }
    }
}

/// A tuning value outside the range the rain can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rain.{} {requirement}", .field.key())]
pub struct InvalidTuning {
    pub field: TuningField,
    pub requirement: &'static str,
}

fn pitch_ok(value: f32) -> bool {
    (MIN_PITCH..=MAX_PITCH).contains(&value)
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

fn probability(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn ordered(span: Span, lowest: f32) -> bool {
    span.is_finite() && span.min >= lowest && span.max >= span.min
}

/// All distances are logical pixels, all durations are seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainTuning {
    /// Horizontal distance between columns.
    pub column_pitch: f32,
    /// Vertical distance between stacked glyphs.
    pub row_pitch: f32,
    /// Extra glyphs per column beyond what fills the viewport.
    pub overscan: usize,
    /// Range a column's fall duration is drawn from.
    pub fall_duration: Span,
    /// Start delay between consecutive glyphs in a column.
    pub glyph_stagger: f32,
    /// Distance past the viewport bottom a glyph falls to.
    pub overshoot: f32,
    /// Where a glyph is parked after finishing a fall.
    pub recycle_offset: f32,
    /// Fade-out duration after a fall completes.
    pub fade_out: f32,
    /// Probability a glyph is created in the highlighted tier.
    pub highlight_chance: f64,
    /// Particles in each controller's splash pool.
    pub splash_particles: usize,
    /// Probability a particle uses the accent color.
    pub accent_chance: f64,
    /// Range a particle's travel distance is drawn from.
    pub splash_distance: Span,
    /// Range a particle's final scale is drawn from.
    pub splash_scale: Span,
    /// Range a particle's flight duration is drawn from.
    pub splash_duration: Span,
    /// Start delay between consecutive particles.
    pub particle_stagger: f32,
    /// Particle flight curve.
    pub splash_ease: Ease,
    /// Flash fade-in time; the fade-out mirrors it.
    pub flash_duration: f32,
    /// Flash tint strength at the center.
    pub flash_alpha: f32,
    /// Flash gradient radius as a fraction of the section half-diagonal.
    pub flash_radius: f32,
    /// Container opacity tween duration on scroll updates.
    pub opacity_tween: f32,
}

impl Default for RainTuning {
    fn default() -> Self {
        Self {
            column_pitch: 25.0,
            row_pitch: 25.0,
            overscan: 10,
            fall_duration: Span::new(2.0, 8.0),
            glyph_stagger: 0.1,
            overshoot: 100.0,
            recycle_offset: -50.0,
            fade_out: 0.5,
            highlight_chance: 0.15,
            splash_particles: 50,
            accent_chance: 0.3,
            splash_distance: Span::new(100.0, 400.0),
            splash_scale: Span::new(1.0, 3.0),
            splash_duration: Span::new(0.8, 1.5),
            particle_stagger: 0.01,
            splash_ease: Ease::Power2Out,
            flash_duration: 0.2,
            flash_alpha: 0.3,
            flash_radius: 0.7,
            opacity_tween: 0.3,
        }
    }
}

impl RainTuning {
    /// Every out-of-range field, in declaration order.
    pub fn problems(&self) -> Vec<InvalidTuning> {
        use TuningField::*;

        let checks = [
            (ColumnPitch, pitch_ok(self.column_pitch), "must be between 4 and 1000"),
            (RowPitch, pitch_ok(self.row_pitch), "must be between 4 and 1000"),
            (Overscan, self.overscan <= MAX_OVERSCAN, "must be at most 200"),
            (
                FallDuration,
                ordered(self.fall_duration, f32::MIN_POSITIVE),
                "needs 0 < min <= max",
            ),
            (GlyphStagger, non_negative(self.glyph_stagger), "must be finite and >= 0"),
            (Overshoot, self.overshoot.is_finite(), "must be finite"),
            (RecycleOffset, self.recycle_offset.is_finite(), "must be finite"),
            (FadeOut, non_negative(self.fade_out), "must be finite and >= 0"),
            (HighlightChance, probability(self.highlight_chance), "must be in [0, 1]"),
            (
                SplashParticles,
                self.splash_particles <= MAX_SPLASH_PARTICLES,
                "must be at most 1000",
            ),
            (AccentChance, probability(self.accent_chance), "must be in [0, 1]"),
            (SplashDistance, ordered(self.splash_distance, 0.0), "needs 0 <= min <= max"),
            (SplashScale, ordered(self.splash_scale, 0.0), "needs 0 <= min <= max"),
            (SplashDuration, ordered(self.splash_duration, 0.0), "needs 0 <= min <= max"),
            (ParticleStagger, non_negative(self.particle_stagger), "must be finite and >= 0"),
            (FlashDuration, non_negative(self.flash_duration), "must be finite and >= 0"),
            (FlashAlpha, (0.0..=1.0).contains(&self.flash_alpha), "must be in [0, 1]"),
            (FlashRadius, non_negative(self.flash_radius), "must be finite and >= 0"),
            (OpacityTween, non_negative(self.opacity_tween), "must be finite and >= 0"),
        ];
        checks
            .into_iter()
            .filter(|(_, ok, _)| !ok)
            .map(|(field, _, requirement)| InvalidTuning { field, requirement })
            .collect()
    }

    /// `Err` with the first out-of-range field.
    pub fn validate(&self) -> Result<(), InvalidTuning> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }

    /// Copy with every out-of-range field replaced by its default.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for problem in self.problems() {
            match problem.field {
                TuningField::ColumnPitch => self.column_pitch = defaults.column_pitch,
                TuningField::RowPitch => self.row_pitch = defaults.row_pitch,
                TuningField::Overscan => self.overscan = defaults.overscan,
                TuningField::FallDuration => self.fall_duration = defaults.fall_duration,
                TuningField::GlyphStagger => self.glyph_stagger = defaults.glyph_stagger,
                TuningField::Overshoot => self.overshoot = defaults.overshoot,
                TuningField::RecycleOffset => self.recycle_offset = defaults.recycle_offset,
                TuningField::FadeOut => self.fade_out = defaults.fade_out,
                TuningField::HighlightChance => self.highlight_chance = defaults.highlight_chance,
                TuningField::SplashParticles => self.splash_particles = defaults.splash_particles,
                TuningField::AccentChance => self.accent_chance = defaults.accent_chance,
                TuningField::SplashDistance => self.splash_distance = defaults.splash_distance,
                TuningField::SplashScale => self.splash_scale = defaults.splash_scale,
                TuningField::SplashDuration => self.splash_duration = defaults.splash_duration,
                TuningField::ParticleStagger => self.particle_stagger = defaults.particle_stagger,
                TuningField::FlashDuration => self.flash_duration = defaults.flash_duration,
                TuningField::FlashAlpha => self.flash_alpha = defaults.flash_alpha,
                TuningField::FlashRadius => self.flash_radius = defaults.flash_radius,
                TuningField::OpacityTween => self.opacity_tween = defaults.opacity_tween,
            }
        }
        self
    }

    /// Columns that fit in a container of the given width.
    pub fn column_count(&self, container_width: f32) -> usize {
        if self.column_pitch <= 0.0 || container_width <= 0.0 {
            return 0;
        }
        (container_width / self.column_pitch).floor() as usize
    }

    /// Glyphs stacked in each column for the given viewport height.
    pub fn glyphs_per_column(&self, viewport_height: f32) -> usize {
        let rows = if self.row_pitch <= 0.0 || viewport_height <= 0.0 {
            0
        } else {
            (viewport_height / self.row_pitch).floor() as usize
        };
        rows + self.overscan
    }

    /// Horizontal center of column `index`.
    pub fn column_x(&self, index: usize) -> f32 {
        index as f32 * self.column_pitch + self.column_pitch / 2.0
    }
}
