//! Glyph columns and their fall timelines.

use glyphfall_core::{Ease, RainTuning, Span};
use glyphfall_engine::{
    Action, AnimationEngine, Property, PropertySet, Repeat, ScopeId, TargetId, TimelineId, Tween,
};
use rand::Rng;

use crate::chars::MATRIX_CHARS;
use crate::container::Container;

/// Brightness tier, fixed when the glyph is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Normal,
    Highlighted,
}

/// One falling character.
#[derive(Debug, Clone)]
pub struct Glyph {
    pub target: TargetId,
    /// Column center.
    pub x: f32,
    /// Top offset within the container.
    pub y: f32,
    pub ch: char,
    pub tier: Tier,
    pub opacity: f32,
    /// Fall cycles started so far.
    pub cycles: u64,
}

/// A vertical slot of glyphs falling at one shared speed.
#[derive(Debug, Clone)]
pub struct Column {
    pub index: usize,
    pub x: f32,
    /// Seconds one glyph takes to fall.
    pub speed: f32,
    pub timeline: TimelineId,
    pub glyphs: Vec<Glyph>,
}

/// Uniform sample from `span`, or its minimum when the span is empty.
pub(crate) fn sample(rng: &mut impl Rng, span: Span) -> f32 {
    if span.is_degenerate() {
        span.min
    } else {
        rng.gen_range(span.min..span.max)
    }
}

pub(crate) fn random_char(rng: &mut impl Rng) -> char {
    MATRIX_CHARS[rng.gen_range(0..MATRIX_CHARS.len())]
}

/// Create every column for `container` and start their timelines.
pub(crate) fn init_columns(
    engine: &mut dyn AnimationEngine,
    scope: ScopeId,
    tuning: &RainTuning,
    container: &Container,
    rng: &mut impl Rng,
) -> Vec<Column> {
    (0..tuning.column_count(container.width()))
        .map(|index| init_column(engine, scope, tuning, container, rng, index))
        .collect()
}

fn init_column(
    engine: &mut dyn AnimationEngine,
    scope: ScopeId,
    tuning: &RainTuning,
    container: &Container,
    rng: &mut impl Rng,
    index: usize,
) -> Column {
    let x = tuning.column_x(index);
    let speed = sample(rng, tuning.fall_duration);
    let fall_to = container.viewport_height + tuning.overshoot;
    let timeline = engine.create_timeline(scope, Repeat::Infinite);

    let glyphs = (0..tuning.glyphs_per_column(container.viewport_height))
        .map(|row| {
            let target = engine.create_target(scope);
            // Stacked above the visible area.
            let y = -(row as f32) * tuning.row_pitch;
            engine.set_property(target, Property::X, x);
            engine.set_property(target, Property::Y, y);
            engine.set_property(target, Property::Opacity, 0.0);

            let fall = Tween::to(target, PropertySet::new().with(Property::Y, fall_to), speed)
                .with_ease(Ease::None)
                .notify()
                .on_start(Action::Set(Property::Opacity, 1.0))
                .on_complete(Action::Set(Property::Y, tuning.recycle_offset))
                .on_complete(Action::Animate {
                    property: Property::Opacity,
                    to: 0.0,
                    duration: tuning.fade_out,
                    ease: Ease::default(),
                });
            engine.add_to_timeline(timeline, fall, row as f32 * tuning.glyph_stagger);

            let tier = if rng.gen_bool(tuning.highlight_chance.clamp(0.0, 1.0)) {
                Tier::Highlighted
            } else {
                Tier::Normal
            };
            Glyph {
                target,
                x,
                y,
                ch: random_char(rng),
                tier,
                opacity: 0.0,
                cycles: 0,
            }
        })
        .collect();

    Column {
        index,
        x,
        speed,
        timeline,
        glyphs,
    }
}
