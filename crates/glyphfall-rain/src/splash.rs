//! Splash particles and the section flash.

use std::f32::consts::TAU;

use glyphfall_core::{Point, RainTuning};
use glyphfall_engine::{Action, AnimationEngine, Property, PropertySet, ScopeId, TargetId, Tween};
use rand::Rng;

use crate::column::sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleColor {
    Rain,
    Accent,
}

/// A pooled splash particle, reused by every splash.
#[derive(Debug, Clone)]
pub struct Particle {
    pub target: TargetId,
    pub color: ParticleColor,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub opacity: f32,
    /// Where the latest splash sends this particle.
    pub destination: Option<Point>,
}

/// A transient radial flash over the section.
#[derive(Debug, Clone)]
pub struct Flash {
    pub target: TargetId,
    pub opacity: f32,
}

/// Create the particle pool, hidden at the origin.
pub(crate) fn init_particles(
    engine: &mut dyn AnimationEngine,
    scope: ScopeId,
    tuning: &RainTuning,
    rng: &mut impl Rng,
) -> Vec<Particle> {
    (0..tuning.splash_particles)
        .map(|_| {
            let target = engine.create_target(scope);
            engine.set_property(target, Property::Opacity, 0.0);
            engine.set_property(target, Property::Scale, 0.0);
            let color = if rng.gen_bool(tuning.accent_chance.clamp(0.0, 1.0)) {
                ParticleColor::Accent
            } else {
                ParticleColor::Rain
            };
            Particle {
                target,
                color,
                x: 0.0,
                y: 0.0,
                scale: 0.0,
                opacity: 0.0,
                destination: None,
            }
        })
        .collect()
}

/// Burst every particle outward from `center`.
pub(crate) fn launch(
    engine: &mut dyn AnimationEngine,
    particles: &mut [Particle],
    center: Point,
    tuning: &RainTuning,
    rng: &mut impl Rng,
) {
    let count = particles.len();
    for (index, particle) in particles.iter_mut().enumerate() {
        let angle = index as f32 / count as f32 * TAU;
        let distance = sample(rng, tuning.splash_distance);
        let end = Point::new(
            center.x + angle.cos() * distance,
            center.y + angle.sin() * distance,
        );

        let target = particle.target;
        engine.set_property(target, Property::X, center.x);
        engine.set_property(target, Property::Y, center.y);
        engine.set_property(target, Property::Scale, 0.0);
        engine.set_property(target, Property::Opacity, 1.0);

        let to = PropertySet::new()
            .with(Property::X, end.x)
            .with(Property::Y, end.y)
            .with(Property::Scale, sample(rng, tuning.splash_scale))
            .with(Property::Opacity, 0.0);
        let burst = Tween::to(target, to, sample(rng, tuning.splash_duration))
            .with_ease(tuning.splash_ease)
            .with_delay(index as f32 * tuning.particle_stagger);
        engine.animate(burst);

        particle.destination = Some(end);
    }
}

/// Start a flash that fades in, back out, then removes itself.
pub(crate) fn flash(engine: &mut dyn AnimationEngine, scope: ScopeId, tuning: &RainTuning) -> Flash {
    let target = engine.create_target(scope);
    engine.set_property(target, Property::Opacity, 0.0);
    let pulse = Tween::from_to(
        target,
        PropertySet::new().with(Property::Opacity, 0.0),
        PropertySet::new().with(Property::Opacity, 1.0),
        tuning.flash_duration,
    )
    .with_repeat(1)
    .yoyo()
    .on_complete(Action::Remove);
    engine.animate(pulse);
    Flash {
        target,
        opacity: 0.0,
    }
}
