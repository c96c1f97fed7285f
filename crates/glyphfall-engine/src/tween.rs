//! Tween descriptions and their playback state.

use glyphfall_core::Ease;

use crate::TargetId;
use crate::property::{Property, PropertySet, PropertyValues};

/// Work the engine performs on a tween's own target when the tween starts or
/// completes.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Set a property immediately.
    Set(Property, f32),
    /// Start a standalone tween of one property.
    Animate {
        property: Property,
        to: f32,
        duration: f32,
        ease: Ease,
    },
    /// Remove the target from the engine.
    Remove,
}

/// Describes how one target's properties change over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: TargetId,
    /// End values.
    pub to: PropertySet,
    /// Start values applied when the tween starts; otherwise the target's
    /// current values at that moment are used.
    pub from: Option<PropertySet>,
    pub duration: f32,
    pub delay: f32,
    pub ease: Ease,
    /// Extra plays after the first.
    pub repeat: u32,
    /// Alternate direction on every repeat.
    pub yoyo: bool,
    /// Emit start and completion events to the target's scope.
    pub notify: bool,
    pub on_start: Vec<Action>,
    pub on_complete: Vec<Action>,
}

impl Tween {
    pub fn to(target: TargetId, to: PropertySet, duration: f32) -> Self {
        Self {
            target,
            to,
            from: None,
            duration,
            delay: 0.0,
            ease: Ease::default(),
            repeat: 0,
            yoyo: false,
            notify: false,
            on_start: Vec::new(),
            on_complete: Vec::new(),
        }
    }

    pub fn from_to(target: TargetId, from: PropertySet, to: PropertySet, duration: f32) -> Self {
        Self {
            from: Some(from),
            ..Self::to(target, to, duration)
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self) -> Self {
        self.yoyo = true;
        self
    }

    pub fn notify(mut self) -> Self {
        self.notify = true;
        self
    }

    pub fn on_start(mut self, action: Action) -> Self {
        self.on_start.push(action);
        self
    }

    pub fn on_complete(mut self, action: Action) -> Self {
        self.on_complete.push(action);
        self
    }

    /// Play time of all repeats, excluding the delay.
    pub fn total_duration(&self) -> f32 {
        self.duration.max(0.0) * (self.repeat as f32 + 1.0)
    }
}

/// Transitions reported by [`TweenState::render_at`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Step {
    pub started: bool,
    pub completed: bool,
}

/// A tween in flight.
#[derive(Debug, Clone)]
pub(crate) struct TweenState {
    pub spec: Tween,
    from: PropertyValues,
    pub started: bool,
    pub done: bool,
}

impl TweenState {
    pub fn new(spec: Tween) -> Self {
        Self {
            spec,
            from: PropertyValues::default(),
            started: false,
            done: false,
        }
    }

    /// Rewind so the next render starts the tween again.
    pub fn reset(&mut self) {
        self.started = false;
        self.done = false;
    }

    /// Drop `property` from the animated set, returning whether anything is
    /// left to animate.
    pub fn kill_property(&mut self, property: Property) -> bool {
        self.spec.to.remove(property);
        !self.spec.to.is_empty()
    }

    /// Render at `time` seconds after the tween was scheduled, delay
    /// included. `values` is `None` once the target has been removed.
    pub fn render_at(&mut self, time: f32, mut values: Option<&mut PropertyValues>) -> Step {
        let mut step = Step::default();
        if self.done {
            return step;
        }
        let local = time - self.spec.delay;
        if local < 0.0 {
            return step;
        }

        if !self.started {
            self.started = true;
            step.started = true;
            if let Some(values) = values.as_deref_mut() {
                if let Some(from) = self.spec.from {
                    for (property, value) in from.iter() {
                        values.set(property, value);
                    }
                }
                self.from = *values;
            }
        }

        let total = self.spec.total_duration();
        let finished = local >= total;
        if let Some(values) = values {
            self.write(values, local, finished);
        }
        if finished {
            self.done = true;
            step.completed = true;
        }
        step
    }

    fn write(&self, values: &mut PropertyValues, local: f32, finished: bool) {
        let duration = self.spec.duration;
        let (iteration, fraction) = if finished || duration <= 0.0 {
            (self.spec.repeat, 1.0)
        } else {
            ((local / duration).floor() as u32, (local % duration) / duration)
        };
        let progress = if self.spec.yoyo && iteration % 2 == 1 {
            1.0 - fraction
        } else {
            fraction
        };
        let eased = self.spec.ease.apply(progress);
        for (property, to) in self.spec.to.iter() {
            let from = self.from.get(property);
            values.set(property, from + (to - from) * eased);
        }
    }
}
