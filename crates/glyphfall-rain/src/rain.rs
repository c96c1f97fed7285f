//! The rain controller for one container.

use std::collections::HashMap;

use glyphfall_core::{PxRect, RainTuning, container_opacity, speed_multiplier};
use glyphfall_engine::{
    Anchor, AnimationEngine, EngineEvent, KillQueue, Property, PropertySet, ScopeId,
    ScrollTrigger, SharedEngine, TargetId, TriggerId, Tween,
};
use rand::rngs::StdRng;
use tracing::{debug, trace, warn};

use crate::column::{self, Column};
use crate::container::Container;
use crate::error::{Capability, RainError};
use crate::splash::{self, Flash, Particle};

/// Triggers registered for the enclosing section.
#[derive(Debug, Clone, Copy)]
struct SectionTriggers {
    scrub: TriggerId,
    enter: TriggerId,
    leave_back: TriggerId,
}

/// Glyph rain and splash effect for one container.
///
/// Column and glyph counts are fixed at construction. Dropping the
/// controller disposes it.
pub struct MatrixRain {
    engine: Option<SharedEngine>,
    scope: Option<ScopeId>,
    kill_queue: Option<KillQueue>,
    container: Container,
    tuning: RainTuning,
    rng: StdRng,
    columns: Vec<Column>,
    /// Glyph target to (column, row).
    glyph_slots: HashMap<TargetId, (usize, usize)>,
    particles: Vec<Particle>,
    flashes: Vec<Flash>,
    container_target: Option<TargetId>,
    opacity: f32,
    progress: f32,
    triggers: Option<SectionTriggers>,
    splashes: u64,
    gap: Option<Capability>,
    disposed: bool,
}

impl std::fmt::Debug for MatrixRain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixRain")
            .field("scope", &self.scope)
            .field("container", &self.container)
            .field("columns", &self.columns.len())
            .field("particles", &self.particles.len())
            .field("flashes", &self.flashes.len())
            .field("progress", &self.progress)
            .field("gap", &self.gap)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl MatrixRain {
    /// Build the rain for `container`.
    ///
    /// Without an engine, or without timelines, the controller is inert.
    /// Without scroll triggers the columns still fall but there is no
    /// scroll response and no splash. Out-of-range tuning values fall back
    /// to their defaults.
    pub fn new(
        container: Container,
        engine: Option<SharedEngine>,
        tuning: RainTuning,
        rng: StdRng,
    ) -> Self {
        for problem in tuning.problems() {
            warn!(%problem, "using default rain tuning value");
        }
        let tuning = tuning.sanitized();

        let mut rain = Self {
            engine: None,
            scope: None,
            kill_queue: None,
            container,
            tuning,
            rng,
            columns: Vec::new(),
            glyph_slots: HashMap::new(),
            particles: Vec::new(),
            flashes: Vec::new(),
            container_target: None,
            opacity: container_opacity(0.0),
            progress: 0.0,
            triggers: None,
            splashes: 0,
            gap: None,
            disposed: false,
        };

        let Some(engine) = engine else {
            debug!("no animation engine, rain disabled");
            rain.gap = Some(Capability::Engine);
            return rain;
        };
        let capabilities = engine.borrow().capabilities();
        if !capabilities.timelines {
            debug!("animation engine lacks timelines, rain disabled");
            rain.gap = Some(Capability::Timelines);
            return rain;
        }

        {
            let mut guard = engine.borrow_mut();
            let engine: &mut dyn AnimationEngine = &mut *guard;
            let scope = engine.create_scope();
            rain.scope = Some(scope);
            rain.kill_queue = engine.kill_queue();

            let container_target = engine.create_target(scope);
            engine.set_property(container_target, Property::Opacity, rain.opacity);
            rain.container_target = Some(container_target);

            rain.columns = column::init_columns(
                engine,
                scope,
                &rain.tuning,
                &rain.container,
                &mut rain.rng,
            );
            for column in &rain.columns {
                for (row, glyph) in column.glyphs.iter().enumerate() {
                    rain.glyph_slots.insert(glyph.target, (column.index, row));
                }
            }

            if capabilities.scroll_triggers {
                rain.setup_scroll_triggers(engine, scope);
            } else {
                debug!("scroll triggers unavailable, rain will not follow scroll");
                rain.gap = Some(Capability::ScrollTriggers);
            }
        }
        rain.engine = Some(engine);

        debug!(
            columns = rain.columns.len(),
            glyphs = rain.glyph_slots.len(),
            particles = rain.particles.len(),
            "rain initialized"
        );
        rain
    }

    fn setup_scroll_triggers(&mut self, engine: &mut dyn AnimationEngine, scope: ScopeId) {
        self.particles = splash::init_particles(engine, scope, &self.tuning, &mut self.rng);

        let section = self.container.section;
        let scrub = engine.register_scroll_trigger(scope, ScrollTrigger::scrub(section));
        let enter = engine.register_scroll_trigger(
            scope,
            ScrollTrigger::on_enter(section, Anchor::BOTTOM_BOTTOM),
        );
        let leave_back = engine.register_scroll_trigger(
            scope,
            ScrollTrigger::on_leave_back(section, Anchor::TOP_TOP),
        );
        match (scrub, enter, leave_back) {
            (Some(scrub), Some(enter), Some(leave_back)) => {
                self.triggers = Some(SectionTriggers {
                    scrub,
                    enter,
                    leave_back,
                });
            }
            _ => {
                warn!("scroll trigger registration refused");
                self.gap = Some(Capability::ScrollTriggers);
            }
        }
    }

    /// React to everything the engine reported since the last update, then
    /// refresh the records from the engine's current values.
    pub fn update(&mut self) {
        let (Some(engine), Some(scope)) = (self.engine.clone(), self.scope) else {
            return;
        };
        if self.disposed {
            return;
        }
        let mut guard = engine.borrow_mut();
        let engine: &mut dyn AnimationEngine = &mut *guard;

        let mut splash_due = false;
        for event in engine.take_events(scope) {
            match event {
                EngineEvent::TweenStarted { target } => self.restart_glyph(target),
                EngineEvent::TargetRemoved { target } => {
                    self.flashes.retain(|flash| flash.target != target);
                }
                EngineEvent::ScrollProgress { trigger, progress }
                    if self.triggers.is_some_and(|t| t.scrub == trigger) =>
                {
                    self.apply_progress(engine, progress);
                }
                EngineEvent::TriggerFired { trigger, .. }
                    if self
                        .triggers
                        .is_some_and(|t| t.enter == trigger || t.leave_back == trigger) =>
                {
                    // Several crossings drained together make one splash.
                    splash_due = true;
                }
                _ => {}
            }
        }
        if splash_due {
            self.splash(engine, scope);
        }
        self.sync(engine);
    }

    fn restart_glyph(&mut self, target: TargetId) {
        let Some(&(column, row)) = self.glyph_slots.get(&target) else {
            return;
        };
        let ch = column::random_char(&mut self.rng);
        let glyph = &mut self.columns[column].glyphs[row];
        glyph.ch = ch;
        glyph.cycles += 1;
    }

    fn apply_progress(&mut self, engine: &mut dyn AnimationEngine, progress: f32) {
        self.progress = progress;
        let scale = speed_multiplier(progress);
        for column in &self.columns {
            engine.set_time_scale(column.timeline, scale);
        }
        if let Some(target) = self.container_target {
            let to = PropertySet::new().with(Property::Opacity, container_opacity(progress));
            engine.animate(Tween::to(target, to, self.tuning.opacity_tween));
        }
    }

    fn splash(&mut self, engine: &mut dyn AnimationEngine, scope: ScopeId) {
        let center = self.container.section.local_center();
        splash::launch(
            engine,
            &mut self.particles,
            center,
            &self.tuning,
            &mut self.rng,
        );
        self.flashes.push(splash::flash(engine, scope, &self.tuning));
        self.splashes += 1;
        trace!(splashes = self.splashes, ?center, "splash");
    }

    fn sync(&mut self, engine: &dyn AnimationEngine) {
        for glyph in self.columns.iter_mut().flat_map(|c| c.glyphs.iter_mut()) {
            if let Some(y) = engine.value(glyph.target, Property::Y) {
                glyph.y = y;
            }
            if let Some(opacity) = engine.value(glyph.target, Property::Opacity) {
                glyph.opacity = opacity;
            }
        }
        for particle in &mut self.particles {
            let target = particle.target;
            particle.x = engine.value(target, Property::X).unwrap_or(particle.x);
            particle.y = engine.value(target, Property::Y).unwrap_or(particle.y);
            particle.scale = engine.value(target, Property::Scale).unwrap_or(particle.scale);
            particle.opacity = engine
                .value(target, Property::Opacity)
                .unwrap_or(particle.opacity);
        }
        for flash in &mut self.flashes {
            flash.opacity = engine
                .value(flash.target, Property::Opacity)
                .unwrap_or(flash.opacity);
        }
        if let Some(opacity) = self
            .container_target
            .and_then(|target| engine.value(target, Property::Opacity))
        {
            self.opacity = opacity;
        }
    }

    /// Follow a layout change of the enclosing section.
    ///
    /// Trigger regions and the splash center move; column and glyph counts
    /// stay as they were built.
    pub fn relayout(&mut self, section: PxRect, viewport_height: f32) {
        self.container = Container::new(section, viewport_height);
        let (Some(engine), Some(triggers)) = (&self.engine, self.triggers) else {
            return;
        };
        if self.disposed {
            return;
        }
        let mut engine = engine.borrow_mut();
        for trigger in [triggers.scrub, triggers.enter, triggers.leave_back] {
            engine.update_trigger_region(trigger, section);
        }
    }

    /// Stop every animation and drop every record. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let (Some(engine), Some(scope)) = (&self.engine, self.scope) {
            match (engine.try_borrow_mut(), &self.kill_queue) {
                (Ok(mut engine), _) => engine.kill_scope(scope),
                (Err(_), Some(queue)) => {
                    debug!(?scope, "engine busy during dispose, scope queued for kill");
                    queue.push(scope);
                }
                (Err(_), None) => warn!(?scope, "engine busy during dispose, scope left running"),
            }
        }
        self.columns.clear();
        self.glyph_slots.clear();
        self.particles.clear();
        self.flashes.clear();
        self.container_target = None;
        self.triggers = None;
        debug!(scope = ?self.scope, "rain disposed");
    }

    /// `Err` when a missing engine capability degrades this controller.
    pub fn status(&self) -> Result<(), RainError> {
        match self.gap {
            Some(capability) => Err(RainError::MissingCapability(capability)),
            None => Ok(()),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn tuning(&self) -> &RainTuning {
        &self.tuning
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    /// Visual children currently in the container: glyphs, particles and
    /// flashes.
    pub fn child_count(&self) -> usize {
        self.glyph_slots.len() + self.particles.len() + self.flashes.len()
    }

    /// Current container opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Latest section progress in `[0, 1]`.
    pub fn section_progress(&self) -> f32 {
        self.progress
    }

    /// Splashes triggered so far.
    pub fn splash_count(&self) -> u64 {
        self.splashes
    }

    pub fn scope(&self) -> Option<ScopeId> {
        self.scope
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl Drop for MatrixRain {
    fn drop(&mut self) {
        self.dispose();
    }
}
