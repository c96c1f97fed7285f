use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use glyphfall_core::{PxRect, RainTuning, ScrollState, Span};
use glyphfall_engine::{
    AnimationEngine, Capabilities, Engine, EngineEvent, Property, Repeat, ScopeId, ScrollTrigger,
    SharedEngine, TargetId, TimelineId, TriggerId, Tween, TweenId,
};
use glyphfall_rain::{Capability, Container, MATRIX_CHARS, MatrixRain, RainError};
use rand::SeedableRng;
use rand::rngs::StdRng;

const VIEWPORT: f32 = 800.0;
const DOCUMENT: f32 = 4000.0;

/// Second of five full-viewport sections.
const SECTION: PxRect = PxRect::new(0.0, 800.0, 260.0, 800.0);

fn engine() -> Rc<RefCell<Engine>> {
    Rc::new(RefCell::new(Engine::new()))
}

fn rain_in(engine: &Rc<RefCell<Engine>>, section: PxRect, seed: u64) -> MatrixRain {
    tuned_rain_in(engine, section, RainTuning::default(), seed)
}

fn tuned_rain_in(
    engine: &Rc<RefCell<Engine>>,
    section: PxRect,
    tuning: RainTuning,
    seed: u64,
) -> MatrixRain {
    let shared: SharedEngine = engine.clone();
    MatrixRain::new(
        Container::new(section, VIEWPORT),
        Some(shared),
        tuning,
        StdRng::seed_from_u64(seed),
    )
}

fn scroll(engine: &Rc<RefCell<Engine>>, offset: f32) {
    engine
        .borrow_mut()
        .scroll_to(ScrollState::new(offset, VIEWPORT, DOCUMENT));
}

fn run(engine: &Rc<RefCell<Engine>>, rain: &mut MatrixRain, seconds: f32) {
    let frames = (seconds / 0.05).round() as usize;
    for _ in 0..frames {
        engine.borrow_mut().tick(0.05);
        rain.update();
    }
}

#[test]
fn test_column_and_glyph_counts() {
    let engine = engine();
    for (width, columns) in [(260.0, 10), (24.0, 0), (0.0, 0), (1000.0, 40)] {
        let rain = rain_in(&engine, PxRect::new(0.0, 0.0, width, 800.0), 1);
        assert_eq!(rain.columns().len(), columns, "width {width}");
        for column in rain.columns() {
            assert_eq!(column.glyphs.len(), 42);
        }
    }
}

#[test]
fn test_zero_width_container_only_holds_particles() {
    let engine = engine();
    let rain = rain_in(&engine, PxRect::new(0.0, 0.0, 0.0, 800.0), 2);
    assert!(rain.columns().is_empty());
    assert_eq!(rain.child_count(), 50);
    assert_eq!(rain.status(), Ok(()));
}

#[test]
fn test_glyph_characters_resample_on_restart() {
    let engine = engine();
    let mut rain = rain_in(&engine, PxRect::new(0.0, 0.0, 50.0, 800.0), 3);
    let mut seen = HashSet::new();
    for _ in 0..1200 {
        engine.borrow_mut().tick(0.05);
        rain.update();
        seen.insert(rain.columns()[0].glyphs[0].ch);
    }

    assert!(seen.len() > 1);
    assert!(seen.iter().all(|ch| MATRIX_CHARS.contains(ch)));
    for glyph in rain.columns().iter().flat_map(|c| c.glyphs.iter()) {
        assert!(glyph.cycles >= 2, "glyph restarted {} times", glyph.cycles);
        assert!(MATRIX_CHARS.contains(&glyph.ch));
    }
}

#[test]
fn test_recycled_glyphs_fade_out() {
    let engine = engine();
    let mut rain = rain_in(&engine, PxRect::new(0.0, 0.0, 25.0, 800.0), 4);
    let speed = rain.columns()[0].speed;
    // First glyph has landed and finished fading.
    run(&engine, &mut rain, speed + 0.6);
    let first = &rain.columns()[0].glyphs[0];
    assert_eq!(first.cycles, 1);
    assert_eq!(first.y, -50.0);
    assert!(first.opacity < 0.05, "opacity {}", first.opacity);
}

/// Tick in 10 ms steps and record the step at which each glyph of the
/// first column started its first fall.
fn first_fall_steps(
    engine: &Rc<RefCell<Engine>>,
    rain: &mut MatrixRain,
    steps: usize,
) -> Vec<usize> {
    let mut starts = vec![None; rain.columns()[0].glyphs.len()];
    for step in 1..=steps {
        engine.borrow_mut().tick(0.01);
        rain.update();
        for (row, glyph) in rain.columns()[0].glyphs.iter().enumerate() {
            if glyph.cycles >= 1 && starts[row].is_none() {
                starts[row] = Some(step);
            }
        }
    }
    starts
        .into_iter()
        .enumerate()
        .map(|(row, step)| step.unwrap_or_else(|| panic!("glyph {row} never fell")))
        .collect()
}

fn assert_cascade(starts: &[usize], stagger: f32, scale: f32) {
    let gap = (stagger / scale / 0.01).round() as usize;
    assert_eq!(starts[0], 1);
    for pair in starts.windows(2) {
        assert!(pair[1] > pair[0], "out of order: {starts:?}");
        let spacing = pair[1] - pair[0];
        assert!(spacing.abs_diff(gap) <= 1, "spacing {spacing} vs {gap}: {starts:?}");
    }
}

fn steady_tuning() -> RainTuning {
    RainTuning {
        fall_duration: Span::new(4.0, 4.0),
        ..RainTuning::default()
    }
}

#[test]
fn test_glyphs_start_falling_top_to_bottom() {
    let engine = engine();
    let mut rain = tuned_rain_in(&engine, PxRect::new(0.0, 0.0, 25.0, 800.0), steady_tuning(), 17);
    assert_eq!(rain.columns().len(), 1);
    let timeline = rain.columns()[0].timeline;
    assert_eq!(engine.borrow().time_scale(timeline), Some(1.0));

    let starts = first_fall_steps(&engine, &mut rain, 450);
    assert_eq!(starts.len(), 42);
    assert_cascade(&starts, rain.tuning().glyph_stagger, 1.0);
}

#[test]
fn test_cascade_tightens_at_full_speed() {
    let engine = engine();
    // Section fully scrolled through: progress 1, double speed.
    scroll(&engine, 800.0);
    let mut rain = tuned_rain_in(&engine, PxRect::new(0.0, 0.0, 25.0, 800.0), steady_tuning(), 18);
    rain.update();
    let timeline = rain.columns()[0].timeline;
    assert_eq!(engine.borrow().time_scale(timeline), Some(2.0));

    let starts = first_fall_steps(&engine, &mut rain, 250);
    assert_cascade(&starts, rain.tuning().glyph_stagger, 2.0);
    assert!(starts[41] <= 210, "last glyph started at step {}", starts[41]);
}

#[test]
fn test_unusable_tuning_falls_back_to_defaults() {
    let engine = engine();
    scroll(&engine, 0.0);
    let tuning = RainTuning {
        column_pitch: 0.0,
        fall_duration: Span::new(f32::NAN, f32::NAN),
        highlight_chance: f64::NAN,
        accent_chance: f64::INFINITY,
        splash_particles: usize::MAX,
        splash_distance: Span::new(f32::NAN, 10.0),
        ..RainTuning::default()
    };
    let mut rain = tuned_rain_in(&engine, SECTION, tuning, 15);
    assert_eq!(rain.tuning(), &RainTuning::default());
    assert_eq!(rain.columns().len(), 10);
    assert_eq!(rain.particles().len(), 50);
    for column in rain.columns() {
        assert!(RainTuning::default().fall_duration.contains(column.speed));
    }

    scroll(&engine, 900.0);
    run(&engine, &mut rain, 0.5);
    assert_eq!(rain.splash_count(), 1);
}

#[test]
fn test_progress_extremes_drive_speed_and_opacity() {
    let engine = engine();
    scroll(&engine, 0.0);
    let mut rain = rain_in(&engine, SECTION, 5);
    run(&engine, &mut rain, 0.5);
    for column in rain.columns() {
        assert_eq!(engine.borrow().time_scale(column.timeline), Some(0.5));
    }
    assert!((rain.opacity() - 0.2).abs() < 1e-4);
    assert_eq!(rain.section_progress(), 0.0);

    scroll(&engine, 1600.0);
    run(&engine, &mut rain, 0.5);
    for column in rain.columns() {
        assert_eq!(engine.borrow().time_scale(column.timeline), Some(2.0));
    }
    assert!((rain.opacity() - 0.5).abs() < 1e-4);
    assert_eq!(rain.section_progress(), 1.0);

    scroll(&engine, 800.0);
    run(&engine, &mut rain, 0.5);
    assert!((rain.section_progress() - 0.5).abs() < 1e-4);
    assert!((rain.opacity() - 0.35).abs() < 1e-4);
}

#[test]
fn test_splash_on_enter_and_leave_back() {
    let engine = engine();
    scroll(&engine, 0.0);
    let mut rain = rain_in(&engine, SECTION, 6);
    rain.update();
    assert_eq!(rain.splash_count(), 0);

    scroll(&engine, 900.0);
    rain.update();
    assert_eq!(rain.splash_count(), 1);
    assert_eq!(rain.flashes().len(), 1);

    let tuning = rain.tuning().clone();
    let center = SECTION.local_center();
    for particle in rain.particles() {
        let end = particle.destination.expect("launched particle");
        let distance = end.distance(center);
        assert!(
            distance >= tuning.splash_distance.min - 1e-3
                && distance <= tuning.splash_distance.max + 1e-3,
            "distance {distance}"
        );
    }

    scroll(&engine, 700.0);
    rain.update();
    assert_eq!(rain.splash_count(), 2);
    assert_eq!(rain.particles().len(), 50);

    // Scrolling within the same side fires nothing.
    scroll(&engine, 600.0);
    rain.update();
    assert_eq!(rain.splash_count(), 2);
}

#[test]
fn test_particle_pool_is_reused() {
    let engine = engine();
    scroll(&engine, 0.0);
    let mut rain = rain_in(&engine, SECTION, 7);
    let before = rain.child_count();
    for _ in 0..5 {
        scroll(&engine, 900.0);
        run(&engine, &mut rain, 0.1);
        scroll(&engine, 700.0);
        run(&engine, &mut rain, 0.1);
    }
    assert_eq!(rain.splash_count(), 10);
    assert_eq!(rain.particles().len(), 50);

    // Flashes remove themselves once their pulse ends.
    run(&engine, &mut rain, 1.0);
    assert!(rain.flashes().is_empty());
    assert_eq!(rain.child_count(), before);
}

#[test]
fn test_crossings_in_one_update_make_one_splash() {
    let engine = engine();
    scroll(&engine, 0.0);
    let mut rain = rain_in(&engine, SECTION, 8);
    scroll(&engine, 900.0);
    scroll(&engine, 700.0);
    scroll(&engine, 950.0);
    rain.update();
    assert_eq!(rain.splash_count(), 1);
    assert_eq!(rain.flashes().len(), 1);
}

#[test]
fn test_registration_does_not_splash() {
    let engine = engine();
    scroll(&engine, 1200.0);
    let mut rain = rain_in(&engine, SECTION, 9);
    rain.update();
    assert_eq!(rain.splash_count(), 0);
    assert!((rain.section_progress() - 0.75).abs() < 1e-4);
}

#[test]
fn test_dispose_releases_everything() {
    let engine = engine();
    scroll(&engine, 0.0);
    let mut rain = rain_in(&engine, SECTION, 10);
    scroll(&engine, 900.0);
    run(&engine, &mut rain, 0.2);
    let scope = rain.scope().expect("scope");
    assert!(!engine.borrow().scope_stats(scope).is_empty());

    rain.dispose();
    assert_eq!(rain.child_count(), 0);
    assert!(engine.borrow().scope_stats(scope).is_empty());

    // Later frames and scrolls leave the disposed rain alone.
    rain.dispose();
    scroll(&engine, 100.0);
    run(&engine, &mut rain, 0.2);
    assert_eq!(rain.child_count(), 0);
    assert_eq!(rain.splash_count(), 1);
}

#[test]
fn test_dispose_while_engine_busy_kills_scope_on_next_tick() {
    let engine = engine();
    let mut rain = rain_in(&engine, SECTION, 16);
    let scope = rain.scope().expect("scope");
    {
        let _busy = engine.borrow_mut();
        rain.dispose();
    }
    assert!(rain.is_disposed());
    assert_eq!(rain.child_count(), 0);
    assert!(!engine.borrow().scope_stats(scope).is_empty());

    engine.borrow_mut().tick(0.05);
    assert!(engine.borrow().scope_stats(scope).is_empty());
}

#[test]
fn test_drop_kills_scope() {
    let engine = engine();
    let rain = rain_in(&engine, SECTION, 11);
    let scope = rain.scope().expect("scope");
    drop(rain);
    assert!(engine.borrow().scope_stats(scope).is_empty());
}

#[test]
fn test_missing_engine_is_inert() {
    let mut rain = MatrixRain::new(
        Container::new(SECTION, VIEWPORT),
        None,
        RainTuning::default(),
        StdRng::seed_from_u64(12),
    );
    rain.update();
    rain.relayout(SECTION, VIEWPORT);
    assert_eq!(rain.child_count(), 0);
    assert_eq!(
        rain.status(),
        Err(RainError::MissingCapability(Capability::Engine))
    );
    rain.dispose();
}

/// An engine with standalone tweens but no timelines. Counts every
/// mutating call it receives.
#[derive(Debug, Default)]
struct TweenOnlyEngine {
    calls: u64,
}

impl TweenOnlyEngine {
    fn touch(&mut self) -> u64 {
        self.calls += 1;
        self.calls
    }
}

impl AnimationEngine for TweenOnlyEngine {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            timelines: false,
            scroll_triggers: true,
        }
    }

    fn create_scope(&mut self) -> ScopeId {
        ScopeId::from_raw(self.touch())
    }

    fn kill_scope(&mut self, _scope: ScopeId) {
        self.touch();
    }

    fn create_target(&mut self, _scope: ScopeId) -> TargetId {
        TargetId::from_raw(self.touch())
    }

    fn remove_target(&mut self, _target: TargetId) {
        self.touch();
    }

    fn value(&self, _target: TargetId, _property: Property) -> Option<f32> {
        None
    }

    fn set_property(&mut self, _target: TargetId, _property: Property, _value: f32) {
        self.touch();
    }

    fn animate(&mut self, _tween: Tween) -> Option<TweenId> {
        Some(TweenId::from_raw(self.touch()))
    }

    fn create_timeline(&mut self, _scope: ScopeId, _repeat: Repeat) -> TimelineId {
        TimelineId::from_raw(self.touch())
    }

    fn add_to_timeline(&mut self, _timeline: TimelineId, _tween: Tween, _position: f32) {
        self.touch();
    }

    fn set_time_scale(&mut self, _timeline: TimelineId, _scale: f32) {
        self.touch();
    }

    fn register_scroll_trigger(
        &mut self,
        _scope: ScopeId,
        _trigger: ScrollTrigger,
    ) -> Option<TriggerId> {
        Some(TriggerId::from_raw(self.touch()))
    }

    fn update_trigger_region(&mut self, _trigger: TriggerId, _region: PxRect) {
        self.touch();
    }

    fn take_events(&mut self, _scope: ScopeId) -> Vec<EngineEvent> {
        self.touch();
        Vec::new()
    }
}

#[test]
fn test_missing_timelines_is_inert() {
    let engine = Rc::new(RefCell::new(TweenOnlyEngine::default()));
    let shared: SharedEngine = engine.clone();
    let mut rain = MatrixRain::new(
        Container::new(SECTION, VIEWPORT),
        Some(shared),
        RainTuning::default(),
        StdRng::seed_from_u64(19),
    );
    assert_eq!(
        rain.status(),
        Err(RainError::MissingCapability(Capability::Timelines))
    );
    assert_eq!(rain.scope(), None);
    assert_eq!(rain.child_count(), 0);

    rain.update();
    rain.relayout(PxRect::new(0.0, 1600.0, 260.0, 800.0), VIEWPORT);
    rain.dispose();
    drop(rain);
    assert_eq!(engine.borrow().calls, 0);
}

#[test]
fn test_missing_scroll_triggers_keep_columns_falling() {
    let engine = Rc::new(RefCell::new(Engine::without_scroll_triggers()));
    let mut rain = rain_in(&engine, SECTION, 13);
    assert_eq!(rain.columns().len(), 10);
    assert!(rain.particles().is_empty());
    assert_eq!(
        rain.status(),
        Err(RainError::MissingCapability(Capability::ScrollTriggers))
    );

    scroll(&engine, 900.0);
    run(&engine, &mut rain, 1.0);
    assert_eq!(rain.splash_count(), 0);
    assert!(
        rain.columns()
            .iter()
            .flat_map(|c| c.glyphs.iter())
            .any(|g| g.cycles > 0)
    );
}

#[test]
fn test_relayout_moves_triggers_and_keeps_columns() {
    let engine = engine();
    scroll(&engine, 0.0);
    let mut rain = rain_in(&engine, SECTION, 14);

    let moved = PxRect::new(0.0, 2400.0, 520.0, 800.0);
    rain.relayout(moved, VIEWPORT);
    assert_eq!(rain.columns().len(), 10);
    assert_eq!(rain.container().section, moved);

    scroll(&engine, 900.0);
    rain.update();
    assert_eq!(rain.splash_count(), 0);

    scroll(&engine, 2500.0);
    rain.update();
    assert_eq!(rain.splash_count(), 1);
}
