//! The frame-driven engine implementation.

use std::collections::{HashMap, HashSet};

use glyphfall_core::{PxRect, ScrollState};
use tracing::{debug, trace};

use crate::property::{Property, PropertySet, PropertyValues};
use crate::timeline::{Repeat, Timeline};
use crate::trigger::{ScrollTrigger, TriggerOutput, TriggerState};
use crate::tween::{Action, Step, Tween, TweenState};
use crate::{
    AnimationEngine, Capabilities, EngineEvent, KillQueue, ScopeId, TargetId, TimelineId,
    TriggerId, TweenId,
};

/// Upper bound on timeline wraps in one tick.
const MAX_WRAPS_PER_TICK: usize = 1024;

/// Frame gaps longer than `threshold` seconds advance by `adjusted` seconds
/// instead, so a stalled frame loop does not fast-forward every animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagSmoothing {
    pub threshold: f32,
    pub adjusted: f32,
}

impl Default for LagSmoothing {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            adjusted: 0.033,
        }
    }
}

/// Live resource counts for one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeStats {
    pub targets: usize,
    pub timelines: usize,
    pub tweens: usize,
    pub triggers: usize,
}

impl ScopeStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug)]
struct TargetEntry {
    scope: ScopeId,
    values: PropertyValues,
}

#[derive(Debug)]
struct ActiveTween {
    scope: ScopeId,
    elapsed: f32,
    state: TweenState,
    killed: bool,
}

/// Tweening, timelines and scroll triggers on one frame loop.
#[derive(Debug)]
pub struct Engine {
    capabilities: Capabilities,
    lag_smoothing: Option<LagSmoothing>,
    next_id: u64,
    scopes: HashSet<ScopeId>,
    targets: HashMap<TargetId, TargetEntry>,
    timelines: Vec<Timeline>,
    tweens: Vec<ActiveTween>,
    triggers: Vec<TriggerState>,
    events: HashMap<ScopeId, Vec<EngineEvent>>,
    scroll: Option<ScrollState>,
    kill_queue: KillQueue,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with timelines and scroll triggers.
    pub fn new() -> Self {
        Self {
            capabilities: Capabilities {
                timelines: true,
                scroll_triggers: true,
            },
            lag_smoothing: Some(LagSmoothing::default()),
            next_id: 1,
            scopes: HashSet::new(),
            targets: HashMap::new(),
            timelines: Vec::new(),
            tweens: Vec::new(),
            triggers: Vec::new(),
            events: HashMap::new(),
            scroll: None,
            kill_queue: KillQueue::new(),
        }
    }

    /// Create an engine whose scroll trigger plugin is missing.
    pub fn without_scroll_triggers() -> Self {
        let mut engine = Self::new();
        engine.capabilities.scroll_triggers = false;
        engine
    }

    pub fn with_lag_smoothing(mut self, lag_smoothing: Option<LagSmoothing>) -> Self {
        self.lag_smoothing = lag_smoothing;
        self
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Last scroll state passed to [`Engine::scroll_to`].
    pub fn scroll_state(&self) -> Option<ScrollState> {
        self.scroll
    }

    pub fn time_scale(&self, timeline: TimelineId) -> Option<f32> {
        self.timelines
            .iter()
            .find(|tl| tl.id == timeline)
            .map(|tl| tl.time_scale)
    }

    /// Current progress of a scrub trigger.
    pub fn trigger_progress(&self, trigger: TriggerId) -> Option<f32> {
        self.triggers
            .iter()
            .find(|state| state.id == trigger && state.is_scrub())
            .map(|state| state.progress)
    }

    pub fn scope_stats(&self, scope: ScopeId) -> ScopeStats {
        ScopeStats {
            targets: self.targets.values().filter(|t| t.scope == scope).count(),
            timelines: self.timelines.iter().filter(|t| t.scope == scope).count(),
            tweens: self
                .tweens
                .iter()
                .filter(|t| t.scope == scope && !t.killed)
                .count(),
            triggers: self.triggers.iter().filter(|t| t.scope == scope).count(),
        }
    }

    /// Kill the scopes queued while the engine was borrowed.
    fn reap(&mut self) {
        for scope in self.kill_queue.take() {
            trace!(?scope, "killing queued scope");
            self.kill_scope(scope);
        }
    }

    /// Advance every timeline and tween by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        self.reap();
        let mut dt = dt.max(0.0);
        if let Some(lag) = self.lag_smoothing
            && dt > lag.threshold
        {
            trace!(dt, adjusted = lag.adjusted, "lag smoothing");
            dt = lag.adjusted;
        }

        for index in 0..self.timelines.len() {
            self.advance_timeline(index, dt);
        }
        self.timelines.retain(|tl| !tl.finished);

        let count = self.tweens.len();
        for index in 0..count {
            self.advance_tween(index, dt);
        }
        self.tweens.retain(|tween| !tween.killed && !tween.state.done);
    }

    /// Evaluate every scroll trigger against a new scroll position.
    pub fn scroll_to(&mut self, scroll: ScrollState) {
        self.reap();
        self.scroll = Some(scroll);
        let mut outputs = Vec::new();
        for trigger in &mut self.triggers {
            if let Some(output) = trigger.evaluate(&scroll) {
                outputs.push((trigger.scope, trigger.id, output));
            }
        }
        for (scope, trigger, output) in outputs {
            self.emit_trigger(scope, trigger, output);
        }
    }

    fn advance_timeline(&mut self, index: usize, dt: f32) {
        if self.timelines[index].finished {
            return;
        }
        let mut remaining = dt * self.timelines[index].time_scale.max(0.0);
        for _ in 0..MAX_WRAPS_PER_TICK {
            let duration = self.timelines[index].duration();
            {
                let timeline = &mut self.timelines[index];
                let step = remaining.min((duration - timeline.time).max(0.0));
                timeline.time += step;
                remaining -= step;
            }
            self.render_timeline(index);

            let timeline = &mut self.timelines[index];
            if timeline.time < duration {
                return;
            }
            if !timeline.can_repeat() {
                timeline.finished = true;
                return;
            }
            if duration <= 0.0 {
                return;
            }
            timeline.wrap();
            if remaining <= 0.0 {
                return;
            }
        }
    }

    fn render_timeline(&mut self, index: usize) {
        let time = self.timelines[index].time;
        let scope = self.timelines[index].scope;
        for child_index in 0..self.timelines[index].children.len() {
            let child = &mut self.timelines[index].children[child_index];
            let target = child.state.spec.target;
            let values = self.targets.get_mut(&target).map(|entry| &mut entry.values);
            let step = child.state.render_at(time - child.position, values);
            if step == Step::default() {
                continue;
            }
            let spec = &child.state.spec;
            let notify = spec.notify;
            let on_start = if step.started {
                spec.on_start.clone()
            } else {
                Vec::new()
            };
            let on_complete = if step.completed {
                spec.on_complete.clone()
            } else {
                Vec::new()
            };
            self.finish_step(scope, target, notify, step, on_start, on_complete);
        }
    }

    fn advance_tween(&mut self, index: usize, dt: f32) {
        let active = &mut self.tweens[index];
        if active.killed {
            return;
        }
        active.elapsed += dt;
        let target = active.state.spec.target;
        let values = self.targets.get_mut(&target).map(|entry| &mut entry.values);
        let step = active.state.render_at(active.elapsed, values);
        if step == Step::default() {
            return;
        }
        let scope = active.scope;
        let spec = &active.state.spec;
        let notify = spec.notify;
        let on_start = if step.started {
            spec.on_start.clone()
        } else {
            Vec::new()
        };
        let on_complete = if step.completed {
            spec.on_complete.clone()
        } else {
            Vec::new()
        };
        self.finish_step(scope, target, notify, step, on_start, on_complete);
    }

    fn finish_step(
        &mut self,
        scope: ScopeId,
        target: TargetId,
        notify: bool,
        step: Step,
        on_start: Vec<Action>,
        on_complete: Vec<Action>,
    ) {
        if step.started {
            if notify {
                self.emit(scope, EngineEvent::TweenStarted { target });
            }
            self.run_actions(target, on_start);
        }
        if step.completed {
            if notify {
                self.emit(scope, EngineEvent::TweenCompleted { target });
            }
            self.run_actions(target, on_complete);
        }
    }

    fn run_actions(&mut self, target: TargetId, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Set(property, value) => self.set_property(target, property, value),
                Action::Animate {
                    property,
                    to,
                    duration,
                    ease,
                } => {
                    let tween = Tween::to(target, PropertySet::new().with(property, to), duration)
                        .with_ease(ease);
                    self.animate(tween);
                }
                Action::Remove => self.remove_target(target),
            }
        }
    }

    /// Cancel standalone tweens of `property` on `target`.
    fn overwrite(&mut self, target: TargetId, property: Property) {
        for active in &mut self.tweens {
            if active.killed || active.state.spec.target != target {
                continue;
            }
            if active.state.spec.to.contains(property) && !active.state.kill_property(property) {
                active.killed = true;
            }
        }
    }

    fn emit(&mut self, scope: ScopeId, event: EngineEvent) {
        if !self.scopes.contains(&scope) {
            return;
        }
        let queue = self.events.entry(scope).or_default();
        if let EngineEvent::ScrollProgress { trigger, progress } = event
            && let Some(EngineEvent::ScrollProgress {
                progress: pending, ..
            }) = queue.iter_mut().find(|queued| {
                matches!(queued, EngineEvent::ScrollProgress { trigger: t, .. } if *t == trigger)
            })
        {
            *pending = progress;
            return;
        }
        queue.push(event);
    }

    fn emit_trigger(&mut self, scope: ScopeId, trigger: TriggerId, output: TriggerOutput) {
        let event = match output {
            TriggerOutput::Progress(progress) => EngineEvent::ScrollProgress { trigger, progress },
            TriggerOutput::Fired(crossing) => {
                trace!(?trigger, ?crossing, "scroll trigger fired");
                EngineEvent::TriggerFired { trigger, crossing }
            }
        };
        self.emit(scope, event);
    }
}

impl AnimationEngine for Engine {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn create_scope(&mut self) -> ScopeId {
        let scope = ScopeId(self.next_id());
        self.scopes.insert(scope);
        scope
    }

    fn kill_scope(&mut self, scope: ScopeId) {
        if !self.scopes.remove(&scope) {
            return;
        }
        let before = self.scope_stats(scope);
        self.targets.retain(|_, entry| entry.scope != scope);
        self.timelines.retain(|tl| tl.scope != scope);
        self.tweens.retain(|tween| tween.scope != scope);
        self.triggers.retain(|trigger| trigger.scope != scope);
        self.events.remove(&scope);
        debug!(
            ?scope,
            targets = before.targets,
            timelines = before.timelines,
            tweens = before.tweens,
            triggers = before.triggers,
            "killed scope"
        );
    }

    fn kill_queue(&self) -> Option<KillQueue> {
        Some(self.kill_queue.clone())
    }

    fn create_target(&mut self, scope: ScopeId) -> TargetId {
        let target = TargetId(self.next_id());
        self.targets.insert(
            target,
            TargetEntry {
                scope,
                values: PropertyValues::default(),
            },
        );
        target
    }

    fn remove_target(&mut self, target: TargetId) {
        let Some(entry) = self.targets.remove(&target) else {
            return;
        };
        for active in &mut self.tweens {
            if active.state.spec.target == target {
                active.killed = true;
            }
        }
        self.emit(entry.scope, EngineEvent::TargetRemoved { target });
    }

    fn value(&self, target: TargetId, property: Property) -> Option<f32> {
        self.targets
            .get(&target)
            .map(|entry| entry.values.get(property))
    }

    fn set_property(&mut self, target: TargetId, property: Property, value: f32) {
        let Some(entry) = self.targets.get_mut(&target) else {
            return;
        };
        entry.values.set(property, value);
        self.overwrite(target, property);
    }

    fn animate(&mut self, tween: Tween) -> Option<TweenId> {
        let scope = self.targets.get(&tween.target)?.scope;
        for (property, _) in tween.to.iter() {
            self.overwrite(tween.target, property);
        }
        let id = TweenId(self.next_id());
        self.tweens.push(ActiveTween {
            scope,
            elapsed: 0.0,
            state: TweenState::new(tween),
            killed: false,
        });
        Some(id)
    }

    fn create_timeline(&mut self, scope: ScopeId, repeat: Repeat) -> TimelineId {
        let id = TimelineId(self.next_id());
        self.timelines.push(Timeline::new(id, scope, repeat));
        id
    }

    fn add_to_timeline(&mut self, timeline: TimelineId, tween: Tween, position: f32) {
        if let Some(tl) = self.timelines.iter_mut().find(|tl| tl.id == timeline) {
            tl.add(tween, position);
        }
    }

    fn set_time_scale(&mut self, timeline: TimelineId, scale: f32) {
        if let Some(tl) = self.timelines.iter_mut().find(|tl| tl.id == timeline) {
            tl.time_scale = scale.max(0.0);
        }
    }

    fn register_scroll_trigger(
        &mut self,
        scope: ScopeId,
        trigger: ScrollTrigger,
    ) -> Option<TriggerId> {
        if !self.capabilities.scroll_triggers {
            return None;
        }
        let id = TriggerId(self.next_id());
        let state = TriggerState::new(id, scope, trigger, self.scroll.as_ref());
        if state.is_scrub() && self.scroll.is_some() {
            let progress = state.progress;
            self.emit(scope, EngineEvent::ScrollProgress { trigger: id, progress });
        }
        self.triggers.push(state);
        Some(id)
    }

    fn update_trigger_region(&mut self, trigger: TriggerId, region: PxRect) {
        let scroll = self.scroll;
        let Some(state) = self.triggers.iter_mut().find(|state| state.id == trigger) else {
            return;
        };
        let scope = state.scope;
        if let Some(output) = state.relayout(region, scroll.as_ref()) {
            self.emit_trigger(scope, trigger, output);
        }
    }

    fn take_events(&mut self, scope: ScopeId) -> Vec<EngineEvent> {
        self.events.remove(&scope).unwrap_or_default()
    }
}
