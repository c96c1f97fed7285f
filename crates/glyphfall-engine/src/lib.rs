//! Animation engine for glyphfall.
//!
//! The engine owns animated property values for opaque targets and advances
//! them on a single-threaded frame loop. Everything a caller schedules
//! belongs to a scope, so one call to [`AnimationEngine::kill_scope`]
//! discards a whole controller's worth of timelines, tweens, triggers and
//! targets.
//!
//! Callers never receive callbacks. Reactions that must happen inside a
//! frame are declared up front as [`Action`]s; everything else is delivered
//! as [`EngineEvent`]s the owning scope drains with
//! [`AnimationEngine::take_events`].

use std::cell::RefCell;
use std::rc::Rc;

use glyphfall_core::PxRect;

mod engine;
mod property;
mod timeline;
mod trigger;
mod tween;

pub use engine::{Engine, LagSmoothing, ScopeStats};
pub use property::{Property, PropertySet, PropertyValues};
pub use timeline::Repeat;
pub use trigger::{Anchor, Crossing, Edge, ScrollTrigger, TriggerKind};
pub use tween::{Action, Tween};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) u64);

        impl $name {
            /// Wrap an id minted by an engine outside this crate.
            pub const fn from_raw(id: u64) -> Self {
                Self(id)
            }

            pub const fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

handle!(
    /// Owner of a group of engine resources.
    ScopeId
);
handle!(
    /// Something with animatable properties.
    TargetId
);
handle!(TimelineId);
handle!(TweenId);
handle!(TriggerId);

/// Which optional parts of the engine are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub timelines: bool,
    pub scroll_triggers: bool,
}

/// Notifications queued for a scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A tween created with [`Tween::notify`] started a play.
    TweenStarted { target: TargetId },
    /// A tween created with [`Tween::notify`] finished a play.
    TweenCompleted { target: TargetId },
    /// A target was removed, by request or by an [`Action::Remove`].
    TargetRemoved { target: TargetId },
    /// A scrub trigger's progress changed. Consecutive undelivered updates
    /// for one trigger are coalesced into the latest.
    ScrollProgress { trigger: TriggerId, progress: f32 },
    /// A one-shot trigger crossed its start edge.
    TriggerFired { trigger: TriggerId, crossing: Crossing },
}

/// Scopes waiting to be killed by their engine.
///
/// A controller that is disposed while the engine is borrowed cannot kill
/// its scope directly; it pushes the scope here instead and the engine
/// kills it before its next frame or scroll update. Clones share one queue.
#[derive(Debug, Clone, Default)]
pub struct KillQueue(Rc<RefCell<Vec<ScopeId>>>);

impl KillQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, scope: ScopeId) {
        self.0.borrow_mut().push(scope);
    }

    /// Remove and return every queued scope.
    pub fn take(&self) -> Vec<ScopeId> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// The capability a rain controller is given.
///
/// Operations on unknown or removed handles are ignored.
pub trait AnimationEngine {
    fn capabilities(&self) -> Capabilities;

    fn create_scope(&mut self) -> ScopeId;

    /// Discard every resource in `scope`, including queued events.
    fn kill_scope(&mut self, scope: ScopeId);

    /// Queue for scopes whose owner could not borrow the engine.
    ///
    /// `None` when the engine has no deferred kills; such scopes stay alive.
    fn kill_queue(&self) -> Option<KillQueue> {
        None
    }

    fn create_target(&mut self, scope: ScopeId) -> TargetId;

    fn remove_target(&mut self, target: TargetId);

    fn value(&self, target: TargetId, property: Property) -> Option<f32>;

    /// Set a property now, cancelling standalone tweens of that property.
    fn set_property(&mut self, target: TargetId, property: Property, value: f32);

    /// Start a standalone tween. Existing standalone tweens of the same
    /// properties on the same target are cancelled.
    fn animate(&mut self, tween: Tween) -> Option<TweenId>;

    fn create_timeline(&mut self, scope: ScopeId, repeat: Repeat) -> TimelineId;

    /// Schedule `tween` at `position` seconds into each play of `timeline`.
    fn add_to_timeline(&mut self, timeline: TimelineId, tween: Tween, position: f32);

    /// Playback rate multiplier for a timeline.
    fn set_time_scale(&mut self, timeline: TimelineId, scale: f32);

    /// `None` when scroll triggers are unavailable.
    fn register_scroll_trigger(
        &mut self,
        scope: ScopeId,
        trigger: ScrollTrigger,
    ) -> Option<TriggerId>;

    /// Move a trigger's region after a layout change.
    fn update_trigger_region(&mut self, trigger: TriggerId, region: PxRect);

    /// Drain the events queued for `scope`, oldest first.
    fn take_events(&mut self, scope: ScopeId) -> Vec<EngineEvent>;
}

/// An engine shared by every controller on the page.
pub type SharedEngine = Rc<RefCell<dyn AnimationEngine>>;
