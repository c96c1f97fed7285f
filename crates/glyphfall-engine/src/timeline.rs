//! Timelines: tweens scheduled at fixed positions, optionally repeating.

use crate::tween::{Tween, TweenState};
use crate::{ScopeId, TimelineId};

/// How many times a timeline plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Extra plays after the first.
    Count(u32),
    Infinite,
}

#[derive(Debug)]
pub(crate) struct TimelineChild {
    /// Start time within one play of the timeline.
    pub position: f32,
    pub state: TweenState,
}

#[derive(Debug)]
pub(crate) struct Timeline {
    pub id: TimelineId,
    pub scope: ScopeId,
    pub repeat: Repeat,
    /// Playhead within the current play.
    pub time: f32,
    /// Completed plays.
    pub iteration: u64,
    pub time_scale: f32,
    pub children: Vec<TimelineChild>,
    pub finished: bool,
}

impl Timeline {
    pub fn new(id: TimelineId, scope: ScopeId, repeat: Repeat) -> Self {
        Self {
            id,
            scope,
            repeat,
            time: 0.0,
            iteration: 0,
            time_scale: 1.0,
            children: Vec::new(),
            finished: false,
        }
    }

    /// Schedule a tween; its own delay shifts the position.
    pub fn add(&mut self, tween: Tween, position: f32) {
        let position = position.max(0.0) + tween.delay;
        let tween = Tween { delay: 0.0, ..tween };
        self.children.push(TimelineChild {
            position,
            state: TweenState::new(tween),
        });
    }

    /// Length of one play: the latest child end time.
    pub fn duration(&self) -> f32 {
        self.children
            .iter()
            .map(|child| child.position + child.state.spec.total_duration())
            .fold(0.0, f32::max)
    }

    /// Whether another play follows the current one.
    pub fn can_repeat(&self) -> bool {
        match self.repeat {
            Repeat::Infinite => true,
            Repeat::Count(count) => self.iteration < count as u64,
        }
    }

    /// Start the next play from the beginning.
    pub fn wrap(&mut self) {
        self.iteration += 1;
        self.time = 0.0;
        for child in &mut self.children {
            child.state.reset();
        }
    }
}
