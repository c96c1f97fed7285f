//! Scroll triggers: scroll-linked progress and edge crossings over a region.

use glyphfall_core::{PxRect, ScrollState};

use crate::{ScopeId, TriggerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
}

/// The scroll position where an edge of the region meets an edge of the
/// viewport, e.g. "top bottom" is the region's top touching the viewport's
/// bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub element: Edge,
    pub viewport: Edge,
}

impl Anchor {
    pub const TOP_BOTTOM: Anchor = Anchor::new(Edge::Top, Edge::Bottom);
    pub const TOP_TOP: Anchor = Anchor::new(Edge::Top, Edge::Top);
    pub const BOTTOM_BOTTOM: Anchor = Anchor::new(Edge::Bottom, Edge::Bottom);
    pub const BOTTOM_TOP: Anchor = Anchor::new(Edge::Bottom, Edge::Top);

    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the two edges line up.
    pub fn offset(&self, region: PxRect, viewport_height: f32) -> f32 {
        let element = match self.element {
            Edge::Top => region.top(),
            Edge::Bottom => region.bottom(),
        };
        let viewport = match self.viewport {
            Edge::Top => 0.0,
            Edge::Bottom => viewport_height,
        };
        element - viewport
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Continuous progress from `start` (0) to `end` (1).
    Scrub { start: Anchor, end: Anchor },
    /// Fires when scrolling forward past `start`.
    Enter { start: Anchor },
    /// Fires when scrolling backward past `start`.
    LeaveBack { start: Anchor },
}

/// Registration request for a scroll trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    /// Region in document coordinates.
    pub region: PxRect,
    pub kind: TriggerKind,
}

impl ScrollTrigger {
    /// Progress over the region's whole pass through the viewport.
    pub fn scrub(region: PxRect) -> Self {
        Self {
            region,
            kind: TriggerKind::Scrub {
                start: Anchor::TOP_BOTTOM,
                end: Anchor::BOTTOM_TOP,
            },
        }
    }

    pub fn on_enter(region: PxRect, start: Anchor) -> Self {
        Self {
            region,
            kind: TriggerKind::Enter { start },
        }
    }

    pub fn on_leave_back(region: PxRect, start: Anchor) -> Self {
        Self {
            region,
            kind: TriggerKind::LeaveBack { start },
        }
    }
}

/// Which discrete crossing fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Enter,
    LeaveBack,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TriggerOutput {
    Progress(f32),
    Fired(Crossing),
}

#[derive(Debug)]
pub(crate) struct TriggerState {
    pub id: TriggerId,
    pub scope: ScopeId,
    pub spec: ScrollTrigger,
    pub progress: f32,
    past_start: bool,
}

impl TriggerState {
    /// Registering never fires a crossing: the initial side of `start` is
    /// taken from the current scroll position.
    pub fn new(
        id: TriggerId,
        scope: ScopeId,
        spec: ScrollTrigger,
        scroll: Option<&ScrollState>,
    ) -> Self {
        let mut state = Self {
            id,
            scope,
            spec,
            progress: 0.0,
            past_start: false,
        };
        if let Some(scroll) = scroll {
            state.past_start = scroll.offset >= state.start_offset(scroll.viewport_height);
            state.progress = state.scrub_progress(scroll);
        }
        state
    }

    pub fn is_scrub(&self) -> bool {
        matches!(self.spec.kind, TriggerKind::Scrub { .. })
    }

    fn start_offset(&self, viewport_height: f32) -> f32 {
        let start = match self.spec.kind {
            TriggerKind::Scrub { start, .. }
            | TriggerKind::Enter { start }
            | TriggerKind::LeaveBack { start } => start,
        };
        start.offset(self.spec.region, viewport_height)
    }

    fn scrub_progress(&self, scroll: &ScrollState) -> f32 {
        let TriggerKind::Scrub { start, end } = self.spec.kind else {
            return 0.0;
        };
        let start = start.offset(self.spec.region, scroll.viewport_height);
        let end = end.offset(self.spec.region, scroll.viewport_height);
        if end <= start {
            return if scroll.offset >= start { 1.0 } else { 0.0 };
        }
        ((scroll.offset - start) / (end - start)).clamp(0.0, 1.0)
    }

    /// Move the region without firing crossings; scrub progress changes are
    /// still reported.
    pub fn relayout(&mut self, region: PxRect, scroll: Option<&ScrollState>) -> Option<TriggerOutput> {
        self.spec.region = region;
        let scroll = scroll?;
        self.past_start = scroll.offset >= self.start_offset(scroll.viewport_height);
        if !self.is_scrub() {
            return None;
        }
        let progress = self.scrub_progress(scroll);
        if (progress - self.progress).abs() > f32::EPSILON {
            self.progress = progress;
            Some(TriggerOutput::Progress(progress))
        } else {
            None
        }
    }

    /// Re-evaluate against a new scroll position.
    pub fn evaluate(&mut self, scroll: &ScrollState) -> Option<TriggerOutput> {
        let now_past = scroll.offset >= self.start_offset(scroll.viewport_height);
        let was_past = std::mem::replace(&mut self.past_start, now_past);
        match self.spec.kind {
            TriggerKind::Scrub { .. } => {
                let progress = self.scrub_progress(scroll);
                if (progress - self.progress).abs() > f32::EPSILON {
                    self.progress = progress;
                    Some(TriggerOutput::Progress(progress))
                } else {
                    None
                }
            }
            TriggerKind::Enter { .. } if !was_past && now_past => {
                Some(TriggerOutput::Fired(Crossing::Enter))
            }
            TriggerKind::LeaveBack { .. } if was_past && !now_past => {
                Some(TriggerOutput::Fired(Crossing::LeaveBack))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f32 = 600.0;

    fn section() -> PxRect {
        PxRect::new(0.0, 1200.0, 1000.0, 600.0)
    }

    fn at(offset: f32) -> ScrollState {
        ScrollState::new(offset, VIEWPORT, 3000.0)
    }

    fn state(spec: ScrollTrigger) -> TriggerState {
        TriggerState::new(TriggerId(1), ScopeId(1), spec, Some(&at(0.0)))
    }

    #[test]
    fn test_anchor_offsets() {
        assert_eq!(Anchor::TOP_BOTTOM.offset(section(), VIEWPORT), 600.0);
        assert_eq!(Anchor::BOTTOM_TOP.offset(section(), VIEWPORT), 1800.0);
        assert_eq!(Anchor::BOTTOM_BOTTOM.offset(section(), VIEWPORT), 1200.0);
        assert_eq!(Anchor::TOP_TOP.offset(section(), VIEWPORT), 1200.0);
    }

    #[test]
    fn test_scrub_progress() {
        let mut trigger = state(ScrollTrigger::scrub(section()));
        assert_eq!(trigger.evaluate(&at(300.0)), None);
        assert_eq!(
            trigger.evaluate(&at(1200.0)),
            Some(TriggerOutput::Progress(0.5))
        );
        assert_eq!(trigger.evaluate(&at(1200.0)), None);
        assert_eq!(
            trigger.evaluate(&at(2400.0)),
            Some(TriggerOutput::Progress(1.0))
        );
    }

    #[test]
    fn test_enter_fires_forward_only() {
        let mut trigger = state(ScrollTrigger::on_enter(section(), Anchor::BOTTOM_BOTTOM));
        assert_eq!(trigger.evaluate(&at(1100.0)), None);
        assert_eq!(
            trigger.evaluate(&at(1250.0)),
            Some(TriggerOutput::Fired(Crossing::Enter))
        );
        assert_eq!(trigger.evaluate(&at(1400.0)), None);
        assert_eq!(trigger.evaluate(&at(1000.0)), None);
        assert_eq!(
            trigger.evaluate(&at(1300.0)),
            Some(TriggerOutput::Fired(Crossing::Enter))
        );
    }

    #[test]
    fn test_leave_back_fires_backward_only() {
        let mut trigger = state(ScrollTrigger::on_leave_back(section(), Anchor::TOP_TOP));
        assert_eq!(trigger.evaluate(&at(1300.0)), None);
        assert_eq!(
            trigger.evaluate(&at(1100.0)),
            Some(TriggerOutput::Fired(Crossing::LeaveBack))
        );
        assert_eq!(trigger.evaluate(&at(900.0)), None);
    }

    #[test]
    fn test_registration_past_start_does_not_fire() {
        let spec = ScrollTrigger::on_enter(section(), Anchor::BOTTOM_BOTTOM);
        let mut trigger = TriggerState::new(TriggerId(1), ScopeId(1), spec, Some(&at(2000.0)));
        assert_eq!(trigger.evaluate(&at(2100.0)), None);
    }

    #[test]
    fn test_relayout_moves_start_silently() {
        let mut trigger = state(ScrollTrigger::on_enter(section(), Anchor::BOTTOM_BOTTOM));
        let moved = PxRect::new(0.0, 0.0, 1000.0, 600.0);
        assert_eq!(trigger.relayout(moved, Some(&at(500.0))), None);
        assert_eq!(trigger.evaluate(&at(600.0)), None);
        assert_eq!(trigger.evaluate(&at(-1.0)), None);
        assert_eq!(
            trigger.evaluate(&at(100.0)),
            Some(TriggerOutput::Fired(Crossing::Enter))
        );
    }

    #[test]
    fn test_registration_captures_scrub_progress() {
        let spec = ScrollTrigger::scrub(section());
        let trigger = TriggerState::new(TriggerId(1), ScopeId(1), spec, Some(&at(1200.0)));
        assert_eq!(trigger.progress, 0.5);
    }
}
