//! Page geometry: five full-viewport sections stacked in one document.

use glyphfall_core::{PxRect, ScrollState};
use glyphfall_rain::Projection;

/// Static copy for one section.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub title: &'static str,
    pub tagline: &'static str,
}

pub const SECTIONS: [Section; 5] = [
    Section {
        title: "glyphfall",
        tagline: "Scroll down. The rain follows.",
    },
    Section {
        title: "Columns",
        tagline: "Every column falls at its own pace.",
    },
    Section {
        title: "Speed",
        tagline: "Rain quickens as a section passes through the screen.",
    },
    Section {
        title: "Splash",
        tagline: "Crossing a section boundary bursts the rain outward.",
    },
    Section {
        title: "Stay a while",
        tagline: "q to leave, r to toggle the rain.",
    },
];

/// Terminal-sized page with a scroll position in rows.
#[derive(Debug, Clone)]
pub struct Page {
    projection: Projection,
    width: u16,
    height: u16,
    scroll_rows: u32,
}

impl Page {
    pub fn new(projection: Projection, width: u16, height: u16) -> Self {
        Self {
            projection,
            width,
            height,
            scroll_rows: 0,
        }
    }

    /// Adopt a new terminal size, keeping the same relative position.
    pub fn resize(&mut self, width: u16, height: u16) {
        let fraction = self.progress();
        self.width = width;
        self.height = height;
        self.scroll_rows = (fraction * self.max_scroll() as f32).round() as u32;
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Rows per section; each section fills the viewport.
    pub fn section_rows(&self) -> u32 {
        u32::from(self.height.max(1))
    }

    pub fn document_rows(&self) -> u32 {
        self.section_rows() * SECTIONS.len() as u32
    }

    pub fn max_scroll(&self) -> u32 {
        self.document_rows().saturating_sub(u32::from(self.height))
    }

    pub fn scroll_rows(&self) -> u32 {
        self.scroll_rows
    }

    /// Scroll by `delta` rows, clamped to the document.
    pub fn scroll_by(&mut self, delta: i64) {
        let target = (i64::from(self.scroll_rows) + delta).clamp(0, i64::from(self.max_scroll()));
        self.scroll_rows = target as u32;
    }

    pub fn scroll_home(&mut self) {
        self.scroll_rows = 0;
    }

    pub fn scroll_end(&mut self) {
        self.scroll_rows = self.max_scroll();
    }

    /// Scroll progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.scroll_state().progress_percent() / 100.0
    }

    pub fn viewport_px(&self) -> f32 {
        self.projection.height_px(self.height)
    }

    pub fn scroll_state(&self) -> ScrollState {
        let rows_px = |rows: u32| rows as f32 * self.projection.cell_height;
        ScrollState::new(
            rows_px(self.scroll_rows),
            self.viewport_px(),
            rows_px(self.document_rows()),
        )
    }

    /// Section bounds in document pixels.
    pub fn section_rect(&self, index: usize) -> PxRect {
        let height = self.section_rows() as f32 * self.projection.cell_height;
        PxRect::new(
            0.0,
            index as f32 * height,
            self.projection.width_px(self.width),
            height,
        )
    }

    /// Screen row of a section's top edge; negative once scrolled past.
    pub fn section_top(&self, index: usize) -> i64 {
        index as i64 * i64::from(self.section_rows()) - i64::from(self.scroll_rows)
    }
}
