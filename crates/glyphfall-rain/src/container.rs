//! Where a rain controller lives on the page.

use glyphfall_core::PxRect;

/// A rain container filling its enclosing section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    /// Enclosing section in document coordinates.
    pub section: PxRect,
    /// Viewport height when the container was measured.
    pub viewport_height: f32,
}

impl Container {
    pub fn new(section: PxRect, viewport_height: f32) -> Self {
        Self {
            section,
            viewport_height,
        }
    }

    pub fn width(&self) -> f32 {
        self.section.width
    }

    pub fn height(&self) -> f32 {
        self.section.height
    }
}
