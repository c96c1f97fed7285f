//! Page scroll state and the intensity curves derived from it.

/// Rain playback rate at zero section progress.
const SPEED_BASE: f32 = 0.5;
/// Additional playback rate at full section progress.
const SPEED_GAIN: f32 = 1.5;
/// Container opacity at zero section progress.
const OPACITY_BASE: f32 = 0.2;
/// Additional container opacity at full section progress.
const OPACITY_GAIN: f32 = 0.3;

/// Snapshot of the page scroll position, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Distance scrolled from the top of the document.
    pub offset: f32,
    /// Height of the visible viewport.
    pub viewport_height: f32,
    /// Total height of the document.
    pub document_height: f32,
}

impl ScrollState {
    pub fn new(offset: f32, viewport_height: f32, document_height: f32) -> Self {
        Self {
            offset,
            viewport_height,
            document_height,
        }
    }

    /// Largest reachable scroll offset.
    pub fn max_offset(&self) -> f32 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Copy with the offset clamped to the scrollable range.
    pub fn clamped(self) -> Self {
        Self {
            offset: self.offset.clamp(0.0, self.max_offset()),
            ..self
        }
    }

    /// Page scroll progress in percent: 0 at the top, 100 at the bottom.
    ///
    /// A document that fits in the viewport reports 0.
    pub fn progress_percent(&self) -> f32 {
        let max = self.max_offset();
        if max <= 0.0 {
            return 0.0;
        }
        (self.offset / max * 100.0).clamp(0.0, 100.0)
    }
}

/// Rain playback rate for a section progress `p` in `[0, 1]`.
pub fn speed_multiplier(progress: f32) -> f32 {
    SPEED_BASE + progress.clamp(0.0, 1.0) * SPEED_GAIN
}

/// Rain container opacity for a section progress `p` in `[0, 1]`.
pub fn container_opacity(progress: f32) -> f32 {
    OPACITY_BASE + progress.clamp(0.0, 1.0) * OPACITY_GAIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bounds() {
        let top = ScrollState::new(0.0, 600.0, 3000.0);
        assert_eq!(top.progress_percent(), 0.0);

        let bottom = ScrollState::new(2400.0, 600.0, 3000.0);
        assert_eq!(bottom.progress_percent(), 100.0);
    }

    #[test]
    fn test_progress_is_linear() {
        let max = 2400.0;
        for step in 0..=8 {
            let offset = max * step as f32 / 8.0;
            let state = ScrollState::new(offset, 600.0, 3000.0);
            let expected = step as f32 / 8.0 * 100.0;
            assert!((state.progress_percent() - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn test_progress_short_document() {
        let state = ScrollState::new(0.0, 600.0, 400.0);
        assert_eq!(state.max_offset(), 0.0);
        assert_eq!(state.progress_percent(), 0.0);
    }

    #[test]
    fn test_clamped_offset() {
        let state = ScrollState::new(5000.0, 600.0, 3000.0).clamped();
        assert_eq!(state.offset, 2400.0);
        let state = ScrollState::new(-10.0, 600.0, 3000.0).clamped();
        assert_eq!(state.offset, 0.0);
    }

    #[test]
    fn test_intensity_curves() {
        assert_eq!(speed_multiplier(0.0), 0.5);
        assert_eq!(speed_multiplier(1.0), 2.0);
        assert_eq!(speed_multiplier(0.5), 1.25);
        assert_eq!(container_opacity(0.0), 0.2);
        assert_eq!(container_opacity(1.0), 0.5);
        assert!((container_opacity(0.5) - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_intensity_curves_clamp() {
        assert_eq!(speed_multiplier(-1.0), 0.5);
        assert_eq!(speed_multiplier(4.0), 2.0);
        assert_eq!(container_opacity(4.0), 0.5);
    }
}
