//! Reasons a rain controller is inert or refused.

use std::fmt;

/// Part of the animation engine a controller needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// No engine at all.
    Engine,
    /// Tweens and timelines.
    Timelines,
    /// Scroll-linked and one-shot triggers.
    ScrollTriggers,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Engine => "animation engine",
            Capability::Timelines => "timelines",
            Capability::ScrollTriggers => "scroll triggers",
        };
        f.write_str(name)
    }
}

/// Neither variant is fatal; callers log and carry on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RainError {
    #[error("{0} unavailable, rain degraded")]
    MissingCapability(Capability),

    #[error("container {0} already has a rain controller")]
    DuplicateInit(usize),
}
