//! Easing curves for tweens.

use serde::{Deserialize, Serialize};

/// Maps normalized tween time to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    /// Constant velocity.
    None,
    /// Quadratic deceleration.
    #[default]
    Power1Out,
    /// Cubic deceleration.
    Power2Out,
    /// Cubic S-curve.
    Power2InOut,
}

impl Ease {
    /// Apply the curve to `t` in `[0, 1]`.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::None => t,
            Self::Power1Out => 1.0 - (1.0 - t).powi(2),
            Self::Power2Out => 1.0 - (1.0 - t).powi(3),
            Self::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for ease in [Ease::None, Ease::Power1Out, Ease::Power2Out, Ease::Power2InOut] {
            assert_eq!(ease.apply(0.0), 0.0);
            assert_eq!(ease.apply(1.0), 1.0);
        }
    }

    #[test]
    fn test_none_is_linear() {
        assert_eq!(Ease::None.apply(0.25), 0.25);
        assert_eq!(Ease::None.apply(0.5), 0.5);
    }

    #[test]
    fn test_out_curves_decelerate() {
        // Out curves cover more than half the distance in the first half.
        assert!(Ease::Power1Out.apply(0.5) > 0.5);
        assert!(Ease::Power2Out.apply(0.5) > Ease::Power1Out.apply(0.5));
        assert!((Ease::Power2InOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_input() {
        assert_eq!(Ease::Power2Out.apply(-1.0), 0.0);
        assert_eq!(Ease::Power2Out.apply(2.0), 1.0);
    }
}
