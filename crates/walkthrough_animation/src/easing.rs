//! Easing curves
//!
//! All curves map `[0, 1]` onto `[0, 1]`, are continuous and monotonic, and
//! clamp their input.

use serde::{Deserialize, Serialize};

/// Easing function applied to linear progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadInOut,
    CubicIn,
    CubicOut,
    /// Symmetric acceleration then deceleration
    #[default]
    CubicInOut,
    /// `3t² - 2t³`
    Smoothstep,
}

impl Easing {
    /// Map linear progress `t` to eased progress
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 6] = [
        Easing::Linear,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::Smoothstep,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-6, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let value = easing.apply(i as f32 / 100.0);
                assert!(value >= prev - 1e-6, "{:?} decreased at step {}", easing, i);
                prev = value;
            }
        }
    }

    #[test]
    fn test_cubic_in_out_shape() {
        let ease = Easing::CubicInOut;
        assert!((ease.apply(0.25) - 4.0 * 0.25f32.powi(3)).abs() < 1e-6);
        assert!((ease.apply(0.5) - 0.5).abs() < 1e-6);
        // Mirrored around the midpoint
        assert!((ease.apply(0.25) + ease.apply(0.75) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Easing::CubicInOut.apply(-1.0), 0.0);
        assert_eq!(Easing::CubicInOut.apply(2.0), 1.0);
        assert_eq!(Easing::Linear.apply(f32::NAN), 0.0);
    }
}
