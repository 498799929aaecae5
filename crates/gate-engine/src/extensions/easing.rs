// extensions/easing.rs
//
// Sweep shapes for the timing indicator.
// Only monotonic curves that stay inside [0, 1]: the indicator must never
// leave the track, so overshooting curves (back, elastic) are not offered.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing applied to each half of the indicator's back-and-forth sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// Slow near both ends of the track.
    QuadInOut,
    /// Stronger slow-down near both ends.
    CubicInOut,
    /// Pendulum-like.
    SineInOut,
}

impl Easing {
    /// Apply the easing function to a normalized time value `t` in [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Fold an unbounded phase into a 0→1→0 triangle wave with period 2.
#[inline]
pub fn ping_pong(phase: f32) -> f32 {
    let p = phase.rem_euclid(2.0);
    if p <= 1.0 {
        p
    } else {
        2.0 - p
    }
}
