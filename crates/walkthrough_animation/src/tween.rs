//! Fixed-duration tweens
//!
//! A [`Tween`] ramps progress from 0 to 1 over a duration and maps it through
//! an [`Easing`] curve onto an interpolated value. Instead of update and
//! completion callbacks, [`Tween::advance`] returns the step that happened, so
//! the owner can cancel or restart the tween while handling it:
//!
//! ```ignore
//! let mut tween = Tween::new();
//! tween.begin(0.0_f32, 10.0, 1000, Easing::CubicInOut);
//!
//! while let Some(step) = tween.advance(16.0) {
//!     match step {
//!         TweenStep::Running(value) => apply(value),
//!         TweenStep::Finished(value) => { apply(value); break; }
//!     }
//! }
//! ```

use crate::easing::Easing;
use crate::values::Interpolate;

/// Result of advancing a tween by one tick
#[derive(Clone, Debug, PartialEq)]
pub enum TweenStep<T> {
    /// Still in flight; carries the eased value for this tick
    Running(T),
    /// Reached the end this tick; carries the exact end value
    ///
    /// Reported exactly once per `begin`.
    Finished(T),
}

impl<T> TweenStep<T> {
    pub fn value(&self) -> &T {
        match self {
            TweenStep::Running(value) | TweenStep::Finished(value) => value,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TweenStep::Finished(_))
    }
}

#[derive(Clone, Debug)]
struct ActiveTween<T> {
    from: T,
    to: T,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
}

impl<T: Interpolate> ActiveTween<T> {
    fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }
}

/// Interpolates a value between two endpoints over a fixed duration
#[derive(Clone, Debug)]
pub struct Tween<T: Interpolate> {
    active: Option<ActiveTween<T>>,
}

impl<T: Interpolate> Default for Tween<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Interpolate> Tween<T> {
    /// Create an idle tween
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Start a ramp from `from` to `to`, replacing anything in flight
    ///
    /// A zero duration completes on the next [`advance`](Self::advance).
    pub fn begin(&mut self, from: T, to: T, duration_ms: u32, easing: Easing) {
        self.active = Some(ActiveTween {
            from,
            to,
            duration_ms: duration_ms as f32,
            elapsed_ms: 0.0,
            easing,
        });
    }

    /// Advance by `dt_ms` milliseconds
    ///
    /// Returns `None` when idle (never started, finished, or cancelled).
    pub fn advance(&mut self, dt_ms: f32) -> Option<TweenStep<T>> {
        let active = self.active.as_mut()?;
        if dt_ms.is_finite() && dt_ms > 0.0 {
            active.elapsed_ms += dt_ms;
        }

        let progress = active.progress();
        if progress >= 1.0 {
            let finished = self.active.take()?;
            return Some(TweenStep::Finished(finished.to));
        }

        let eased = active.easing.apply(progress);
        Some(TweenStep::Running(active.from.lerp(&active.to, eased)))
    }

    /// Drop any in-flight ramp without reporting completion
    ///
    /// Returns whether something was actually cancelled; calling it again, or
    /// after completion, is a no-op.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Linear progress of the in-flight ramp
    pub fn progress(&self) -> Option<f32> {
        self.active.as_ref().map(ActiveTween::progress)
    }

    /// End value of the in-flight ramp
    pub fn destination(&self) -> Option<&T> {
        self.active.as_ref().map(|active| &active.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_tween_reports_nothing() {
        let mut tween: Tween<f32> = Tween::new();
        assert_eq!(tween.advance(16.0), None);
        assert!(!tween.is_active());
    }

    #[test]
    fn test_runs_then_finishes_once() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 100.0, 1000, Easing::Linear);

        assert_eq!(tween.advance(500.0), Some(TweenStep::Running(50.0)));
        assert_eq!(tween.advance(500.0), Some(TweenStep::Finished(100.0)));
        assert_eq!(tween.advance(500.0), None);
    }

    #[test]
    fn test_overshoot_is_clamped_to_end_value() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 1.0, 100, Easing::CubicInOut);
        assert_eq!(tween.advance(10_000.0), Some(TweenStep::Finished(1.0)));
    }

    #[test]
    fn test_eased_values_follow_curve() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 1.0, 1000, Easing::CubicInOut);
        let step = tween.advance(250.0).unwrap();
        assert!((step.value() - Easing::CubicInOut.apply(0.25)).abs() < 1e-6);
        assert!(!step.is_finished());
    }

    #[test]
    fn test_zero_duration_completes_on_next_tick() {
        let mut tween = Tween::new();
        tween.begin(3.0_f32, 7.0, 0, Easing::CubicInOut);
        assert!(tween.is_active());
        assert_eq!(tween.advance(0.0), Some(TweenStep::Finished(7.0)));
    }

    #[test]
    fn test_cancel_is_idempotent_and_suppresses_completion() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 1.0, 1000, Easing::Linear);
        tween.advance(100.0);

        assert!(tween.cancel());
        assert!(!tween.cancel());
        assert_eq!(tween.advance(5000.0), None);
    }

    #[test]
    fn test_cancel_after_completion_is_noop() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 1.0, 10, Easing::Linear);
        assert!(tween.advance(20.0).unwrap().is_finished());
        assert!(!tween.cancel());
    }

    #[test]
    fn test_begin_replaces_in_flight_ramp() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 1.0, 1000, Easing::Linear);
        tween.advance(900.0);
        tween.begin(10.0, 20.0, 1000, Easing::Linear);
        assert_eq!(tween.progress(), Some(0.0));
        assert_eq!(tween.destination(), Some(&20.0));
    }

    #[test]
    fn test_negative_delta_does_not_rewind() {
        let mut tween = Tween::new();
        tween.begin(0.0_f32, 1.0, 1000, Easing::Linear);
        tween.advance(500.0);
        tween.advance(-400.0);
        assert_eq!(tween.progress(), Some(0.5));
    }
}
