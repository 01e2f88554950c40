//! Walkthrough Animation
//!
//! Time-based motion primitives for scripted camera legs.
//!
//! # Features
//!
//! - **Easing**: monotonic curves with `f(0) = 0` and `f(1) = 1`
//! - **Tweens**: fixed-duration interpolation between two values, reporting
//!   each eased step and completion exactly once
//! - **Timers**: cancelable delays keyed by slotmap handles
//!
//! Everything is advanced explicitly with elapsed milliseconds; nothing here
//! owns a clock or a thread.

pub mod easing;
pub mod timer;
pub mod tween;
pub mod values;

pub use easing::Easing;
pub use timer::{TimerId, TimerQueue};
pub use tween::{Tween, TweenStep};
pub use values::Interpolate;
