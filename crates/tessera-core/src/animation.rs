#![forbid(unsafe_code)]

//! Frame-driven animation primitives.
//!
//! Nothing here owns a timer. Hosts call [`Animation::tick`] with the
//! elapsed frame delta and read [`Animation::value`]; tests inject a
//! deterministic sequence of deltas.
//!
//! # Invariants
//!
//! 1. `value()` is always in `[0.0, 1.0]`.
//! 2. `is_complete()` becomes true exactly when elapsed ≥ duration.
//! 3. Zero duration completes on construction.

use std::time::Duration;

/// Easing curve mapping linear progress to eased progress.
pub type EasingFn = fn(f32) -> f32;

/// Identity easing.
#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Cubic ease-out: fast start, gentle landing.
#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Cubic ease-in-out.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// A time-driven value in `[0.0, 1.0]`.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation reached its end.
    fn is_complete(&self) -> bool;

    /// Current (eased) value.
    fn value(&self) -> f32;

    /// Restart from the beginning.
    fn reset(&mut self);

    /// Time accumulated past the end, zero while running.
    fn overshoot(&self) -> Duration;
}

/// A single 0→1 tween over a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Tween {
    /// Create a linear tween.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Builder: set the easing curve.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Builder: start part-way through, at linear progress `t`.
    ///
    /// Used to reverse an interrupted animation from where it stopped.
    #[must_use]
    pub fn starting_at(mut self, t: f32) -> Self {
        let nanos = self.duration.as_nanos() as f64 * f64::from(t.clamp(0.0, 1.0));
        self.elapsed = Duration::from_nanos(nanos.round() as u64);
        self
    }

    /// Total duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear (un-eased) progress.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Jump to the end.
    pub fn finish(&mut self) {
        self.elapsed = self.elapsed.max(self.duration);
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress()).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}
