//! L4 Atomic Layer: Time calculation utilities for carousel animations
//!
//! All functions take the current instant explicitly so frame handlers stay
//! deterministic under a paused clock.

use std::time::Duration;

use tokio::time::Instant;

/// Animation progress (0.0 to 1.0) after `elapsed` of a `duration` long animation
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Linear interpolation between two values
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Elapsed time expressed in reference frames (1.0 = exactly one frame)
#[inline]
pub fn frames_between(previous: Instant, now: Instant, frame: Duration) -> f64 {
    if frame.is_zero() {
        return 1.0;
    }
    now.saturating_duration_since(previous).as_secs_f64() / frame.as_secs_f64()
}
