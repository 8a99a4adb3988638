//! L4 Atomic Layer: Inertial scroll physics
//!
//! Pure functions of `(position, velocity, scroll_width)`. The track holds
//! its items twice, so any offset is equivalent to the same offset shifted
//! by `scroll_width`; positions are kept in `(-scroll_width, 0]`.

use marquee_core::CarouselConfig;
use serde::Serialize;

/// Physics constants for the interactive phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertiaParams {
    /// Velocity retained per reference frame
    pub decay: f64,
    /// Below this speed the track is at rest
    pub epsilon: f64,
    pub wheel_multiplier: f64,
    pub touch_multiplier: f64,
}

impl Default for InertiaParams {
    fn default() -> Self {
        let config = CarouselConfig::default();
        Self {
            decay: config.decay,
            epsilon: config.epsilon,
            wheel_multiplier: config.wheel_multiplier,
            touch_multiplier: config.touch_multiplier,
        }
    }
}

/// Position (px offset) and velocity (px per reference frame)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Motion {
    pub position: f64,
    pub velocity: f64,
}

impl Motion {
    pub fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }
}

/// Bring `position` into `(-scroll_width, 0]`
pub fn wrap_position(position: f64, scroll_width: f64) -> f64 {
    if !scroll_width.is_finite() || scroll_width <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    if position > -scroll_width && position <= 0.0 {
        return position;
    }
    let wrapped = position.rem_euclid(scroll_width) - scroll_width;
    // rem_euclid may land on 0 or on a remainder too small to survive the subtraction
    if wrapped <= -scroll_width || wrapped >= 0.0 {
        0.0
    } else {
        wrapped
    }
}

/// Per-frame modifier used while the intro tween runs: a truncating
/// remainder, so the offset stays within `(-scroll_width, scroll_width)`
/// and the initial positive margin is preserved on the first frame
#[inline]
pub fn loop_modifier(raw: f64, scroll_width: f64) -> f64 {
    if !scroll_width.is_finite() || scroll_width <= 0.0 || !raw.is_finite() {
        return 0.0;
    }
    raw % scroll_width
}

#[inline]
pub fn is_moving(velocity: f64, params: &InertiaParams) -> bool {
    velocity.abs() > params.epsilon
}

/// Velocity added by a wheel event
#[inline]
pub fn wheel_impulse(delta_y: f64, params: &InertiaParams) -> f64 {
    if delta_y.is_finite() {
        delta_y * params.wheel_multiplier
    } else {
        0.0
    }
}

/// Velocity added by a vertical touch drag; dragging up moves the track forward
#[inline]
pub fn touch_impulse(drag_delta: f64, params: &InertiaParams) -> f64 {
    if drag_delta.is_finite() {
        -drag_delta * params.touch_multiplier
    } else {
        0.0
    }
}

/// One reference frame: move by the velocity, decay it, wrap.
/// A track at rest is returned unchanged.
pub fn step(motion: Motion, scroll_width: f64, params: &InertiaParams) -> Motion {
    if !is_moving(motion.velocity, params) || !motion.velocity.is_finite() {
        return motion;
    }
    Motion {
        position: wrap_position(motion.position - motion.velocity, scroll_width),
        velocity: motion.velocity * params.decay,
    }
}

/// Advance by a (possibly fractional) number of reference frames.
///
/// Integrates the per-frame recurrence in closed form: after `k` frames the
/// velocity is `v * decay^k` and the travelled distance is the geometric sum
/// `v * (1 - decay^k) / (1 - decay)`. For `k == 1` this is exactly [`step`].
pub fn advance(motion: Motion, scroll_width: f64, params: &InertiaParams, frames: f64) -> Motion {
    if frames == 1.0 {
        return step(motion, scroll_width, params);
    }
    if !frames.is_finite() || frames <= 0.0 {
        return motion;
    }
    if !is_moving(motion.velocity, params) || !motion.velocity.is_finite() {
        return motion;
    }

    let retained = params.decay.powf(frames);
    let distance = if (1.0 - params.decay).abs() < f64::EPSILON {
        motion.velocity * frames
    } else {
        motion.velocity * (1.0 - retained) / (1.0 - params.decay)
    };

    Motion {
        position: wrap_position(motion.position - distance, scroll_width),
        velocity: motion.velocity * retained,
    }
}

/// Upper bound on frames until a track launched at `v0` comes to rest
pub fn settle_bound(v0: f64, params: &InertiaParams) -> u32 {
    let speed = v0.abs();
    if speed <= params.epsilon {
        return 0;
    }
    if params.decay <= 0.0 {
        return 1;
    }
    let frames = (speed / params.epsilon).ln() / (1.0 / params.decay).ln();
    frames.ceil() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 1200.0;

    #[test]
    fn test_wrap_keeps_in_range_values() {
        assert_eq!(wrap_position(-300.0, WIDTH), -300.0);
        assert_eq!(wrap_position(0.0, WIDTH), 0.0);
    }

    #[test]
    fn test_wrap_folds_both_sides() {
        assert_eq!(wrap_position(-WIDTH, WIDTH), 0.0);
        assert_eq!(wrap_position(24.0, WIDTH), 24.0 - WIDTH);
        assert_eq!(wrap_position(-1500.0, WIDTH), -300.0);
        assert_eq!(wrap_position(-7.0 * WIDTH - 5.0, WIDTH), -5.0);
        assert_eq!(wrap_position(3.0 * WIDTH + 1.0, WIDTH), 1.0 - WIDTH);
    }

    #[test]
    fn test_wrap_degenerate_track() {
        assert_eq!(wrap_position(-50.0, 0.0), 0.0);
        assert_eq!(wrap_position(f64::NAN, WIDTH), 0.0);
        assert_eq!(wrap_position(-50.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_loop_modifier_truncates() {
        assert_eq!(loop_modifier(24.0, WIDTH), 24.0);
        assert_eq!(loop_modifier(-1500.0, WIDTH), -300.0);
        assert_eq!(loop_modifier(-WIDTH, WIDTH), 0.0);
        assert_eq!(loop_modifier(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_step_matches_recurrence() {
        let params = InertiaParams::default();
        let next = step(Motion::new(-100.0, 10.0), WIDTH, &params);
        assert_eq!(next.position, -110.0);
        assert!((next.velocity - 9.4).abs() < 1e-12);
    }

    #[test]
    fn test_step_at_rest_is_identity() {
        let params = InertiaParams::default();
        let motion = Motion::new(-100.0, 0.0005);
        assert_eq!(step(motion, WIDTH, &params), motion);
    }

    #[test]
    fn test_advance_one_frame_equals_step() {
        let params = InertiaParams::default();
        let motion = Motion::new(-10.0, 42.0);
        assert_eq!(advance(motion, WIDTH, &params, 1.0), step(motion, WIDTH, &params));
    }

    #[test]
    fn test_advance_two_frames_matches_two_steps() {
        let params = InertiaParams::default();
        let motion = Motion::new(-10.0, 42.0);
        let twice = step(step(motion, WIDTH, &params), WIDTH, &params);
        let jumped = advance(motion, WIDTH, &params, 2.0);
        assert!((twice.position - jumped.position).abs() < 1e-9);
        assert!((twice.velocity - jumped.velocity).abs() < 1e-9);
    }

    #[test]
    fn test_impulses() {
        let params = InertiaParams::default();
        assert!((wheel_impulse(100.0, &params) - 5.0).abs() < 1e-12);
        assert!((touch_impulse(50.0, &params) + 6.0).abs() < 1e-12);
        assert_eq!(wheel_impulse(f64::INFINITY, &params), 0.0);
    }

    #[test]
    fn test_settle_bound() {
        let params = InertiaParams::default();
        assert_eq!(settle_bound(0.0, &params), 0);

        let mut motion = Motion::new(0.0, 500.0);
        let mut frames = 0;
        while is_moving(motion.velocity, &params) {
            motion = step(motion, WIDTH, &params);
            frames += 1;
        }
        assert!(frames <= settle_bound(500.0, &params));
    }
}
