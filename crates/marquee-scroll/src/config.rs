//! L4 Atomic Layer: Configuration types for the carousel
//!
//! Re-exports configuration from marquee-core and provides derived values.

use std::time::Duration;

// Re-export config types from core
pub use marquee_core::{CarouselConfig, EasingType};

use crate::physics::InertiaParams;

/// Extension trait for CarouselConfig with utility methods
pub trait CarouselConfigExt {
    /// Pause between content-ready and the intro run
    fn intro_delay(&self) -> Duration;

    /// Duration of the intro translation
    fn intro_duration(&self) -> Duration;

    /// Duration of the item reveal
    fn reveal_duration(&self) -> Duration;

    /// Tick duration for the configured frame rate
    fn frame_duration(&self) -> Duration;

    /// Physics constants for the interactive phase
    fn inertia(&self) -> InertiaParams;
}

impl CarouselConfigExt for CarouselConfig {
    #[inline]
    fn intro_delay(&self) -> Duration {
        Duration::from_millis(self.intro_delay_ms)
    }

    #[inline]
    fn intro_duration(&self) -> Duration {
        Duration::from_millis(self.intro_duration_ms)
    }

    #[inline]
    fn reveal_duration(&self) -> Duration {
        Duration::from_millis(self.reveal_duration_ms)
    }

    #[inline]
    fn frame_duration(&self) -> Duration {
        if self.animation_fps == 0 {
            Duration::from_micros(16_667) // ~60fps fallback
        } else {
            Duration::from_micros(1_000_000 / self.animation_fps as u64)
        }
    }

    fn inertia(&self) -> InertiaParams {
        InertiaParams {
            decay: self.decay,
            epsilon: self.epsilon,
            wheel_multiplier: self.wheel_multiplier,
            touch_multiplier: self.touch_multiplier,
        }
    }
}
